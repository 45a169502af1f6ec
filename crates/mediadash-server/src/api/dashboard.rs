use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use mediadash_analytics::{
    AnalyticsError, DashboardRequest, DashboardView, OutletSummary, Selection, DEFAULT_THRESHOLD,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_analytics_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Every field is optional here so missing values surface as
/// `validation_error` rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub(super) struct DashboardQuery {
    pub outlet1: Option<String>,
    pub platform1: Option<String>,
    pub outlet2: Option<String>,
    pub platform2: Option<String>,
    pub start1: Option<String>,
    pub end1: Option<String>,
    pub start2: Option<String>,
    pub end2: Option<String>,
    pub threshold: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CacheClearData {
    cleared: bool,
}

impl DashboardQuery {
    fn into_request(self) -> Result<DashboardRequest, String> {
        let first = Selection::new(
            required("outlet1", self.outlet1)?,
            required("platform1", self.platform1)?,
        )
        .between(
            optional_date("start1", self.start1)?,
            optional_date("end1", self.end1)?,
        );
        let second = Selection::new(
            required("outlet2", self.outlet2)?,
            required("platform2", self.platform2)?,
        )
        .between(
            optional_date("start2", self.start2)?,
            optional_date("end2", self.end2)?,
        );

        let mut request = DashboardRequest::new(first, second);
        request.threshold = match self.threshold.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_THRESHOLD,
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("threshold must be a number, got {raw:?}"))?,
        };
        Ok(request)
    }
}

fn required(name: &str, value: Option<String>) -> Result<String, String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| format!("missing required parameter {name}"))
}

fn optional_date(name: &str, value: Option<String>) -> Result<Option<NaiveDate>, String> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("{name} must be a YYYY-MM-DD date, got {raw:?}")),
    }
}

pub(super) async fn list_outlets(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<OutletSummary>>>, ApiError> {
    let dashboard = state.dashboard.clone();
    let data = run_blocking(&req_id, move || {
        let mut dashboard = dashboard.blocking_lock();
        dashboard.outlets()
    })
    .await?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_dashboard(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<ApiResponse<DashboardView>>, ApiError> {
    let request = query
        .into_request()
        .map_err(|message| ApiError::validation(req_id.0.clone(), message))?;
    request
        .validate()
        .map_err(|e| map_analytics_error(req_id.0.clone(), &e))?;

    let dashboard = state.dashboard.clone();
    let data = run_blocking(&req_id, move || {
        let mut dashboard = dashboard.blocking_lock();
        dashboard.render(&request)
    })
    .await?;

    if !data.warnings.is_empty() {
        tracing::info!(
            request_id = %req_id.0,
            warnings = data.warnings.len(),
            "dashboard rendered with warnings"
        );
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_cache(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CacheClearData>> {
    state.dashboard.lock().await.clear_cache();

    Json(ApiResponse {
        data: CacheClearData { cleared: true },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// Runs file-bound dashboard work off the async executor.
async fn run_blocking<T, F>(req_id: &RequestId, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AnalyticsError> + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(|e| map_analytics_error(req_id.0.clone(), &e)),
        Err(e) => {
            tracing::error!(error = %e, "dashboard task failed");
            Err(ApiError::new(
                req_id.0.clone(),
                "internal_error",
                "dashboard task failed",
            ))
        }
    }
}
