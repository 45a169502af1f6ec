mod dashboard;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use mediadash_analytics::{AnalyticsError, Dashboard};
use serde::Serialize;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    /// Recomputes are serialized behind this lock.
    pub dashboard: Arc<Mutex<Dashboard>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_analytics_error(request_id: String, error: &AnalyticsError) -> ApiError {
    match error {
        AnalyticsError::InvalidRequest(message) => ApiError::validation(request_id, message.clone()),
        AnalyticsError::Io { .. } | AnalyticsError::Csv { .. } => {
            tracing::error!(error = %error, "dashboard data unavailable");
            ApiError::new(request_id, "internal_error", "dashboard data unavailable")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/outlets", get(dashboard::list_outlets))
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/cache/clear", post(dashboard::clear_cache))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(path, contents).expect("write fixture");
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        write(
            &dir.path().join("data/twitter/cnn_with_sections.csv"),
            "date,merged_section\n2025-01-01,Politics\n2025-01-02,Sport\n",
        );
        write(
            &dir.path().join("data/bluesky/fox_with_sections.csv"),
            "created_at,section\n2025-01-03T12:00:00Z,World\n",
        );
        write(
            &dir.path().join("sentiment/cnn/cnn_twitter_entities_sentiment_by_date.csv"),
            "created_at,entity\n2025-01-01,Biden\n2025-01-02,Trump\n",
        );
        write(
            &dir.path().join("sentiment/fox/fox_bluesky_entities_sentiment_by_date.csv"),
            "date,entity\n2025-01-03,Biden\n",
        );
        dir
    }

    fn app(dir: &tempfile::TempDir) -> Router {
        let dashboard = Dashboard::new(dir.path().join("data"), dir.path().join("sentiment"));
        build_app(AppState {
            dashboard: Arc::new(Mutex::new(dashboard)),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_error_code_maps_to_internal_error() {
        let response = ApiError::new("req-1", "internal_error", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_returns_ok_and_echoes_request_id() {
        let dir = fixture();
        let response = app(&dir)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json parse");
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["meta"]["request_id"], "req-42");
    }

    #[tokio::test]
    async fn request_id_is_generated_when_missing() {
        let dir = fixture();
        let response = app(&dir).oneshot(get("/api/v1/health")).await.expect("response");
        let id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("request id header");
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn outlets_lists_sorted_outlets_with_platforms() {
        let dir = fixture();
        let (status, json) = send(app(&dir), get("/api/v1/outlets")).await;

        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["outlet"], "cnn");
        assert_eq!(data[0]["platforms"][0]["platform"], "twitter");
        assert_eq!(data[1]["outlet"], "fox");
    }

    #[tokio::test]
    async fn dashboard_returns_panels_and_comparison() {
        let dir = fixture();
        let (status, json) = send(
            app(&dir),
            get("/api/v1/dashboard?outlet1=cnn&platform1=twitter&outlet2=fox&platform2=bluesky"),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{json}");
        let data = &json["data"];
        assert_eq!(data["topics"].as_array().map(Vec::len), Some(2));
        assert_eq!(data["topics"][0]["shares"][0]["section"], "Politics");
        assert_eq!(data["topics"][1]["shares"][0]["section"], "World");
        assert_eq!(
            data["entities"]["comparison"]["entity_axis"],
            serde_json::json!(["Biden", "Trump"])
        );
        assert!(data["entities"]["chart"].is_object());
        assert_eq!(data["threshold"], 2.0);
    }

    #[tokio::test]
    async fn dashboard_applies_date_bounds() {
        let dir = fixture();
        let (status, json) = send(
            app(&dir),
            get("/api/v1/dashboard?outlet1=cnn&platform1=twitter&outlet2=fox&platform2=bluesky\
                 &start1=2025-01-02&end1=2025-01-02"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let shares = json["data"]["topics"][0]["shares"].as_array().expect("shares");
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0]["section"], "Sport");
    }

    #[tokio::test]
    async fn dashboard_rejects_threshold_out_of_range() {
        let dir = fixture();
        let (status, json) = send(
            app(&dir),
            get("/api/v1/dashboard?outlet1=cnn&platform1=twitter&outlet2=fox&platform2=bluesky&threshold=25"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn dashboard_rejects_reversed_dates() {
        let dir = fixture();
        let (status, json) = send(
            app(&dir),
            get("/api/v1/dashboard?outlet1=cnn&platform1=twitter&outlet2=fox&platform2=bluesky\
                 &start2=2025-02-01&end2=2025-01-01"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn dashboard_requires_both_selections() {
        let dir = fixture();
        let (status, json) = send(app(&dir), get("/api/v1/dashboard?outlet1=cnn&platform1=twitter")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("outlet2")));
    }

    #[tokio::test]
    async fn dashboard_rejects_malformed_date() {
        let dir = fixture();
        let (status, json) = send(
            app(&dir),
            get("/api/v1/dashboard?outlet1=cnn&platform1=twitter&outlet2=fox&platform2=bluesky&start1=Jan-1"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn cache_clear_returns_ok() {
        let dir = fixture();
        let app = app(&dir);
        let (status, _) = send(app.clone(), get("/api/v1/outlets")).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            app,
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/cache/clear")
                .body(Body::empty())
                .expect("request"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["cleared"], true);
    }
}
