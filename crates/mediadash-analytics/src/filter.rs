//! Calendar-date ranges used to window topic and sentiment rows.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::AnalyticsError;

/// Inclusive calendar-date range applied to row timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns [`AnalyticsError::InvalidRequest`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        let date = ts.date();
        self.start <= date && date <= self.end
    }

    /// Range over the calendar dates of two timestamps, in either order.
    #[must_use]
    pub fn between(a: NaiveDateTime, b: NaiveDateTime) -> Self {
        let (a, b) = (a.date(), b.date());
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Smallest range covering every timestamp, or `None` for no timestamps.
    pub fn spanning(timestamps: impl IntoIterator<Item = NaiveDateTime>) -> Option<Self> {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for ts in timestamps {
            let d = ts.date();
            bounds = Some(match bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        bounds.map(|(start, end)| Self { start, end })
    }
}
