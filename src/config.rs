//! Run configuration assembled from the command line (and its env fallbacks).
//!
//! The CLI layer parses flags; this module owns the resolved values so the
//! rest of the pipeline never reads arguments or the environment itself.
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::filter::DateRange;

/// Immutable snapshot of one dashboard run.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Daily-grain rentals (`Day.csv`).
    pub day_path: PathBuf,

    /// Hourly-grain rentals (`Hour.csv`).
    pub hour_path: PathBuf,

    /// First date to include; defaults to the earliest date in the data.
    pub start: Option<NaiveDate>,

    /// Last date to include; defaults to the latest date in the data.
    pub end: Option<NaiveDate>,
}

impl DashboardConfig {
    /// Fill the missing range bounds from `span` and validate the result.
    ///
    /// Explicit bounds must lie inside `span`. Without a span (empty table)
    /// both bounds are required and taken as given.
    pub fn resolve_range(&self, span: Option<DateRange>) -> Result<DateRange> {
        let Some(span) = span else {
            let (Some(start), Some(end)) = (self.start, self.end) else {
                return Err(DashboardError::EmptyDataset("date range"));
            };
            return DateRange::new(start, end);
        };

        let start = match self.start {
            Some(date) => span.check_contains(date)?,
            None => span.start(),
        };
        let end = match self.end {
            Some(date) => span.check_contains(date)?,
            None => span.end(),
        };
        DateRange::new(start, end)
    }

    pub fn log_config(&self) {
        let bound = |date: Option<NaiveDate>| {
            date.map(|d| d.to_string())
                .unwrap_or_else(|| "(data bound)".to_string())
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DAY_CSV    : {}", self.day_path.display());
        tracing::info!("  HOUR_CSV   : {}", self.hour_path.display());
        tracing::info!("  START_DATE : {}", bound(self.start));
        tracing::info!("  END_DATE   : {}", bound(self.end));
    }
}
