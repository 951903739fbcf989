use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::DayRecord;

/// Inclusive date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full `[min, max]` span of the table, or `None` when it is empty.
    pub fn spanning(days: &[DayRecord]) -> Option<Self> {
        let start = days.iter().map(|day| day.dateday).min()?;
        let end = days.iter().map(|day| day.dateday).max()?;
        Some(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Fails with `OutsideData` unless `date` falls inside this range.
    pub fn check_contains(&self, date: NaiveDate) -> Result<NaiveDate> {
        if self.contains(date) {
            Ok(date)
        } else {
            Err(DashboardError::OutsideData {
                date,
                first: self.start,
                last: self.end,
            })
        }
    }
}

pub fn filter_by_range(days: &[DayRecord], range: DateRange) -> Vec<DayRecord> {
    days.iter()
        .filter(|day| range.contains(day.dateday))
        .cloned()
        .collect()
}
