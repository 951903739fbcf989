use std::path::PathBuf;

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("failed to read {}: {source}", path.display())]
    DataAccess {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("row {row}: invalid {column} value {value:?}")]
    Validation {
        row: i64,
        column: &'static str,
        value: String,
    },

    #[error("cannot compute {0} over an empty table")]
    EmptyDataset(&'static str),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date {date} is outside the loaded data ({first} to {last})")]
    OutsideData {
        date: NaiveDate,
        first: NaiveDate,
        last: NaiveDate,
    },
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = DashboardError::Validation {
            row: 12,
            column: "season",
            value: "7".to_string(),
        };
        assert_eq!(err.to_string(), "row 12: invalid season value \"7\"");

        let err = DashboardError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2012, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2012, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "start date 2012-03-01 is after end date 2012-01-01"
        );

        let err = DashboardError::OutsideData {
            date: NaiveDate::from_ymd_opt(2013, 6, 1).unwrap(),
            first: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
            last: NaiveDate::from_ymd_opt(2012, 12, 31).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "date 2013-06-01 is outside the loaded data (2011-01-01 to 2012-12-31)"
        );
    }
}
