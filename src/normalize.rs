use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{DashboardError, Result};
use crate::models::{DayRecord, Month, RawDayRecord, Season, Weather};

/// Calendar year encoded as `yr = 0`.
pub const FIRST_DATASET_YEAR: i32 = 2011;
const DATASET_YEARS: i64 = 2;

/// Builds the typed daily table from raw rows. The raw rows are left as-is.
pub fn normalize_day_table(raw: &[RawDayRecord]) -> Result<Vec<DayRecord>> {
    raw.iter().map(normalize_day).collect()
}

pub fn normalize_day(raw: &RawDayRecord) -> Result<DayRecord> {
    let invalid = |column: &'static str, value: String| DashboardError::Validation {
        row: raw.instant,
        column,
        value,
    };

    let dateday =
        parse_dateday(&raw.dteday).ok_or_else(|| invalid("dateday", raw.dteday.clone()))?;
    let season =
        Season::from_code(raw.season).ok_or_else(|| invalid("season", raw.season.to_string()))?;
    let month = Month::from_code(raw.mnth).ok_or_else(|| invalid("month", raw.mnth.to_string()))?;
    let weather = Weather::from_code(raw.weathersit)
        .ok_or_else(|| invalid("weather", raw.weathersit.to_string()))?;
    let year = year_from_code(raw.yr).ok_or_else(|| invalid("year", raw.yr.to_string()))?;

    Ok(DayRecord {
        instant: raw.instant,
        dateday,
        season,
        year,
        month,
        holiday: raw.holiday,
        weekday: raw.weekday,
        workingday: raw.workingday,
        weather,
        temp: raw.temp,
        atemp: raw.atemp,
        humidity: raw.hum,
        windspeed: raw.windspeed,
        casual: raw.casual,
        registered: raw.registered,
        count: raw.cnt,
    })
}

pub fn year_from_code(code: i64) -> Option<i32> {
    if (0..DATASET_YEARS).contains(&code) {
        Some(FIRST_DATASET_YEAR + code as i32)
    } else {
        None
    }
}

/// Accepts `2011-01-01`, optionally followed by a `00:00:00` time part.
pub fn parse_dateday(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .ok()
}
