use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of `Day.csv`, columns as stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDayRecord {
    pub instant: i64,
    pub dteday: String,
    pub season: i64,
    pub yr: i64,
    pub mnth: i64,
    pub holiday: i64,
    pub weekday: i64,
    pub workingday: i64,
    pub weathersit: i64,
    pub temp: f64,
    pub atemp: f64,
    pub hum: f64,
    pub windspeed: f64,
    pub casual: u32,
    pub registered: u32,
    pub cnt: u32,
}

/// One row of `Hour.csv`. Only the date is read; the other columns are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct RawHourRecord {
    pub dteday: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1..=4 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

/// Calendar month. Ordering follows the ordinal, never the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    Jan,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1..=12 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    /// Zero-based position in the calendar.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weather {
    #[serde(rename = "Clear/Partly Cloudy")]
    ClearPartlyCloudy,
    #[serde(rename = "Misty/Cloudy")]
    MistyCloudy,
    #[serde(rename = "Light Snow/Rain")]
    LightSnowRain,
    #[serde(rename = "Severe Weather")]
    SevereWeather,
}

impl Weather {
    pub const ALL: [Weather; 4] = [
        Weather::ClearPartlyCloudy,
        Weather::MistyCloudy,
        Weather::LightSnowRain,
        Weather::SevereWeather,
    ];

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1..=4 => Some(Self::ALL[(code - 1) as usize]),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Weather::ClearPartlyCloudy => "Clear/Partly Cloudy",
            Weather::MistyCloudy => "Misty/Cloudy",
            Weather::LightSnowRain => "Light Snow/Rain",
            Weather::SevereWeather => "Severe Weather",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Season, Month, Weather);

/// A normalized day of rentals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub instant: i64,
    pub dateday: NaiveDate,
    pub season: Season,
    pub year: i32,
    pub month: Month,
    pub holiday: i64,
    pub weekday: i64,
    pub workingday: i64,
    pub weather: Weather,
    pub temp: f64,
    pub atemp: f64,
    pub humidity: f64,
    pub windspeed: f64,
    pub casual: u32,
    pub registered: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RfmRecord {
    pub dateday: NaiveDate,
    pub recency: i64,
    pub monetary: u64,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyFrequency {
    pub year: i32,
    pub month: Month,
    pub days: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonTotal {
    pub season: Season,
    pub count: u64,
}

/// `describe()`-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: &'static str,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}
