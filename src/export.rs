use serde::Serialize;

use crate::error::Result;
use crate::filter::DateRange;
use crate::metrics::MonthlyTrend;
use crate::models::{ColumnSummary, DayRecord, MonthlyFrequency, RfmRecord, SeasonTotal, Weather};
use crate::pipeline::{Dashboard, DashboardView};
use crate::stats::BoxSummary;

/// A view that is either present or carries the reason it is missing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum Section<T> {
    Data(T),
    Unavailable(String),
}

impl<'a, T> From<&'a Result<T>> for Section<&'a T> {
    fn from(result: &'a Result<T>) -> Self {
        match result {
            Ok(value) => Section::Data(value),
            Err(err) => Section::Unavailable(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct WeatherGroup<'a> {
    weather: Weather,
    counts: &'a [u32],
    #[serde(rename = "box")]
    box_summary: Option<BoxSummary>,
}

#[derive(Debug, Serialize)]
struct DashboardExport<'a> {
    range: DateRange,
    days_loaded: usize,
    days_selected: usize,
    hourly_rows: usize,
    statistics: Section<&'a Vec<ColumnSummary>>,
    season_totals: &'a [SeasonTotal],
    weather: Vec<WeatherGroup<'a>>,
    monthly_trend: Section<&'a MonthlyTrend>,
    monthly_frequency: &'a [MonthlyFrequency],
    rfm: Section<&'a Vec<RfmRecord>>,
    rows: &'a [DayRecord],
}

pub fn to_json(dashboard: &Dashboard, view: &DashboardView) -> anyhow::Result<String> {
    let export = DashboardExport {
        range: view.range,
        days_loaded: dashboard.days().len(),
        days_selected: view.filtered.len(),
        hourly_rows: view.hourly.rows,
        statistics: (&view.statistics).into(),
        season_totals: &view.season_totals,
        weather: view
            .weather
            .iter()
            .map(|(&weather, counts)| WeatherGroup {
                weather,
                counts,
                box_summary: BoxSummary::from_values(counts),
            })
            .collect(),
        monthly_trend: (&view.monthly_trend).into(),
        monthly_frequency: &view.monthly_frequency,
        rfm: (&view.rfm).into(),
        rows: &view.filtered,
    };

    Ok(serde_json::to_string_pretty(&export)?)
}
