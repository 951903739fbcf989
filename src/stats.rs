use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::metrics;
use crate::models::{ColumnSummary, DayRecord, Season, SeasonTotal, Weather};

type Column = (&'static str, fn(&DayRecord) -> f64);

const NUMERIC_COLUMNS: [Column; 11] = [
    ("instant", |d| d.instant as f64),
    ("holiday", |d| d.holiday as f64),
    ("weekday", |d| d.weekday as f64),
    ("workingday", |d| d.workingday as f64),
    ("temp", |d| d.temp),
    ("atemp", |d| d.atemp),
    ("humidity", |d| d.humidity),
    ("windspeed", |d| d.windspeed),
    ("casual", |d| f64::from(d.casual)),
    ("registered", |d| f64::from(d.registered)),
    ("count", |d| f64::from(d.count)),
];

/// Per-column descriptive statistics. Recency is measured against `latest`,
/// the newest date of the unfiltered table.
pub fn describe(days: &[DayRecord], latest: NaiveDate) -> Vec<ColumnSummary> {
    let mut summaries: Vec<ColumnSummary> = NUMERIC_COLUMNS
        .iter()
        .map(|&(name, value)| summarize(name, days.iter().map(value).collect()))
        .collect();

    let recency = days
        .iter()
        .map(|day| metrics::recency(latest, day.dateday) as f64)
        .collect();
    summaries.push(summarize("days_since_last_rental", recency));
    summaries
}

pub fn summarize(column: &'static str, mut values: Vec<f64>) -> ColumnSummary {
    values.sort_by(f64::total_cmp);
    let count = values.len();

    let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|mean| {
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    });

    ColumnSummary {
        column,
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.50),
        p75: quantile(&values, 0.75),
        max: values.last().copied(),
    }
}

/// Linear-interpolated quantile of already sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Total rentals per season present in `days`, in season order.
pub fn season_totals(days: &[DayRecord]) -> Vec<SeasonTotal> {
    let mut totals: BTreeMap<Season, u64> = BTreeMap::new();
    for day in days {
        *totals.entry(day.season).or_default() += u64::from(day.count);
    }
    totals
        .into_iter()
        .map(|(season, count)| SeasonTotal { season, count })
        .collect()
}

/// Every daily count, grouped by weather condition.
pub fn weather_distribution(days: &[DayRecord]) -> BTreeMap<Weather, Vec<u32>> {
    let mut groups: BTreeMap<Weather, Vec<u32>> = BTreeMap::new();
    for day in days {
        groups.entry(day.weather).or_default().push(day.count);
    }
    groups
}

/// Box-and-whisker figures with Tukey fences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

impl BoxSummary {
    pub fn from_values(values: &[u32]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().map(|&v| f64::from(v)).collect();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.50)?;
        let q3 = quantile(&sorted, 0.75)?;
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        Some(Self {
            q1,
            median,
            q3,
            lower_whisker: inside().next().unwrap_or(q1),
            upper_whisker: inside().last().unwrap_or(q3),
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !(low_fence..=high_fence).contains(v))
                .collect(),
        })
    }
}
