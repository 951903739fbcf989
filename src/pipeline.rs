use std::collections::{BTreeMap, HashSet};

use crate::config::DashboardConfig;
use crate::error::Result;
use crate::filter::{self, DateRange};
use crate::loader;
use crate::metrics::{self, MonthlyTrend};
use crate::models::{
    ColumnSummary, DayRecord, MonthlyFrequency, RawDayRecord, RawHourRecord, RfmRecord,
    SeasonTotal, Weather,
};
use crate::normalize;
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlySummary {
    pub rows: usize,
    pub days: usize,
}

/// Normalized daily table plus the hourly row tally, built once per run.
#[derive(Debug, Clone)]
pub struct Dashboard {
    days: Vec<DayRecord>,
    hourly: HourlySummary,
}

impl Dashboard {
    pub fn load(config: &DashboardConfig) -> Result<Self> {
        let raw_days = loader::load_day_table(&config.day_path)?;
        let raw_hours = loader::load_hour_table(&config.hour_path)?;
        Self::from_tables(&raw_days, &raw_hours)
    }

    pub fn from_tables(raw_days: &[RawDayRecord], raw_hours: &[RawHourRecord]) -> Result<Self> {
        let days = normalize::normalize_day_table(raw_days)?;
        let hourly = HourlySummary {
            rows: raw_hours.len(),
            days: raw_hours
                .iter()
                .map(|hour| hour.dteday.as_str())
                .collect::<HashSet<_>>()
                .len(),
        };

        tracing::info!(days = days.len(), hourly_rows = hourly.rows, "dataset normalized");
        Ok(Self { days, hourly })
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn hourly(&self) -> HourlySummary {
        self.hourly
    }

    pub fn span(&self) -> Option<DateRange> {
        DateRange::spanning(&self.days)
    }

    /// Everything one render cycle shows for `range`.
    ///
    /// Each output is derived independently so one failing derivation does
    /// not take the others down with it.
    pub fn view(&self, range: DateRange) -> DashboardView {
        let filtered = filter::filter_by_range(&self.days, range);
        tracing::debug!(rows = filtered.len(), "filtered {}..={}", range.start(), range.end());
        if filtered.is_empty() {
            tracing::warn!("no rentals recorded from {} to {}", range.start(), range.end());
        }

        let statistics =
            metrics::latest_date(&self.days).map(|latest| stats::describe(&filtered, latest));
        let rfm = metrics::rfm_table(&self.days).map(|rows| {
            rows.into_iter()
                .filter(|row| range.contains(row.dateday))
                .collect()
        });

        DashboardView {
            range,
            hourly: self.hourly,
            statistics,
            season_totals: stats::season_totals(&filtered),
            weather: stats::weather_distribution(&filtered),
            monthly_trend: metrics::monthly_trend(&self.days),
            monthly_frequency: metrics::monthly_frequency(&self.days),
            rfm,
            filtered,
        }
    }
}

#[derive(Debug)]
pub struct DashboardView {
    pub range: DateRange,
    pub hourly: HourlySummary,
    pub filtered: Vec<DayRecord>,
    pub statistics: Result<Vec<ColumnSummary>>,
    pub season_totals: Vec<SeasonTotal>,
    pub weather: BTreeMap<Weather, Vec<u32>>,
    pub monthly_trend: Result<MonthlyTrend>,
    pub monthly_frequency: Vec<MonthlyFrequency>,
    pub rfm: Result<Vec<RfmRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::models::Season;
    use chrono::NaiveDate;

    fn raw_day(instant: i64, dteday: &str, mnth: i64, cnt: u32) -> RawDayRecord {
        RawDayRecord {
            instant,
            dteday: dteday.to_string(),
            season: 1,
            yr: 0,
            mnth,
            holiday: 0,
            weekday: 1,
            workingday: 1,
            weathersit: 1,
            temp: 0.2,
            atemp: 0.2,
            hum: 0.4,
            windspeed: 0.1,
            casual: 10,
            registered: cnt - 10,
            cnt,
        }
    }

    fn raw_hour(dteday: &str) -> RawHourRecord {
        RawHourRecord {
            dteday: dteday.to_string(),
        }
    }

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn dashboard() -> Dashboard {
        let days = vec![
            raw_day(1, "2011-01-01", 1, 100),
            raw_day(2, "2011-01-02", 1, 150),
            raw_day(3, "2011-02-01", 2, 300),
        ];
        let hours = vec![
            raw_hour("2011-01-01"),
            raw_hour("2011-01-01"),
            raw_hour("2011-01-02"),
        ];
        Dashboard::from_tables(&days, &hours).unwrap()
    }

    #[test]
    fn view_filters_rows_but_keeps_global_recency() {
        let dashboard = dashboard();
        let range = DateRange::new(date("2011-01-01"), date("2011-01-02")).unwrap();

        let view = dashboard.view(range);
        assert_eq!(view.filtered.len(), 2);
        assert_eq!(view.season_totals.len(), 1);
        assert_eq!(view.season_totals[0].season, Season::Spring);
        assert_eq!(view.season_totals[0].count, 250);

        let rfm = view.rfm.unwrap();
        assert_eq!(rfm.iter().map(|r| r.recency).collect::<Vec<_>>(), vec![31, 30]);

        let statistics = view.statistics.unwrap();
        let recency = statistics
            .iter()
            .find(|s| s.column == "days_since_last_rental")
            .unwrap();
        assert_eq!(recency.min, Some(30.0));
    }

    #[test]
    fn monthly_outputs_ignore_the_range() {
        let dashboard = dashboard();
        let range = DateRange::new(date("2011-02-01"), date("2011-02-01")).unwrap();

        let view = dashboard.view(range);
        let trend = view.monthly_trend.unwrap();
        assert_eq!(trend.mean(2011, crate::models::Month::Jan), Some(125.0));
        assert_eq!(view.monthly_frequency.len(), 2);
    }

    #[test]
    fn empty_range_is_a_valid_view() {
        let dashboard = dashboard();
        let range = DateRange::new(date("2013-01-01"), date("2013-12-31")).unwrap();

        let view = dashboard.view(range);
        assert!(view.filtered.is_empty());
        assert!(view.season_totals.is_empty());
        assert!(view.weather.is_empty());
        assert!(view.rfm.unwrap().is_empty());
        assert_eq!(view.statistics.unwrap()[0].count, 0);
    }

    #[test]
    fn empty_table_fails_only_the_dependent_outputs() {
        let dashboard = Dashboard::from_tables(&[], &[]).unwrap();
        assert_eq!(dashboard.span(), None);

        let range = DateRange::new(date("2011-01-01"), date("2011-12-31")).unwrap();
        let view = dashboard.view(range);
        assert!(matches!(view.statistics, Err(DashboardError::EmptyDataset(_))));
        assert!(matches!(view.rfm, Err(DashboardError::EmptyDataset(_))));
        assert!(matches!(view.monthly_trend, Err(DashboardError::EmptyDataset(_))));
        assert!(view.season_totals.is_empty());
    }

    #[test]
    fn counts_hourly_rows_and_days() {
        let summary = dashboard().hourly();
        assert_eq!(summary, HourlySummary { rows: 3, days: 2 });
    }

    #[test]
    fn invalid_codes_abort_the_build() {
        let mut bad = raw_day(4, "2011-03-01", 3, 50);
        bad.weathersit = 9;

        let err = Dashboard::from_tables(&[bad], &[]).unwrap_err();
        assert!(matches!(err, DashboardError::Validation { column: "weather", .. }));
    }
}
