use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::error::{DashboardError, Result};
use crate::models::{DayRecord, Month, MonthlyFrequency, RfmRecord};

pub fn latest_date(days: &[DayRecord]) -> Result<NaiveDate> {
    days.iter()
        .map(|day| day.dateday)
        .max()
        .ok_or(DashboardError::EmptyDataset("latest date"))
}

pub fn recency(latest: NaiveDate, dateday: NaiveDate) -> i64 {
    (latest - dateday).num_days()
}

/// Days between each row and the newest row of the whole table, in row order.
pub fn days_since_last_rental(days: &[DayRecord]) -> Result<Vec<i64>> {
    let latest = latest_date(days)?;
    Ok(days.iter().map(|day| recency(latest, day.dateday)).collect())
}

/// Mean daily rentals per year, twelve months per year in calendar order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub years: BTreeMap<i32, Vec<(Month, Option<f64>)>>,
}

impl MonthlyTrend {
    pub fn mean(&self, year: i32, month: Month) -> Option<f64> {
        self.years
            .get(&year)
            .and_then(|months| months.get(month.index()))
            .and_then(|(_, mean)| *mean)
    }

    pub fn max_mean(&self) -> Option<f64> {
        self.years
            .values()
            .flatten()
            .filter_map(|(_, mean)| *mean)
            .reduce(f64::max)
    }
}

pub fn monthly_trend(days: &[DayRecord]) -> Result<MonthlyTrend> {
    if days.is_empty() {
        return Err(DashboardError::EmptyDataset("monthly trend"));
    }

    let mut sums: BTreeMap<i32, [(u64, usize); 12]> = BTreeMap::new();
    for day in days {
        let cell = &mut sums.entry(day.year).or_insert([(0, 0); 12])[day.month.index()];
        cell.0 += u64::from(day.count);
        cell.1 += 1;
    }

    let years = sums
        .into_iter()
        .map(|(year, cells)| {
            let months = Month::ALL
                .iter()
                .zip(cells)
                .map(|(&month, (total, rows))| {
                    let mean = (rows > 0).then(|| total as f64 / rows as f64);
                    (month, mean)
                })
                .collect();
            (year, months)
        })
        .collect();

    Ok(MonthlyTrend { years })
}

/// Recency, frequency and monetary value per date, oldest date first.
///
/// Rows are grouped by date, so finer-grained input (several rows per day)
/// aggregates correctly; at daily grain every frequency is 1.
pub fn rfm_table(days: &[DayRecord]) -> Result<Vec<RfmRecord>> {
    let recency = days_since_last_rental(days)?;

    let mut groups: BTreeMap<NaiveDate, RfmRecord> = BTreeMap::new();
    for (day, days_since) in days.iter().zip(recency) {
        let entry = groups.entry(day.dateday).or_insert_with(|| RfmRecord {
            dateday: day.dateday,
            recency: days_since,
            monetary: 0,
            frequency: 0,
        });
        entry.recency = entry.recency.min(days_since);
        entry.monetary += u64::from(day.count);
        entry.frequency += 1;
    }

    Ok(groups.into_values().collect())
}

/// Rows recorded per calendar month, in chronological order.
pub fn monthly_frequency(days: &[DayRecord]) -> Vec<MonthlyFrequency> {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for day in days {
        *counts
            .entry((day.dateday.year(), day.dateday.month()))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .filter_map(|((year, month), days)| {
            Month::from_code(i64::from(month)).map(|month| MonthlyFrequency { year, month, days })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Season, Weather};

    pub(crate) fn day(date: &str, count: u32) -> DayRecord {
        let dateday = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        DayRecord {
            instant: i64::from(dateday.ordinal()),
            dateday,
            season: Season::Spring,
            year: dateday.year(),
            month: Month::from_code(i64::from(dateday.month())).unwrap(),
            holiday: 0,
            weekday: i64::from(dateday.weekday().num_days_from_sunday()),
            workingday: 1,
            weather: Weather::ClearPartlyCloudy,
            temp: 0.3,
            atemp: 0.3,
            humidity: 0.5,
            windspeed: 0.2,
            casual: count / 4,
            registered: count - count / 4,
            count,
        }
    }

    #[test]
    fn recency_counts_days_back_from_latest() {
        let days = vec![day("2011-01-01", 100), day("2011-01-02", 150)];
        assert_eq!(days_since_last_rental(&days).unwrap(), vec![1, 0]);
    }

    #[test]
    fn recency_is_zero_only_at_latest_date() {
        let days = vec![
            day("2012-03-04", 10),
            day("2012-12-31", 20),
            day("2011-01-01", 30),
            day("2012-12-30", 40),
        ];

        let recency = days_since_last_rental(&days).unwrap();
        for (day, value) in days.iter().zip(&recency) {
            if day.dateday == NaiveDate::from_ymd_opt(2012, 12, 31).unwrap() {
                assert_eq!(*value, 0);
            } else {
                assert!(*value > 0);
            }
        }
        assert_eq!(recency[2], 730);
    }

    #[test]
    fn empty_table_has_no_latest_date() {
        assert!(matches!(
            days_since_last_rental(&[]),
            Err(DashboardError::EmptyDataset(_))
        ));
        assert!(matches!(rfm_table(&[]), Err(DashboardError::EmptyDataset(_))));
        assert!(matches!(monthly_trend(&[]), Err(DashboardError::EmptyDataset(_))));
    }

    #[test]
    fn rfm_matches_daily_rows() {
        let days = vec![day("2011-01-02", 150), day("2011-01-01", 100)];

        let rfm = rfm_table(&days).unwrap();
        assert_eq!(
            rfm,
            vec![
                RfmRecord {
                    dateday: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(),
                    recency: 1,
                    monetary: 100,
                    frequency: 1,
                },
                RfmRecord {
                    dateday: NaiveDate::from_ymd_opt(2011, 1, 2).unwrap(),
                    recency: 0,
                    monetary: 150,
                    frequency: 1,
                },
            ]
        );
    }

    #[test]
    fn rfm_aggregates_repeated_dates() {
        let days = vec![
            day("2011-01-01", 10),
            day("2011-01-03", 7),
            day("2011-01-01", 25),
            day("2011-01-01", 5),
        ];

        let rfm = rfm_table(&days).unwrap();
        assert_eq!(rfm.len(), 2);
        assert_eq!(rfm[0].monetary, 40);
        assert_eq!(rfm[0].frequency, 3);
        assert_eq!(rfm[0].recency, 2);
        assert_eq!(rfm[1].monetary, 7);
        assert_eq!(rfm[1].frequency, 1);
    }

    #[test]
    fn monthly_trend_keeps_calendar_order_and_gaps() {
        let days = vec![
            day("2011-02-01", 100),
            day("2011-02-02", 200),
            day("2011-01-15", 50),
            day("2012-12-01", 400),
        ];

        let trend = monthly_trend(&days).unwrap();
        assert_eq!(trend.years.keys().copied().collect::<Vec<_>>(), vec![2011, 2012]);

        let months_2011: Vec<Month> = trend.years[&2011].iter().map(|(m, _)| *m).collect();
        assert_eq!(months_2011, Month::ALL.to_vec());

        assert_eq!(trend.mean(2011, Month::Jan), Some(50.0));
        assert_eq!(trend.mean(2011, Month::Feb), Some(150.0));
        assert_eq!(trend.mean(2011, Month::Mar), None);
        assert_eq!(trend.mean(2012, Month::Jan), None);
        assert_eq!(trend.mean(2012, Month::Dec), Some(400.0));
        assert_eq!(trend.max_mean(), Some(400.0));
    }

    #[test]
    fn monthly_frequency_counts_rows_per_calendar_month() {
        let days = vec![
            day("2011-01-30", 1),
            day("2011-01-31", 1),
            day("2011-02-01", 1),
            day("2012-01-01", 1),
        ];

        let freq = monthly_frequency(&days);
        assert_eq!(
            freq,
            vec![
                MonthlyFrequency { year: 2011, month: Month::Jan, days: 2 },
                MonthlyFrequency { year: 2011, month: Month::Feb, days: 1 },
                MonthlyFrequency { year: 2012, month: Month::Jan, days: 1 },
            ]
        );
    }
}
