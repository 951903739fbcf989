use std::fmt::Write;

use crate::metrics::MonthlyTrend;
use crate::models::{ColumnSummary, Month, MonthlyFrequency, RfmRecord, SeasonTotal};
use crate::pipeline::DashboardView;
use crate::stats::BoxSummary;

pub fn build_report(view: &DashboardView) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Bike Sharing Data Analysis Dashboard");
    let _ = writeln!(
        output,
        "Rentals from {} to {} ({} days selected; {} hourly records across {} days loaded)",
        view.range.start(),
        view.range.end(),
        view.filtered.len(),
        view.hourly.rows,
        view.hourly.days
    );
    let _ = writeln!(output);

    write_statistics(&mut output, view);
    write_season_totals(&mut output, &view.season_totals);
    write_weather(&mut output, view);

    let _ = writeln!(output, "## Average Monthly Rentals");
    match &view.monthly_trend {
        Ok(trend) => write_monthly_trend(&mut output, trend),
        Err(err) => unavailable(&mut output, "monthly trend", err),
    }
    let _ = writeln!(output);

    write_monthly_frequency(&mut output, &view.monthly_frequency);

    let _ = writeln!(output, "## RFM Analysis: Recency vs Monetary vs Frequency");
    match &view.rfm {
        Ok(rfm) => write_rfm(&mut output, rfm),
        Err(err) => unavailable(&mut output, "RFM table", err),
    }

    output
}

/// The console view: descriptive statistics and season totals.
pub fn build_summary(view: &DashboardView) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "Selected {} days between {} and {}.",
        view.filtered.len(),
        view.range.start(),
        view.range.end()
    );
    let _ = writeln!(output);
    write_statistics(&mut output, view);
    write_season_totals(&mut output, &view.season_totals);
    output
}

fn unavailable(output: &mut String, what: &str, err: &dyn std::error::Error) {
    tracing::error!("{what} unavailable: {err}");
    let _ = writeln!(output, "_Unavailable: {err}._");
}

fn write_statistics(output: &mut String, view: &DashboardView) {
    let _ = writeln!(output, "## Basic Statistics");
    match &view.statistics {
        Ok(summaries) => write_statistics_table(output, summaries),
        Err(err) => unavailable(output, "statistics", err),
    }
    let _ = writeln!(output);
}

fn write_statistics_table(output: &mut String, summaries: &[ColumnSummary]) {
    let _ = writeln!(output, "| column | count | mean | std | min | 25% | 50% | 75% | max |");
    let _ = writeln!(output, "|---|---:|---:|---:|---:|---:|---:|---:|---:|");
    for s in summaries {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            s.column,
            s.count,
            cell(s.mean),
            cell(s.std),
            cell(s.min),
            cell(s.p25),
            cell(s.p50),
            cell(s.p75),
            cell(s.max)
        );
    }
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e12 => format!("{v:.0}"),
        Some(v) => format!("{v:.4}"),
        None => "NaN".to_string(),
    }
}

fn write_season_totals(output: &mut String, totals: &[SeasonTotal]) {
    let _ = writeln!(output, "## Total Rentals by Season");
    if totals.is_empty() {
        let _ = writeln!(output, "No rentals recorded for this window.");
    } else {
        for total in totals {
            let _ = writeln!(output, "- {}: {} rentals", total.season, total.count);
        }
    }
    let _ = writeln!(output);
}

fn write_weather(output: &mut String, view: &DashboardView) {
    let _ = writeln!(output, "## Rentals by Weather Condition");
    if view.weather.is_empty() {
        let _ = writeln!(output, "No rentals recorded for this window.");
    }
    for (weather, counts) in &view.weather {
        if let Some(b) = BoxSummary::from_values(counts) {
            let _ = writeln!(
                output,
                "- {weather} ({} days): median {:.0}, IQR {:.0}-{:.0}, \
                 whiskers {:.0}-{:.0}, {} outliers",
                counts.len(),
                b.median,
                b.q1,
                b.q3,
                b.lower_whisker,
                b.upper_whisker,
                b.outliers.len()
            );
        }
    }
    let _ = writeln!(output);
}

fn write_monthly_trend(output: &mut String, trend: &MonthlyTrend) {
    let years: Vec<i32> = trend.years.keys().copied().collect();

    let _ = write!(output, "| month |");
    for year in &years {
        let _ = write!(output, " {year} |");
    }
    let _ = writeln!(output);
    let _ = writeln!(output, "|---|{}", "---:|".repeat(years.len()));

    for month in Month::ALL {
        let _ = write!(output, "| {month} |");
        for &year in &years {
            match trend.mean(year, month) {
                Some(mean) => {
                    let _ = write!(output, " {mean:.1} |");
                }
                None => {
                    let _ = write!(output, " - |");
                }
            }
        }
        let _ = writeln!(output);
    }
}

fn write_monthly_frequency(output: &mut String, frequency: &[MonthlyFrequency]) {
    let _ = writeln!(output, "## Recorded Days per Month");
    if frequency.is_empty() {
        let _ = writeln!(output, "No days recorded.");
    }
    for entry in frequency {
        let _ = writeln!(output, "- {} {}: {} days", entry.month, entry.year, entry.days);
    }
    let _ = writeln!(output);
}

fn write_rfm(output: &mut String, rfm: &[RfmRecord]) {
    if rfm.is_empty() {
        let _ = writeln!(output, "No dates in this window.");
        return;
    }

    let total: u64 = rfm.iter().map(|r| r.monetary).sum();
    let newest = rfm.iter().map(|r| r.recency).min().unwrap_or_default();
    let oldest = rfm.iter().map(|r| r.recency).max().unwrap_or_default();
    let _ = writeln!(
        output,
        "{} dates, recency {}-{} days, {} rentals in total.",
        rfm.len(),
        newest,
        oldest,
        total
    );
    let _ = writeln!(output);

    let mut busiest = rfm.to_vec();
    busiest.sort_by(|a, b| b.monetary.cmp(&a.monetary).then(a.dateday.cmp(&b.dateday)));
    let _ = writeln!(output, "Busiest days:");
    for record in busiest.iter().take(5) {
        let _ = writeln!(
            output,
            "- {} (recency {} days): {} rentals over {} records",
            record.dateday, record.recency, record.monetary, record.frequency
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use crate::filter::DateRange;
    use crate::metrics::tests::day;
    use crate::pipeline::HourlySummary;
    use crate::{metrics, stats};
    use chrono::NaiveDate;

    fn view(days: Vec<crate::models::DayRecord>) -> DashboardView {
        let latest = NaiveDate::from_ymd_opt(2011, 1, 2).unwrap();
        DashboardView {
            range: DateRange::new(NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(), latest).unwrap(),
            hourly: HourlySummary { rows: 48, days: 2 },
            statistics: Ok(stats::describe(&days, latest)),
            season_totals: stats::season_totals(&days),
            weather: stats::weather_distribution(&days),
            monthly_trend: metrics::monthly_trend(&days),
            monthly_frequency: metrics::monthly_frequency(&days),
            rfm: metrics::rfm_table(&days),
            filtered: days,
        }
    }

    #[test]
    fn report_contains_every_section() {
        let report = build_report(&view(vec![day("2011-01-01", 100), day("2011-01-02", 150)]));

        assert!(report.starts_with("# Bike Sharing Data Analysis Dashboard"));
        assert!(report.contains("48 hourly records across 2 days"));
        assert!(report.contains("| count | 2 | 125 |"));
        assert!(report.contains("- Spring: 250 rentals"));
        assert!(report.contains("- Clear/Partly Cloudy (2 days)"));
        assert!(report.contains("| Jan | 125.0 |"));
        assert!(report.contains("| Feb | - |"));
        assert!(report.contains("- Jan 2011: 2 days"));
        assert!(report.contains("- 2011-01-02 (recency 0 days): 150 rentals over 1 records"));
    }

    #[test]
    fn failed_sections_do_not_hide_the_rest() {
        let mut view = view(vec![day("2011-01-01", 100)]);
        view.rfm = Err(DashboardError::EmptyDataset("RFM table"));
        view.statistics = Err(DashboardError::EmptyDataset("latest date"));

        let report = build_report(&view);
        assert!(report.contains("_Unavailable: cannot compute RFM table over an empty table._"));
        assert!(report.contains("_Unavailable: cannot compute latest date over an empty table._"));
        assert!(report.contains("- Spring: 100 rentals"));
        assert!(report.contains("## Average Monthly Rentals"));
    }

    #[test]
    fn summary_lists_statistics_and_seasons_only() {
        let summary = build_summary(&view(vec![day("2011-01-01", 100)]));
        assert!(summary.starts_with("Selected 1 days between 2011-01-01 and 2011-01-02."));
        assert!(summary.contains("## Basic Statistics"));
        assert!(summary.contains("## Total Rentals by Season"));
        assert!(!summary.contains("RFM"));
    }

    #[test]
    fn cells_render_missing_values_as_nan() {
        assert_eq!(cell(None), "NaN");
        assert_eq!(cell(Some(3.0)), "3");
        assert_eq!(cell(Some(0.123456)), "0.1235");
    }
}
