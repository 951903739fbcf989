//! PNG charts for the dashboard, drawn with Plotters.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use plotters::prelude::*;

use crate::metrics::MonthlyTrend;
use crate::models::{Month, RfmRecord, SeasonTotal, Weather};
use crate::pipeline::DashboardView;
use crate::stats::BoxSummary;

const COOLWARM: [RGBColor; 4] = [
    RGBColor(59, 76, 192),
    RGBColor(170, 199, 253),
    RGBColor(247, 183, 153),
    RGBColor(180, 4, 38),
];

const VIRIDIS: [RGBColor; 5] = [
    RGBColor(68, 1, 84),
    RGBColor(59, 82, 139),
    RGBColor(33, 145, 140),
    RGBColor(94, 201, 98),
    RGBColor(253, 231, 37),
];

const YEAR_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

/// Draw every chart into `out_dir`. Each chart succeeds or fails on its own.
pub fn render_all(
    view: &DashboardView,
    out_dir: &Path,
) -> Vec<(&'static str, anyhow::Result<PathBuf>)> {
    if let Err(err) = std::fs::create_dir_all(out_dir) {
        let err = anyhow::Error::new(err)
            .context(format!("failed to create {}", out_dir.display()));
        return vec![("charts", Err(err))];
    }

    let target = |name: &str| out_dir.join(name);
    let mut results = Vec::new();

    let path = target("season_totals.png");
    results.push(("season totals", season_bar_chart(&view.season_totals, &path).map(|_| path)));

    let path = target("weather_boxplot.png");
    results.push(("weather box plot", weather_box_plot(&view.weather, &path).map(|_| path)));

    let path = target("monthly_trend.png");
    let drawn = match &view.monthly_trend {
        Ok(trend) => monthly_trend_chart(trend, &path),
        Err(err) => Err(anyhow::anyhow!("monthly trend unavailable: {err}")),
    };
    results.push(("monthly trend", drawn.map(|_| path)));

    let path = target("rfm_scatter.png");
    let drawn = match &view.rfm {
        Ok(rfm) => rfm_scatter(rfm, &path),
        Err(err) => Err(anyhow::anyhow!("RFM table unavailable: {err}")),
    };
    results.push(("RFM scatter", drawn.map(|_| path)));

    results
}

/// Bar chart of total rentals per season.
pub fn season_bar_chart(totals: &[SeasonTotal], path: &Path) -> anyhow::Result<()> {
    let labels: Vec<&str> = totals.iter().map(|t| t.season.label()).collect();
    let max = totals.iter().map(|t| t.count).max().unwrap_or(0).max(1) as f64;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Total Bike Rentals by Season", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..labels.len().max(1) as u32).into_segmented(), 0f64..max * 1.1)?;

    let x_fmt = |v: &SegmentValue<u32>| segment_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Season")
        .y_desc("Total Rentals")
        .x_label_formatter(&x_fmt)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(totals.iter().enumerate().map(|(i, total)| {
        let i = i as u32;
        let color = COOLWARM[total.season as usize % COOLWARM.len()];
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), total.count as f64),
            ],
            color.filled(),
        );
        bar.set_margin(0, 0, 20, 20);
        bar
    }))?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("season chart saved to {}", path.display());
    Ok(())
}

/// Box plot of daily rentals per weather condition.
pub fn weather_box_plot(groups: &BTreeMap<Weather, Vec<u32>>, path: &Path) -> anyhow::Result<()> {
    let labels: Vec<&str> = groups.keys().map(|w| w.label()).collect();
    let max = groups.values().flatten().copied().max().unwrap_or(0).max(1) as f32;

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Box Plot: Weather vs Bike Rentals", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..labels.len().max(1) as u32).into_segmented(), 0f32..max * 1.1)?;

    let x_fmt = |v: &SegmentValue<u32>| segment_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Weather Condition")
        .y_desc("Total Rentals")
        .x_label_formatter(&x_fmt)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // Segmented axes reserve one trailing segment past the last label.
    let segment = chart.plotting_area().dim_in_pixel().0 / (labels.len().max(1) as u32 + 1);
    let inset = segment / 4;
    let half_width = (segment / 2).saturating_sub(inset).max(2) as i32;

    for (i, (weather, counts)) in groups.iter().enumerate() {
        let Some(summary) = BoxSummary::from_values(counts) else {
            continue;
        };
        let i = i as u32;
        let key = SegmentValue::CenterOf(i);
        let color = viridis(*weather as usize as f64 / (Weather::ALL.len() - 1) as f64);
        let [low, q1, median, q3, high] = box_extents(&summary);

        let corners = [(SegmentValue::Exact(i), q1), (SegmentValue::Exact(i + 1), q3)];
        let mut body = Rectangle::new(corners.clone(), color.mix(0.6).filled());
        body.set_margin(0, 0, inset, inset);
        let mut outline = Rectangle::new(corners, color.stroke_width(2));
        outline.set_margin(0, 0, inset, inset);
        chart.draw_series(vec![body, outline])?;

        chart.draw_series(vec![
            PathElement::new(vec![(key.clone(), low), (key.clone(), q1)], color.stroke_width(2)),
            PathElement::new(vec![(key.clone(), q3), (key.clone(), high)], color.stroke_width(2)),
        ])?;

        let cap = half_width / 2;
        chart.draw_series(vec![
            EmptyElement::at((key.clone(), low))
                + PathElement::new(vec![(-cap, 0), (cap, 0)], color.stroke_width(2)),
            EmptyElement::at((key.clone(), high))
                + PathElement::new(vec![(-cap, 0), (cap, 0)], color.stroke_width(2)),
            EmptyElement::at((key.clone(), median))
                + PathElement::new(vec![(-half_width, 0), (half_width, 0)], BLACK.stroke_width(2)),
        ])?;

        chart.draw_series(
            summary
                .outliers
                .iter()
                .map(|&v| Circle::new((key.clone(), v as f32), 3, color.stroke_width(1))),
        )?;
    }

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("weather chart saved to {}", path.display());
    Ok(())
}

/// One line per year of average daily rentals, Jan..Dec.
pub fn monthly_trend_chart(trend: &MonthlyTrend, path: &Path) -> anyhow::Result<()> {
    let labels: Vec<&str> = Month::ALL.iter().map(|m| m.label()).collect();
    let max = trend.max_mean().unwrap_or(1.0).max(1.0);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let first = trend.years.keys().next().copied().unwrap_or_default();
    let last = trend.years.keys().last().copied().unwrap_or_default();
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Average Monthly Bike Rentals ({first} vs {last})"),
            ("sans-serif", 30),
        )
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((0u32..labels.len().max(1) as u32).into_segmented(), 0f64..max * 1.1)?;

    let x_fmt = |v: &SegmentValue<u32>| segment_label(v, &labels);
    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Average Rentals")
        .x_labels(labels.len())
        .x_label_formatter(&x_fmt)
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (i, (year, months)) in trend.years.iter().enumerate() {
        let color = YEAR_COLORS[i % YEAR_COLORS.len()];

        // Missing months break the line instead of dropping to zero.
        let mut runs: Vec<Vec<(SegmentValue<u32>, f64)>> = vec![Vec::new()];
        for (month, mean) in months {
            match mean {
                Some(mean) => {
                    if let Some(run) = runs.last_mut() {
                        run.push((SegmentValue::CenterOf(month.index() as u32), *mean));
                    }
                }
                None => runs.push(Vec::new()),
            }
        }
        for run in runs.iter().filter(|run| run.len() > 1) {
            chart.draw_series(LineSeries::new(run.iter().cloned(), color.stroke_width(2)))?;
        }

        chart
            .draw_series(
                runs.iter()
                    .flatten()
                    .map(|point| Circle::new(point.clone(), 4, color.filled())),
            )?
            .label(year.to_string())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x - 10, y), (x + 10, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("monthly trend chart saved to {}", path.display());
    Ok(())
}

/// Recency against monetary value, coloured by frequency.
pub fn rfm_scatter(rfm: &[RfmRecord], path: &Path) -> anyhow::Result<()> {
    let max_recency = rfm.iter().map(|r| r.recency).max().unwrap_or(0).max(1) as f64;
    let max_monetary = rfm.iter().map(|r| r.monetary).max().unwrap_or(0).max(1) as f64;

    let mut by_frequency: BTreeMap<usize, Vec<&RfmRecord>> = BTreeMap::new();
    for record in rfm {
        by_frequency.entry(record.frequency).or_default().push(record);
    }
    let lowest = by_frequency.keys().next().copied().unwrap_or(1);
    let highest = by_frequency.keys().last().copied().unwrap_or(1);

    let root = BitMapBackend::new(path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("RFM Analysis: Recency vs Monetary vs Frequency", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(0f64..max_recency * 1.05, 0f64..max_monetary * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Recency (Days Since Last Rental)")
        .y_desc("Monetary (Total Rentals)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for (frequency, records) in &by_frequency {
        let t = if highest > lowest {
            (frequency - lowest) as f64 / (highest - lowest) as f64
        } else {
            0.5
        };
        let color = viridis(t);

        chart
            .draw_series(records.iter().map(|r| {
                Circle::new((r.recency as f64, r.monetary as f64), 5, color.mix(0.7).filled())
            }))?
            .label(format!("Frequency {frequency}"))
            .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!("RFM chart saved to {}", path.display());
    Ok(())
}

/// Vertical positions drawn for one box: lower whisker end, q1, median, q3 and
/// upper whisker end. Whiskers stop at the outermost counts inside the fences.
fn box_extents(summary: &BoxSummary) -> [f32; 5] {
    [
        summary.lower_whisker as f32,
        summary.q1 as f32,
        summary.median as f32,
        summary.q3 as f32,
        summary.upper_whisker as f32,
    ]
}

fn segment_label(value: &SegmentValue<u32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|l| l.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Sample the viridis colormap at `t` in `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    let scaled = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let index = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let fraction = scaled - index as f64;

    let (RGBColor(r0, g0, b0), RGBColor(r1, g1, b1)) = (VIRIDIS[index], VIRIDIS[index + 1]);
    let lerp =
        |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * fraction).round() as u8;
    RGBColor(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}
