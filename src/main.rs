use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod charts;
mod config;
mod error;
mod export;
mod filter;
mod loader;
mod metrics;
mod models;
mod normalize;
mod pipeline;
mod report;
mod stats;

use config::DashboardConfig;
use pipeline::Dashboard;

#[derive(Parser)]
#[command(name = "bike-dashboard")]
#[command(about = "Bike sharing rental analysis dashboard", long_about = None)]
struct Cli {
    /// Daily rentals CSV
    #[arg(long, global = true, env = "BIKE_DAY_CSV", default_value = "Day.csv")]
    day: PathBuf,

    /// Hourly rentals CSV
    #[arg(long, global = true, env = "BIKE_HOUR_CSV", default_value = "Hour.csv")]
    hour: PathBuf,

    /// First date to include (YYYY-MM-DD); defaults to the earliest day
    #[arg(long, global = true)]
    start: Option<NaiveDate>,

    /// Last date to include (YYYY-MM-DD); defaults to the latest day
    #[arg(long, global = true)]
    end: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print descriptive statistics and season totals
    Summary,
    /// Write the full dashboard as markdown
    Report {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
    /// Draw the dashboard charts as PNG files
    Charts {
        #[arg(long, default_value = "charts")]
        out_dir: PathBuf,
    },
    /// Write every computed view as JSON
    Export {
        #[arg(long, default_value = "dashboard.json")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = DashboardConfig {
        day_path: cli.day,
        hour_path: cli.hour,
        start: cli.start,
        end: cli.end,
    };
    config.log_config();

    let dashboard = Dashboard::load(&config).context("failed to prepare the rental dataset")?;
    let range = config.resolve_range(dashboard.span())?;
    let view = dashboard.view(range);

    match cli.command {
        Commands::Summary => {
            print!("{}", report::build_summary(&view));
        }
        Commands::Report { out } => {
            let report = report::build_report(&view);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Charts { out_dir } => {
            let mut failures = 0usize;
            for (chart, result) in charts::render_all(&view, &out_dir) {
                match result {
                    Ok(path) => println!("{chart}: {}", path.display()),
                    Err(err) => {
                        failures += 1;
                        tracing::error!("{chart} failed: {err:#}");
                        println!("{chart}: unavailable ({err:#})");
                    }
                }
            }
            if failures > 0 {
                anyhow::bail!("{failures} chart(s) could not be rendered");
            }
        }
        Commands::Export { out } => {
            let json = export::to_json(&dashboard, &view)?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Dashboard data written to {}.", out.display());
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins; otherwise
/// `DASHBOARD_LOG_LEVEL` (default `info`). Logs go to stderr.
fn init_tracing() {
    let use_color = match std::env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match std::env::var("DASHBOARD_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
