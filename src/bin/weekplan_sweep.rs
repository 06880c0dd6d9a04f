//! Runs the review fallback for every owner with open tasks in a week.
//!
//! Usage:
//!
//! ```text
//! weekplan-sweep [<year> <week>]
//! ```
//!
//! Without arguments the sweep targets the ISO week before the current one.
//! Settings come from `weekplan.toml` and `WEEKPLAN_*` variables; the
//! [`SweepOutcome`] is written to stdout as JSON.

use chrono::{Days, NaiveDate};
use mockable::{Clock, DefaultClock};
use std::env;
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;
use weekplan::config::WeekplanConfig;
use weekplan::task::adapters::postgres::PostgresTaskRepository;
use weekplan::task::domain::PlanningWeek;
use weekplan::task::services::{RolloverService, SweepOutcome};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
enum SweepError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to write sweep summary: {0}")]
    Output(#[source] serde_json::Error),
}

fn main() -> Result<(), BoxError> {
    let config = WeekplanConfig::load()?;
    weekplan::telemetry::init(&config.log)?;

    let clock = Arc::new(DefaultClock);
    let args: Vec<String> = env::args().skip(1).collect();
    let week = parse_week(&args, clock.utc().date_naive())?;

    let repository = Arc::new(PostgresTaskRepository::connect(&config.database)?);
    let service = RolloverService::new(repository, clock)
        .with_fallback_reason(config.rollover.fallback_reason.clone());

    let runtime = build_runtime()?;
    let outcome = runtime.block_on(service.sweep_week(week))?;
    info!(week = %week, "sweep complete");
    write_summary(&outcome)?;
    Ok(())
}

/// Resolves the week to sweep from the command-line arguments.
fn parse_week(args: &[String], today: NaiveDate) -> Result<PlanningWeek, BoxError> {
    match args {
        [] => previous_week(today),
        [raw_year, raw_week] => {
            let year: i32 = raw_year.parse().map_err(|_| {
                SweepError::InvalidArgs(format!("year '{raw_year}' is not a number"))
            })?;
            let week: u32 = raw_week.parse().map_err(|_| {
                SweepError::InvalidArgs(format!("week '{raw_week}' is not a number"))
            })?;
            Ok(PlanningWeek::new(year, week)?)
        }
        _ => Err(SweepError::InvalidArgs("expected no arguments or <year> <week>".into()).into()),
    }
}

fn previous_week(today: NaiveDate) -> Result<PlanningWeek, BoxError> {
    let last_week = today
        .checked_sub_days(Days::new(7))
        .ok_or_else(|| SweepError::InvalidArgs(format!("no week precedes {today}")))?;
    Ok(PlanningWeek::containing(last_week))
}

fn build_runtime() -> Result<tokio::runtime::Runtime, SweepError> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SweepError::RuntimeInit)
}

fn write_summary(outcome: &SweepOutcome) -> Result<(), SweepError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, outcome).map_err(SweepError::Output)?;
    stdout
        .write_all(b"\n")
        .map_err(|err| SweepError::Output(serde_json::Error::io(err)))
}
