//! `slot` CLI: run the scheduling engine over a JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! # Drop zones for every provider on a day
//! slot zones -i schedule.json --date 2026-02-20
//!
//! # Drop zones for one provider, snapshot on stdin
//! cat schedule.json | slot zones --date 2026-02-20 --provider dr-smith
//!
//! # Evaluate dropping appointment a1 on dr-jones at 10:30
//! slot drop -i schedule.json --appointment a1 --provider dr-jones --at 10:30
//!
//! # Resolve the resulting conflict by swapping
//! slot resolve -i schedule.json --appointment a1 --provider dr-smith --at 600 --strategy swap
//!
//! # Policies from a TOML file, debug logging on stderr
//! slot --config slot.toml -v resolve ... --strategy move-next
//! ```

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use slot_engine::clock::{current_time_marker, Clock, SystemClock};
use slot_engine::{
    availability, DragSession, DropOutcome, EngineConfig, ResolutionStrategy, Schedule,
};
use std::io::{self, Read};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slot",
    version,
    about = "Drop zones, drop validation and conflict resolution for appointment calendars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log evaluation steps to stderr (overridden by SLOT_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show free intervals per provider for a day
    Zones {
        /// Snapshot file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// Day to inspect, YYYY-MM-DD (today if omitted)
        #[arg(long)]
        date: Option<String>,
        /// Only this provider
        #[arg(long)]
        provider: Option<String>,
    },
    /// Evaluate dropping an appointment on a provider column
    Drop {
        #[command(flatten)]
        target: DropArgs,
    },
    /// Drop an appointment and settle the resulting conflict
    Resolve {
        #[command(flatten)]
        target: DropArgs,
        /// cancel, force, swap or move-next
        #[arg(long)]
        strategy: String,
    },
}

#[derive(clap::Args)]
struct DropArgs {
    /// Snapshot file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
    /// Id of the dragged appointment
    #[arg(long)]
    appointment: String,
    /// Target provider column
    #[arg(long)]
    provider: String,
    /// Drop position: HH:MM or minutes since midnight
    #[arg(long, allow_hyphen_values = true)]
    at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ZonesReport {
    date: NaiveDate,
    /// Minute of the "now" marker when the day is today.
    now_marker: Option<i64>,
    columns: Vec<availability::ProviderAvailability>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Zones {
            input,
            output,
            date,
            provider,
        } => {
            let schedule = read_schedule(input.as_deref())?;
            let clock = SystemClock;
            let date = match date {
                Some(raw) => parse_date(&raw)?,
                None => clock.now().date(),
            };

            let mut columns = availability::compute_all_drop_zones(&schedule, date);
            if let Some(provider) = provider {
                columns.retain(|column| column.provider.id == provider);
                if columns.is_empty() {
                    bail!("Unknown provider: '{}'", provider);
                }
            }

            let report = ZonesReport {
                date,
                now_marker: current_time_marker(&clock, date),
                columns,
            };
            write_json(output.as_deref(), &report)?;
        }
        Commands::Drop { target } => {
            let schedule = read_schedule(target.input.as_deref())?;
            let (_, outcome) = drop_appointment(&schedule, &target, &config)?;
            write_json(target.output.as_deref(), &outcome)?;
        }
        Commands::Resolve { target, strategy } => {
            let strategy: ResolutionStrategy = strategy.parse()?;
            let schedule = read_schedule(target.input.as_deref())?;
            let (session, outcome) = drop_appointment(&schedule, &target, &config)?;

            if session.pending_conflict().is_none() {
                bail!(
                    "Drop of '{}' did not conflict ({}); nothing to resolve",
                    target.appointment,
                    outcome_name(&outcome)
                );
            }
            let (_, commands) = session
                .resolve(strategy, &schedule.appointments, &config)
                .with_context(|| format!("Failed to resolve conflict with '{}'", strategy))?;
            write_json(target.output.as_deref(), &commands)?;
        }
    }

    Ok(())
}

/// Run one drag of `--appointment` through a fresh session.
fn drop_appointment(
    schedule: &Schedule,
    target: &DropArgs,
    config: &EngineConfig,
) -> Result<(DragSession, DropOutcome)> {
    let dragged = schedule.require_appointment(&target.appointment)?;
    let position = parse_position(&target.at)?;

    let session = DragSession::new().start(dragged)?;
    let (session, outcome) = session.end(
        &schedule.appointments,
        &schedule.providers,
        &target.provider,
        position,
        config,
    )?;
    Ok((session, outcome))
}

fn outcome_name(outcome: &DropOutcome) -> &'static str {
    match outcome {
        DropOutcome::Move { .. } => "move",
        DropOutcome::Conflict { .. } => "conflict",
        DropOutcome::Rejected { .. } => "rejected",
    }
}

/// `HH:MM` is parsed strictly; anything else must be an integer minute.
fn parse_position(raw: &str) -> Result<i64> {
    if raw.contains(':') {
        return Ok(slot_engine::time::parse_time_to_minutes(raw)?);
    }
    raw.trim()
        .parse()
        .with_context(|| format!("Invalid drop position '{}': expected HH:MM or minutes", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", raw))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("SLOT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            toml::from_str(&raw).with_context(|| format!("Failed to parse config: {}", path))?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn read_schedule(path: Option<&str>) -> Result<Schedule> {
    let json = read_input(path)?;
    Schedule::from_json(&json).context("Failed to parse schedule snapshot")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: Serialize>(path: Option<&str>, value: &T) -> Result<()> {
    let pretty = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => {
            std::fs::write(path, pretty).with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", pretty);
        }
    }
    Ok(())
}
