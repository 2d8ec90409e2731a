//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

/// Used when `--config` is not given; a missing file here means built-in defaults.
pub const DEFAULT_CONFIG: &str = "etc/setpoint.toml";

#[derive(Parser, Debug)]
#[command(
    name = "setpoint",
    version,
    about = "Trim-and-respond setpoint reset and optimal start"
)]
pub struct Cli {
    /// Path to config TOML [default: etc/setpoint.toml if present]
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print cycles and errors as JSON lines; logs go to stderr as JSON too
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG wins if set
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Options shared by the two trim-and-respond loops.
#[derive(Args, Debug, Clone)]
pub struct LoopArgs {
    /// Stop after this many cycles (default: run until Ctrl-C)
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// Seed the synthetic source for a reproducible run
    #[arg(long, value_name = "SEED", conflicts_with = "replay")]
    pub seed: Option<u64>,

    /// Replay snapshots from a CSV fixture instead of synthetic readings
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Start the replay over when it runs out
    #[arg(long = "loop", action = ArgAction::SetTrue, requires = "replay")]
    pub loop_replay: bool,

    /// Skip the configured initial delay before the first cycle
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_delay: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StartMethod {
    /// Adaptive linear model learned from the history
    Model,
    /// Inverse-distance blend of the two nearest recorded days
    Interpolate,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Duct static pressure reset (damper positions)
    Pressure(LoopArgs),
    /// Supply-air temperature reset (zone temperatures, outdoor-air ceiling)
    Temperature(LoopArgs),
    /// Estimate how early to start equipment before occupancy
    OptimalStart {
        /// Warm-up history CSV (zone_temp,outdoor_temp,duration_min)
        #[arg(long, value_name = "FILE")]
        history: PathBuf,
        /// Current zone temperature
        #[arg(long, allow_negative_numbers = true)]
        zone_temp: f64,
        /// Current outdoor temperature
        #[arg(long, allow_negative_numbers = true)]
        outdoor_temp: f64,
        /// Override optimal_start.occupied_setpoint
        #[arg(long, allow_negative_numbers = true)]
        occupied_setpoint: Option<f64>,
        #[arg(long, value_enum, default_value_t = StartMethod::Model)]
        method: StartMethod,
        /// Occupancy time (HH:MM); prints the wall-clock start time
        #[arg(long, value_name = "HH:MM", value_parser = parse_hhmm)]
        occupancy: Option<chrono::NaiveTime>,
    },
    /// Load and validate the config, then exit
    CheckConfig,
}

fn parse_hhmm(s: &str) -> Result<chrono::NaiveTime, String> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}
