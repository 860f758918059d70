use clap::{Args, Parser, Subcommand, ValueEnum};
use fluxgen::core::physics::spline::EnergyIndexing;
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "fluxgen - flux-driven interaction event generator with adaptive rejection sampling.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to run independent jobs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate interaction events from a job file.
    Generate(GenerateArgs),
    /// Validate a job file and report the detector and physics setup without generating.
    Check(CheckArgs),
}

/// Likelihood spline mode, from `--splines` or `job.splines`.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SplineMode {
    Off,
    Linear,
    Log,
}

impl SplineMode {
    pub fn indexing(self) -> Option<EnergyIndexing> {
        match self {
            SplineMode::Off => None,
            SplineMode::Linear => Some(EnergyIndexing::Linear),
            SplineMode::Log => Some(EnergyIndexing::Log),
        }
    }
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write accepted events as CSV to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the total number of events to generate.
    #[arg(short = 'n', long, value_name = "INT")]
    pub events: Option<u64>,

    /// Override the base random seed. Job `i` uses `seed + i`.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of independent jobs.
    #[arg(long, value_name = "INT")]
    pub jobs: Option<usize>,

    /// Override the likelihood spline mode.
    #[arg(long, value_enum, value_name = "MODE")]
    pub splines: Option<SplineMode>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S job.pmax-headroom=1.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,
}
