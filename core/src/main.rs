//! POSE EKF: a simulation tool for the position / yaw-bias Extended Kalman Filter.
//!
//! The program synthesizes a trajectory with biased, noisy odometry and periodic (sometimes outlying) absolute
//! fixes, replays it through the filter, and writes the per-step results to CSV.
//!
//! You can configure a run either by:
//!   1. Loading all parameters from a configuration file (TOML/JSON/YAML)
//!   2. Overriding individual parameters via command-line flags

use clap::{Args, Parser, Subcommand};
use log::{error, info};
use pose_ekf::sim::{ScenarioConfig, run_scenario};
use std::error::Error;
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser)]
#[command(
    author,
    version,
    about = "A simulation tool for the position / yaw-bias Extended Kalman Filter."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Log file path (if not specified, logs to stderr)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

/// Top-level commands
#[derive(Subcommand, Clone)]
enum Command {
    /// Run a simulated scenario and write the per-step results to CSV
    Run(RunArgs),
    /// Write the default scenario configuration to a file (TOML/JSON/YAML by extension)
    Config {
        /// Output configuration path
        #[arg(short, long, default_value = "scenario.toml")]
        output: PathBuf,
    },
}

#[derive(Args, Clone, Debug)]
struct RunArgs {
    /// Scenario configuration file (TOML/JSON/YAML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV file
    #[arg(short, long, default_value = "pose_ekf.csv")]
    output: PathBuf,

    /// Override the random number generator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of steps
    #[arg(long)]
    steps: Option<usize>,

    /// Override the outlier probability
    #[arg(long)]
    outlier_probability: Option<f64>,

    /// Deliver position + orientation fixes instead of position-only fixes
    #[arg(long)]
    orientation_fixes: bool,
}

/// Initialize the global logger with a timestamped format, writing to `log_file` when given.
fn init_logger(log_level: &str, log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    use std::io::Write;

    let level = log_level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
        log::LevelFilter::Info
    });

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(log_path) = log_file {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.try_init()?;
    Ok(())
}

fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            ScenarioConfig::from_file(path)?
        }
        None => ScenarioConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(probability) = args.outlier_probability {
        config.outlier_probability = probability;
    }
    if args.orientation_fixes {
        config.orientation_fixes = true;
    }

    let result = run_scenario(&config)?;
    result.log_summary();
    result.to_csv(&args.output)?;
    info!("Results written to {}", args.output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(&cli.log_level, cli.log_file.as_ref())?;

    let outcome = match &cli.command {
        Command::Run(args) => run(args),
        Command::Config { output } => ScenarioConfig::default()
            .to_file(output)
            .map(|_| info!("Default configuration written to {}", output.display()))
            .map_err(Into::into),
    };
    if let Err(e) = &outcome {
        error!("{}", e);
    }
    outcome
}
