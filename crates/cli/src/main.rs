//! Headless behavior tree simulation.
//!
//! Instantiates a patrol tree per agent and ticks all of them with a
//! simulated clock. Run with: `cargo run -p bt-cli -- --agents 5`
mod config;
mod sim;

use std::path::PathBuf;

use anyhow::Result;
use bt_runtime::{RunnerConfig, UpdateMode};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::SimConfig;
use sim::Simulation;

/// Patrol simulation driven by behavior trees
#[derive(Parser, Debug)]
#[command(name = "bt-sim")]
#[command(about = "Headless behavior tree patrol simulation", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file with simulation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of agents
    #[arg(short, long)]
    agents: Option<usize>,

    /// Number of frames to simulate
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for every tree's random source
    #[arg(long)]
    seed: Option<u64>,

    /// `auto` ticks every frame, `manual` every `tick_interval` frames
    #[arg(long)]
    update_mode: Option<UpdateMode>,

    /// Put a breakpoint at the start of every patrol leg
    #[arg(long)]
    breakpoints: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_file.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let runner_config = RunnerConfig::from_env()?;
    apply_overrides(&cli, &mut config);

    let summary = Simulation::new(config, runner_config)?.run()?;

    println!("simulated {} frames", summary.frames);
    for report in &summary.agents {
        let [x, y, z] = report.position;
        let status = report
            .last_status
            .map_or_else(|| "-".to_string(), |status| status.to_string());
        println!(
            "  {:<10} pos=({:>6.2}, {:>5.2}, {:>6.2}) ticks={:<5} breaks={:<3} last={}",
            report.name, x, y, z, report.ticks, report.breaks, status
        );
    }
    Ok(())
}

/// Command-line flags win over the config file, which wins over the environment.
fn apply_overrides(cli: &Cli, config: &mut SimConfig) {
    if let Some(agents) = cli.agents {
        config.agents = agents;
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if cli.breakpoints {
        config.breakpoints = true;
    }
    if let Some(mode) = cli.update_mode {
        config.update_mode = Some(mode);
    }
}

/// Setup logging to stderr and, optionally, to a file.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging(log_file: Option<&std::path::Path>) -> Result<Option<WorkerGuard>> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => std::path::Path::new("."),
            };
            std::fs::create_dir_all(dir)?;
            let name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("log file path has no file name: {}", path.display()))?;

            let file_appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file {
        tracing::info!("Log file: {}", path.display());
    }
    Ok(guard)
}
