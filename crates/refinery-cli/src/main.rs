use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use refinery_core::{CollectingEventSink, Engine, EventSink, SimConfig, StdRandomSource};
use std::path::PathBuf;

mod demo;
mod report_writer;

/// Crude-oil refinery tank farm discrete-event simulator.
#[derive(Parser)]
#[command(name = "refinery-sim")]
#[command(about = "Crude-oil refinery tank farm discrete-event simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and write its output streams to a directory
    Run {
        /// Path to a JSON config file (see `demo::demo_config` for the shape)
        #[arg(long, conflicts_with = "demo")]
        config: Option<PathBuf>,

        /// Use the built-in demo preset instead of a config file
        #[arg(long)]
        demo: bool,

        /// Directory to write the four CSV output streams into
        #[arg(long, default_value = "out")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, demo, out_dir } => run(config, demo, out_dir),
    }
}

fn run(config_path: Option<PathBuf>, demo: bool, out_dir: PathBuf) -> Result<()> {
    let config = load_config(config_path, demo)?;
    config.validate().context("invalid simulation config")?;

    let seed = config.effective_seed();
    let rng = Box::new(StdRandomSource::from_seed(seed));
    let sink: Box<dyn EventSink> = Box::new(CollectingEventSink::new());

    let engine = Engine::new(config, rng, sink);
    let output = engine.run().context("simulation run failed")?;

    tracing::info!(
        events = output.events.len(),
        days = output.daily_summary.len(),
        cargos = output.cargo_report.len(),
        snapshots = output.tank_snapshots.len(),
        "simulation complete"
    );

    report_writer::write_all(&out_dir, &output)?;
    Ok(())
}

fn load_config(config_path: Option<PathBuf>, demo: bool) -> Result<SimConfig> {
    if demo {
        return Ok(demo::demo_config());
    }
    let path = config_path.context("either --config <file> or --demo is required")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}
