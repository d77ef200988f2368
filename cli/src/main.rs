//! `macro-sim` - run a macroeconomic simulation from a JSON scenario
//!
//! ```text
//! macro-sim run --config scenario.json --periods 24
//! macro-sim validate --config scenario.json
//! ```
//!
//! Period totals are printed as JSON lines on stdout; logs go to stderr
//! and are controlled with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use macro_simulator_core_rs::{Simulation, SimulationConfig};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "macro-sim", version, about = "Agent-based macroeconomic simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and print one JSON line per period
    Run {
        /// Scenario file
        #[arg(short, long)]
        config: PathBuf,

        /// Override the number of periods
        #[arg(short, long)]
        periods: Option<usize>,

        /// Override the RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print a snapshot of the final state after the last period
        #[arg(long)]
        snapshot: bool,
    },

    /// Check a scenario without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SimulationConfig::from_json(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

fn run(config: PathBuf, periods: Option<usize>, seed: Option<u64>, snapshot: bool) -> Result<()> {
    let mut config = load_config(&config)?;
    if let Some(periods) = periods {
        config.periods = periods;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config).context("Invalid scenario")?;
    log::info!("config hash {}", simulation.config_hash());

    while !simulation.is_finished() {
        let result = simulation.run_period()?;
        println!("{}", serde_json::to_string(&result)?);
    }

    if snapshot {
        println!("{}", simulation.snapshot()?.to_json()?);
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            periods,
            seed,
            snapshot,
        } => run(config, periods, seed, snapshot),
        Commands::Validate { config } => {
            let simulation = Simulation::new(load_config(&config)?).context("Invalid scenario")?;
            println!(
                "ok: {} agents, {} periods, config hash {}",
                simulation.economy().num_agents(),
                simulation.total_periods(),
                simulation.config_hash()
            );
            Ok(())
        }
    }
}
