//! Headless smeltery runner.
//!
//! Starts the economy, logs a dashboard line every `--report-every` seconds,
//! accepts console commands on stdin and writes a JSON snapshot to `--save`
//! when interrupted or told to quit.
//!
//! Run with: `cargo run --package smeltery-headless -- --levels crates/smeltery-data/data/levels.ron`

mod console;
mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use smeltery_core::{Economy, LevelTable, ResourceMap, SaveHook};
use smeltery_data::{JsonFileSaveHook, load_level_table};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::console::Command;

#[derive(Debug, Parser)]
#[command(version, about = "Run the smeltery economy without a front end")]
struct Args {
    /// Level data file (.ron, .toml or .json). Built-in ladders when omitted.
    #[arg(long)]
    levels: Option<PathBuf>,

    /// Where the teardown snapshot is written.
    #[arg(long, default_value = "economy-save.json")]
    save: PathBuf,

    /// Seconds between dashboard log lines.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    report_every: u64,

    #[arg(long, default_value_t = 0)]
    seed_iron: u64,

    #[arg(long, default_value_t = 0)]
    seed_copper: u64,

    #[arg(long, default_value_t = 0)]
    seed_gold: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let table = match &args.levels {
        Some(path) => load_level_table(path)
            .with_context(|| format!("failed to load level table from {}", path.display()))?,
        None => LevelTable::standard(),
    };
    let economy = Economy::builder()
        .level_table(table)
        .balances(ResourceMap::new(args.seed_iron, args.seed_copper, args.seed_gold))
        .start();
    log::info!("economy started, saving to {}", args.save.display());

    let mut hook = JsonFileSaveHook::new(&args.save);
    run(&economy, &mut hook, Duration::from_secs(args.report_every)).await?;

    let snapshot = economy
        .save_state(&mut hook)
        .with_context(|| format!("failed to save economy state to {}", args.save.display()))?;
    log::info!(
        "final balances: iron {}, copper {}, gold {}",
        snapshot.balances.iron,
        snapshot.balances.copper,
        snapshot.balances.gold
    );
    Ok(())
}

/// Report, serve console commands and wait for ctrl-c or `quit`.
async fn run(economy: &Economy, hook: &mut dyn SaveHook, report_every: Duration) -> Result<()> {
    let mut report = tokio::time::interval(report_every);
    report.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = report.tick() => {
                log::info!("{}", report::dashboard_line(&economy.dashboard()));
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("failed to read stdin")? else {
                    log::debug!("stdin closed, console disabled");
                    stdin_open = false;
                    continue;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => println!("{}", console::execute(economy, hook, &command)),
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                }
            }
            signal = &mut shutdown => {
                signal.context("failed to listen for ctrl-c")?;
                log::info!("interrupt received, shutting down");
                break;
            }
        }
    }
    Ok(())
}
