//! Barbot CLI — validate engine configs and replay them over historical bars.
//!
//! Commands:
//! - `check` — parse and validate a TOML config, print the resolved settings
//! - `replay` — run the configured engine over a CSV of bars on a paper broker

mod bars;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use barbot_core::config::EngineConfig;
use barbot_core::domain::TradeCommand;
use barbot_core::engine::CommandOutcome;
use barbot_core::replay::{Replay, ReplayReport, ReplayStep};

#[derive(Parser)]
#[command(name = "barbot", about = "Barbot CLI — bar-close trading decision engine")]
struct Cli {
    /// Log filter used when RUST_LOG is unset (e.g. "info", "barbot_core=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a TOML config and print the resolved engine settings.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Replay a config over a CSV bar file using the paper broker.
    Replay {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// CSV with columns date,open,high,low,close[,volume], oldest first.
        #[arg(long)]
        bars: PathBuf,

        /// Emit one JSON object per bar instead of a text log.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Check { config } => run_check(&config),
        Commands::Replay { config, bars, json } => run_replay(&config, &bars, json),
    }
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let config = EngineConfig::from_file(path)?;
    for warning in config.warnings() {
        warn!(config = %path.display(), "{warning}");
    }
    Ok(config)
}

fn run_check(path: &Path) -> Result<()> {
    let config = load_config(path)?;
    let settings = config.settings()?;

    println!("Config OK: {}", path.display());
    println!("  Fingerprint:  {}", config.fingerprint().short());
    println!("  Symbol:       {}", config.symbol.name);
    println!("  Label:        {}", settings.label);
    println!(
        "  Volume:       {} lots ({} units)",
        config.volume_lots, settings.volume_units
    );
    println!("  Stop loss:    {} pips", settings.stop_loss_pips);
    println!("  Take profit:  {} pips", settings.take_profit_pips);
    println!(
        "  Signal:       {}",
        serde_json::to_string(&config.signal).context("encode signal config")?
    );
    Ok(())
}

fn run_replay(config_path: &Path, bars_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let bars = bars::load_bars(bars_path)?;
    info!(bars = bars.len(), label = config.label(), "starting replay");

    let report = Replay::from_config(&config)?
        .run(&bars)
        .context("replay aborted")?;

    if json {
        for step in report.active_steps() {
            println!("{}", serde_json::to_string(step)?);
        }
    } else {
        for step in report.active_steps() {
            print_step(step);
        }
        print_summary(&report);
    }
    Ok(())
}

fn print_step(step: &ReplayStep) {
    for closed in &step.protective_closes {
        println!(
            "{}  {:?} hit  #{} {} @ {:.5}",
            step.date, closed.reason, closed.position.id, closed.position.side, closed.exit_price
        );
    }
    for issued in &step.decision.commands {
        let status = match &issued.outcome {
            CommandOutcome::Accepted {
                position_id: Some(id),
            } => format!("ok #{id}"),
            CommandOutcome::Accepted { position_id: None } => "ok".to_string(),
            CommandOutcome::Rejected { reason } => format!("REJECTED ({reason})"),
        };
        match &issued.command {
            TradeCommand::Open(cmd) => println!(
                "{}  open {} {} units  SL {} / TP {} pips  {}",
                step.date, cmd.side, cmd.volume, cmd.stop_loss_pips, cmd.take_profit_pips, status
            ),
            TradeCommand::Close(cmd) => {
                println!("{}  close #{}  {}", step.date, cmd.position_id, status)
            }
        }
    }
}

fn print_summary(report: &ReplayReport) {
    println!();
    println!("=== Replay Summary ===");
    println!("Bars evaluated:   {}", report.steps.len());
    println!("Bars skipped:     {}", report.skipped_bars);
    println!("Opens issued:     {}", report.open_count());
    println!("Closes issued:    {}", report.close_count());
    println!("Positions closed: {}", report.closed_positions.len());
    println!("Still open:       {}", report.open_positions.len());
}
