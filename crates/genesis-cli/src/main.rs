//! Genesis block miner.
//!
//! Builds the coinbase, merkle root and header for a new chain's genesis
//! block, searches for a nonce meeting the difficulty target, and reports
//! the values to hard-code into the node's chain parameters.

mod config;
mod report;
mod stats;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use genesis_core::difficulty::{bits_to_difficulty, expected_hashes, format_difficulty};
use genesis_core::{GenesisBlock, GenesisMiner, MineResult};

use crate::config::{unix_now, FileConfig, ParamArgs, SearchArgs, Settings};
use crate::report::GenesisReport;
use crate::stats::ProgressLogger;

#[derive(Parser)]
#[command(name = "genesis-miner", version)]
#[command(about = "Build and mine a proof-of-work genesis block", long_about = None)]
struct Cli {
    /// JSON config file; flags override its values
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Mine the genesis block and print its chain parameters
    Mine {
        #[command(flatten)]
        params: ParamArgs,

        #[command(flatten)]
        search: SearchArgs,

        /// Also write the report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the genesis template without mining
    Inspect {
        #[command(flatten)]
        params: ParamArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    match cli.command {
        Command::Mine {
            params,
            search,
            output,
        } => {
            let settings = Settings::resolve(file, &params, &search, unix_now())?;
            mine(settings, output)
        }
        Command::Inspect { params } => {
            let settings = Settings::resolve(file, &params, &SearchArgs::default(), unix_now())?;
            inspect(settings)
        }
    }
}

fn mine(settings: Settings, output: Option<PathBuf>) -> Result<()> {
    let Settings {
        network,
        params,
        miner,
    } = settings;

    let block = GenesisBlock::new(&params)?;
    log::info!(
        "mining {} genesis: time {}, bits 0x{:08x} (difficulty {}, ~{:.3e} hashes expected)",
        network,
        params.time,
        params.bits,
        format_difficulty(bits_to_difficulty(params.bits)?),
        expected_hashes(&block.target)
    );
    log::info!(
        "nonces {}..={} on {} worker(s), merkle root {}",
        miner.range.start(),
        miner.range.end(),
        miner.workers,
        block.header.merkle_root
    );

    let mut observer = ProgressLogger::new();
    let result = GenesisMiner::new(miner).mine(&params, &mut observer)?;

    let stats = observer.stats();
    log::info!(
        "{} hashes in {:.1}s ({}), {} progress report(s)",
        stats.total_hashes,
        stats.elapsed_ms / 1000.0,
        stats.format_hash_rate(),
        stats.ticks
    );

    match result {
        MineResult::Mined(mined) => {
            let report = GenesisReport::new(network, &params, &mined)?;
            println!("{}\n", report.summary());
            println!("{}", report.chainparams_snippet());

            if let Some(path) = output {
                report.write_json(&path)?;
                log::info!("report written to {}", path.display());
            }
            Ok(())
        }
        MineResult::Exhausted {
            attempts,
            last_time,
        } => bail!(
            "no nonce met the target after {attempts} hashes (last time {last_time}); \
             widen the nonce range, allow more time rolls or lower the difficulty"
        ),
    }
}

fn inspect(settings: Settings) -> Result<()> {
    let params = &settings.params;
    let block = GenesisBlock::new(params)?;

    println!("Network:         {}", settings.network);
    println!("Message:         {}", params.message()?);
    println!("Coinbase script: {}", block.coinbase.script.to_hex());
    println!("Coinbase tx:     {}", hex::encode(&block.coinbase.raw_tx));
    println!("Coinbase txid:   {}", block.coinbase.txid);
    println!("Merkle root:     {}", block.header.merkle_root);
    println!("Bits:            0x{:08x}", params.bits);
    println!("Target:          {}", block.target);
    println!(
        "Difficulty:      {}",
        format_difficulty(bits_to_difficulty(params.bits)?)
    );
    println!("Header template: {}", hex::encode(block.header.serialize()));
    Ok(())
}
