//! Configuration: optional JSON file merged with command-line flags.

use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Args;
use genesis_core::search::{DEFAULT_PROGRESS_INTERVAL, MAX_WORKERS};
use genesis_core::{parse_bits, GenesisError, GenesisParameters, MinerConfig, Network, NonceRange};
use serde::Deserialize;

/// Contents of a `--config` file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub network: Option<Network>,
    pub timestamp_message: Option<String>,
    pub time: Option<u32>,
    /// Compact bits as hex text, e.g. "0x1d00ffff".
    pub bits: Option<String>,
    pub reward: Option<u64>,
    /// Hex-encoded public key.
    pub public_key: Option<String>,
    pub version: Option<i32>,
    pub search: SearchSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
    pub start_nonce: Option<u32>,
    pub end_nonce: Option<u32>,
    pub workers: Option<usize>,
    pub progress_interval_ms: Option<u64>,
    pub max_time_rolls: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Genesis parameter flags shared by every command.
#[derive(Debug, Default, Args)]
pub struct ParamArgs {
    /// Network preset supplying the default difficulty
    #[arg(short, long)]
    pub network: Option<Network>,

    /// Timestamp message embedded in the coinbase
    #[arg(short, long)]
    pub message: Option<String>,

    /// Block time in seconds since the epoch (default: now)
    #[arg(short, long)]
    pub time: Option<u32>,

    /// Compact difficulty bits, hex (overrides the network preset)
    #[arg(short, long, value_parser = parse_bits_arg)]
    pub bits: Option<u32>,

    /// Coinbase reward in smallest units
    #[arg(long)]
    pub reward: Option<u64>,

    /// Hex-encoded coinbase public key (33 or 65 bytes)
    #[arg(long)]
    pub public_key: Option<String>,

    /// Block and transaction version
    #[arg(long)]
    pub version: Option<i32>,
}

/// Nonce search flags.
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// First nonce to try
    #[arg(long)]
    pub start_nonce: Option<u32>,

    /// Last nonce to try (inclusive)
    #[arg(long)]
    pub end_nonce: Option<u32>,

    /// Worker threads (default: available parallelism)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Milliseconds between progress reports (at least 100)
    #[arg(long)]
    pub progress_interval_ms: Option<u64>,

    /// Times the block time may be advanced after an exhausted range
    #[arg(long)]
    pub max_time_rolls: Option<u32>,
}

fn parse_bits_arg(s: &str) -> Result<u32, String> {
    parse_bits(s).map_err(|e| e.to_string())
}

/// Fully resolved settings for one run.
#[derive(Debug)]
pub struct Settings {
    pub network: Network,
    pub params: GenesisParameters,
    pub miner: MinerConfig,
}

impl Settings {
    /// Merge flags over file values over defaults. `now` fills a missing time.
    pub fn resolve(
        file: FileConfig,
        params: &ParamArgs,
        search: &SearchArgs,
        now: u32,
    ) -> Result<Self> {
        let network = params.network.or(file.network).unwrap_or_default();

        let bits = match (params.bits, file.bits.as_deref()) {
            (Some(bits), _) => bits,
            (None, Some(text)) => parse_bits(text).context("config field `bits`")?,
            (None, None) => network.genesis_bits(),
        };

        let mut genesis = GenesisParameters::for_network(network)
            .with_bits(bits)
            .with_time(params.time.or(file.time).unwrap_or(now));

        if let Some(message) = params.message.clone().or(file.timestamp_message) {
            genesis.timestamp_message = message.into_bytes();
        }
        if let Some(reward) = params.reward.or(file.reward) {
            genesis.reward = reward;
        }
        if let Some(key) = params.public_key.as_deref().or(file.public_key.as_deref()) {
            genesis.public_key = hex::decode(key.trim())
                .with_context(|| format!("public key is not hex: {key}"))?;
        }
        if let Some(version) = params.version.or(file.version) {
            genesis.version = version;
        }
        genesis.validate_public_key()?;

        let section = file.search;
        let start = search.start_nonce.or(section.start_nonce).unwrap_or(0);
        let end = search.end_nonce.or(section.end_nonce).unwrap_or(u32::MAX);
        let workers = search
            .workers
            .or(section.workers)
            .unwrap_or_else(default_workers);
        if !(1..=MAX_WORKERS).contains(&workers) {
            return Err(GenesisError::InvalidWorkerCount {
                workers,
                max: MAX_WORKERS,
            }
            .into());
        }
        let progress_interval = search
            .progress_interval_ms
            .or(section.progress_interval_ms)
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_PROGRESS_INTERVAL);

        let miner = MinerConfig {
            range: NonceRange::new(start, end)?,
            workers,
            progress_interval,
            max_time_rolls: search
                .max_time_rolls
                .or(section.max_time_rolls)
                .unwrap_or(0),
        };

        Ok(Settings {
            network,
            params: genesis,
            miner,
        })
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(MAX_WORKERS))
        .unwrap_or(1)
}

/// Current Unix time, clamped into the header's 32-bit field.
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().min(u32::MAX as u64) as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u32 = 1_735_689_600;

    fn resolve_search(search: SearchArgs) -> Result<Settings> {
        Settings::resolve(FileConfig::default(), &ParamArgs::default(), &search, NOW)
    }

    #[test]
    fn test_defaults() {
        let settings = resolve_search(SearchArgs::default()).unwrap();

        assert_eq!(settings.network, Network::Mainnet);
        assert_eq!(settings.params.bits, 0x1d00ffff);
        assert_eq!(settings.params.time, NOW);
        assert_eq!(settings.params, GenesisParameters::default().with_time(NOW));
        assert_eq!(settings.miner.range, NonceRange::full());
        assert!(settings.miner.workers >= 1);
        assert_eq!(settings.miner.max_time_rolls, 0);
    }

    #[test]
    fn test_file_values() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "network": "regtest",
                "timestamp_message": "Hello genesis",
                "time": 1700000000,
                "reward": 1000,
                "search": { "start_nonce": 5, "end_nonce": 500, "workers": 3, "max_time_rolls": 4 }
            }"#,
        )
        .unwrap();

        let settings = Settings::resolve(file, &ParamArgs::default(), &SearchArgs::default(), NOW)
            .unwrap();
        assert_eq!(settings.network, Network::Regtest);
        assert_eq!(settings.params.bits, 0x207fffff);
        assert_eq!(settings.params.timestamp_message, b"Hello genesis".to_vec());
        assert_eq!(settings.params.time, 1_700_000_000);
        assert_eq!(settings.params.reward, 1000);
        assert_eq!(settings.miner.range, NonceRange::new(5, 500).unwrap());
        assert_eq!(settings.miner.workers, 3);
        assert_eq!(settings.miner.max_time_rolls, 4);
    }

    #[test]
    fn test_flags_override_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{ "bits": "0x1e0ffff0", "time": 1, "search": { "workers": 8 } }"#,
        )
        .unwrap();
        let params = ParamArgs {
            bits: Some(0x1f00ffff),
            time: Some(2),
            ..ParamArgs::default()
        };
        let search = SearchArgs {
            workers: Some(2),
            ..SearchArgs::default()
        };

        let settings = Settings::resolve(file, &params, &search, NOW).unwrap();
        assert_eq!(settings.params.bits, 0x1f00ffff);
        assert_eq!(settings.params.time, 2);
        assert_eq!(settings.miner.workers, 2);
    }

    #[test]
    fn test_rejects_bad_values() {
        let file: FileConfig = serde_json::from_str(r#"{ "public_key": "0203" }"#).unwrap();
        let err = Settings::resolve(file, &ParamArgs::default(), &SearchArgs::default(), NOW)
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<GenesisError>(),
            Some(&GenesisError::InvalidPublicKey { len: 2 })
        );

        let search = SearchArgs {
            start_nonce: Some(10),
            end_nonce: Some(1),
            ..SearchArgs::default()
        };
        assert!(resolve_search(search).is_err());

        assert!(serde_json::from_str::<FileConfig>(r#"{ "difficulty": 1 }"#).is_err());
    }

    #[test]
    fn test_worker_count_limits() {
        for workers in [0, MAX_WORKERS + 1, 1_000_000_000] {
            let search = SearchArgs {
                workers: Some(workers),
                ..SearchArgs::default()
            };
            let err = resolve_search(search).unwrap_err();
            assert_eq!(
                err.downcast_ref::<GenesisError>(),
                Some(&GenesisError::InvalidWorkerCount {
                    workers,
                    max: MAX_WORKERS
                })
            );
        }

        let search = SearchArgs {
            workers: Some(MAX_WORKERS),
            ..SearchArgs::default()
        };
        assert_eq!(resolve_search(search).unwrap().miner.workers, MAX_WORKERS);
        assert!(default_workers() <= MAX_WORKERS);
    }

    #[test]
    fn test_parse_bits_arg() {
        assert_eq!(parse_bits_arg("0x207fffff"), Ok(0x207fffff));
        assert!(parse_bits_arg("xyz").is_err());
    }
}
