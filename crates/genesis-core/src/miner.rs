//! Genesis mining: build the template, search, roll the time on exhaustion.

use std::time::Duration;

use crate::block::GenesisBlock;
use crate::error::Result;
use crate::hash::Hash256;
use crate::params::GenesisParameters;
use crate::search::{NonceRange, SearchObserver, SearchOutcome, Searcher, DEFAULT_PROGRESS_INTERVAL};

/// Settings for one mining run.
#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub range: NonceRange,
    pub workers: usize,
    pub progress_interval: Duration,
    /// How many times the header time may be advanced after an exhausted range.
    pub max_time_rolls: u32,
}

impl Default for MinerConfig {
    fn default() -> Self {
        MinerConfig {
            range: NonceRange::full(),
            workers: 1,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            max_time_rolls: 0,
        }
    }
}

/// A genesis block with a verified winning nonce.
#[derive(Debug, Clone)]
pub struct MinedGenesis {
    /// The block, its header carrying the winning nonce.
    pub block: GenesisBlock,
    pub hash: Hash256,
    /// Hashes evaluated across every attempt.
    pub attempts: u64,
    /// Seconds the header time was advanced from the configured time.
    pub time_rolls: u32,
}

/// Outcome of [`GenesisMiner::mine`].
#[derive(Debug, Clone)]
pub enum MineResult {
    Mined(MinedGenesis),
    /// Every allowed time was searched without success.
    Exhausted {
        attempts: u64,
        /// Header time of the final attempt.
        last_time: u32,
    },
}

/// Drives [`Searcher`] over a genesis template.
pub struct GenesisMiner {
    config: MinerConfig,
}

impl GenesisMiner {
    pub fn new(config: MinerConfig) -> Self {
        GenesisMiner { config }
    }

    /// Build the genesis block for `params` and search for its nonce.
    pub fn mine(
        &self,
        params: &GenesisParameters,
        observer: &mut dyn SearchObserver,
    ) -> Result<MineResult> {
        let mut block = GenesisBlock::new(params)?;
        let searcher = Searcher::new(block.target)
            .with_workers(self.config.workers)
            .with_progress_interval(self.config.progress_interval);

        let mut attempts = 0u64;
        let mut time_rolls = 0u32;
        loop {
            match searcher.search(&block.header, self.config.range, observer) {
                SearchOutcome::Found {
                    nonce,
                    hash,
                    attempts: tried,
                } => {
                    block.header.nonce = nonce;
                    return Ok(MineResult::Mined(MinedGenesis {
                        block,
                        hash,
                        attempts: attempts + tried,
                        time_rolls,
                    }));
                }
                SearchOutcome::Exhausted { attempts: tried } => {
                    attempts += tried;
                    if time_rolls == self.config.max_time_rolls {
                        return Ok(MineResult::Exhausted {
                            attempts,
                            last_time: block.header.time,
                        });
                    }
                    time_rolls += 1;
                    block.roll_time();
                    log::info!(
                        "nonce range exhausted, retrying with time {}",
                        block.header.time
                    );
                }
            }
        }
    }
}
