//! Mining statistics and the logging progress observer.

use std::time::Duration;

use genesis_core::{SearchObserver, SearchOutcome, SearchProgress};

/// Mining statistics.
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total hashes computed.
    pub total_hashes: u64,
    /// Current hash rate (hashes per second).
    pub hash_rate: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
    /// Progress reports received.
    pub ticks: u64,
}

impl MiningStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update hash rate based on elapsed time.
    pub fn update_hash_rate(&mut self) {
        if self.elapsed_ms > 0.0 {
            self.hash_rate = (self.total_hashes as f64) / (self.elapsed_ms / 1000.0);
        }
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }

    fn record(&mut self, hashes: u64, elapsed: Duration) {
        self.total_hashes = hashes;
        self.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        self.update_hash_rate();
    }
}

/// Logs search progress through `log`.
///
/// Stats accumulate across searches, so a run that rolls the block time
/// reports its overall totals.
#[derive(Debug)]
pub struct ProgressLogger {
    stats: MiningStats,
    /// Hashes and time of searches that already finished.
    completed_hashes: u64,
    completed_elapsed: Duration,
}

impl ProgressLogger {
    pub fn new() -> Self {
        ProgressLogger {
            stats: MiningStats::new(),
            completed_hashes: 0,
            completed_elapsed: Duration::ZERO,
        }
    }

    /// Totals over every search observed so far.
    pub fn stats(&self) -> &MiningStats {
        &self.stats
    }
}

impl SearchObserver for ProgressLogger {
    fn on_progress(&mut self, progress: &SearchProgress) {
        self.stats.ticks += 1;
        self.stats.record(
            self.completed_hashes + progress.attempts,
            self.completed_elapsed + progress.elapsed,
        );

        let percent = progress.attempts as f64 * 100.0 / progress.range_len as f64;
        log::info!(
            "{} hashes ({:.2}% of range) at {}, {:.0}s elapsed",
            progress.attempts,
            percent,
            self.stats.format_hash_rate(),
            progress.elapsed.as_secs_f64()
        );
    }

    fn on_finish(&mut self, outcome: &SearchOutcome, elapsed: Duration) {
        self.completed_hashes += outcome.attempts();
        self.completed_elapsed += elapsed;
        self.stats.record(self.completed_hashes, self.completed_elapsed);

        match outcome {
            SearchOutcome::Found { nonce, hash, .. } => log::info!(
                "found nonce {} after {} hashes ({}): {}",
                nonce,
                outcome.attempts(),
                self.stats.format_hash_rate(),
                hash
            ),
            SearchOutcome::Exhausted { attempts } => {
                log::warn!("nonce range exhausted after {} hashes", attempts)
            }
        }
    }
}
