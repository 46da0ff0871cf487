//! Proof-of-work nonce search.
//!
//! The nonce range is split into contiguous sub-ranges, one per worker
//! thread. Workers share only a found flag and an attempt counter; each
//! returns its own first winning nonce, and the smallest of those wins.
//! Progress is reported to a [`SearchObserver`] from the calling thread,
//! never from inside the hashing loop.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::block::BlockHeader;
use crate::difficulty::Target;
use crate::error::{GenesisError, Result};
use crate::hash::{double_sha256, Hash256};

/// Nonces a worker hashes between checks of the found flag.
pub const POLL_INTERVAL: u64 = 4096;

/// Default time between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest time between progress reports.
pub const MIN_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// Most worker threads one search spawns.
pub const MAX_WORKERS: usize = 256;

/// Longest the caller sleeps between checks when no report is due.
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// An inclusive range of nonces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRange {
    start: u32,
    end: u32,
}

impl NonceRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(GenesisError::InvalidNonceRange { start, end });
        }
        Ok(NonceRange { start, end })
    }

    /// Every possible nonce.
    pub const fn full() -> Self {
        NonceRange {
            start: 0,
            end: u32::MAX,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of nonces in the range, never zero.
    pub fn len(&self) -> u64 {
        self.end as u64 - self.start as u64 + 1
    }

    pub fn contains(&self, nonce: u32) -> bool {
        (self.start..=self.end).contains(&nonce)
    }

    /// Split into at most `parts` disjoint contiguous ranges in ascending
    /// order. Earlier ranges take the remainder.
    pub fn split(&self, parts: usize) -> Vec<NonceRange> {
        let parts = (parts.max(1) as u64).min(self.len());
        let chunk = self.len() / parts;
        let remainder = self.len() % parts;

        let mut ranges = Vec::with_capacity(parts as usize);
        let mut start = self.start as u64;
        for i in 0..parts {
            let size = chunk + u64::from(i < remainder);
            let end = start + size - 1;
            ranges.push(NonceRange {
                start: start as u32,
                end: end as u32,
            });
            start = end + 1;
        }
        ranges
    }
}

impl Default for NonceRange {
    fn default() -> Self {
        NonceRange::full()
    }
}

/// Result of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// `nonce` is the winning nonce and `hash` the header hash with it.
    Found {
        nonce: u32,
        hash: Hash256,
        attempts: u64,
    },
    /// No nonce in the range met the target.
    Exhausted { attempts: u64 },
}

impl SearchOutcome {
    /// Number of hashes evaluated.
    pub fn attempts(&self) -> u64 {
        match self {
            SearchOutcome::Found { attempts, .. } | SearchOutcome::Exhausted { attempts } => {
                *attempts
            }
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found { .. })
    }
}

/// Snapshot handed to the observer on every progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    /// Hashes evaluated so far, updated by workers every [`POLL_INTERVAL`].
    pub attempts: u64,
    /// Size of the range being searched.
    pub range_len: u64,
    pub elapsed: Duration,
}

impl SearchProgress {
    /// Hashes per second so far.
    pub fn hash_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

/// Receives progress ticks and the final outcome of a search.
///
/// Called only from the thread that invoked [`Searcher::search`].
pub trait SearchObserver {
    fn on_progress(&mut self, _progress: &SearchProgress) {}

    /// Called exactly once per search.
    fn on_finish(&mut self, _outcome: &SearchOutcome, _elapsed: Duration) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// State shared by the workers of one search.
#[derive(Default)]
struct SharedState {
    found: AtomicBool,
    attempts: AtomicU64,
    finished: AtomicUsize,
}

/// Searches nonce ranges for a header hash below a target.
#[derive(Debug, Clone)]
pub struct Searcher {
    target: Target,
    workers: usize,
    progress_interval: Duration,
}

impl Searcher {
    /// A single-worker searcher.
    pub fn new(target: Target) -> Self {
        Searcher {
            target,
            workers: 1,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Clamped to `1..=MAX_WORKERS`.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Raised to at least [`MIN_PROGRESS_INTERVAL`].
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval.max(MIN_PROGRESS_INTERVAL);
        self
    }

    /// Search `range` for the first nonce whose header hash is below the
    /// target. Only the nonce of `template` is varied.
    pub fn search(
        &self,
        template: &BlockHeader,
        range: NonceRange,
        observer: &mut dyn SearchObserver,
    ) -> SearchOutcome {
        let prefix = template.serialize_without_nonce();
        let chunks = range.split(self.workers);
        let shared = SharedState::default();
        let started = Instant::now();

        log::debug!(
            "searching nonces {}..={} with {} worker(s), target {}",
            range.start,
            range.end,
            chunks.len(),
            self.target
        );

        let (prefix, shared, target) = (&prefix, &shared, &self.target);
        let winners: Vec<Option<(u32, Hash256)>> = thread::scope(|scope| {
            let caller = thread::current();
            let handles: Vec<_> = chunks
                .iter()
                .map(|&chunk| {
                    let caller = caller.clone();
                    scope.spawn(move || {
                        let winner = search_chunk(prefix, target, chunk, shared);
                        shared.finished.fetch_add(1, Ordering::Release);
                        caller.unpark();
                        winner
                    })
                })
                .collect();

            // `None` when the interval is too large to ever elapse.
            let mut next_report = started.checked_add(self.progress_interval);
            // A panicking worker never counts itself finished, but its
            // handle does.
            let running = || {
                shared.finished.load(Ordering::Acquire) < handles.len()
                    && !handles.iter().all(|handle| handle.is_finished())
            };
            while running() {
                let now = Instant::now();
                match next_report {
                    Some(due) if now >= due => {
                        observer.on_progress(&SearchProgress {
                            attempts: shared.attempts.load(Ordering::Relaxed),
                            range_len: range.len(),
                            elapsed: started.elapsed(),
                        });
                        next_report = now.checked_add(self.progress_interval);
                    }
                    Some(due) => thread::park_timeout((due - now).min(IDLE_WAIT)),
                    None => thread::park_timeout(IDLE_WAIT),
                }
            }

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|e| std::panic::resume_unwind(e))
                })
                .collect()
        });

        let attempts = shared.attempts.load(Ordering::Relaxed);
        let winner = winners.into_iter().flatten().min_by_key(|(nonce, _)| *nonce);
        let outcome = match winner {
            Some((nonce, hash)) => SearchOutcome::Found {
                nonce,
                hash,
                attempts,
            },
            None => SearchOutcome::Exhausted { attempts },
        };

        let elapsed = started.elapsed();
        log::debug!("search finished after {:?}: {:?}", elapsed, outcome);
        observer.on_finish(&outcome, elapsed);
        outcome
    }
}

/// Hash every nonce of `range` in ascending order until one meets `target`
/// or another worker reports a win.
fn search_chunk(
    prefix: &[u8; 76],
    target: &Target,
    range: NonceRange,
    shared: &SharedState,
) -> Option<(u32, Hash256)> {
    // Pre-allocate the full 80-byte header
    let mut header = [0u8; 80];
    header[..76].copy_from_slice(prefix);

    let mut pending = 0u64;
    let mut nonce = range.start;
    loop {
        // Set the nonce (little-endian at bytes 76-79)
        header[76..80].copy_from_slice(&nonce.to_le_bytes());
        let hash = Hash256::new(double_sha256(&header));
        pending += 1;

        if target.is_met_by(&hash) {
            shared.attempts.fetch_add(pending, Ordering::Relaxed);
            shared.found.store(true, Ordering::Release);
            return Some((nonce, hash));
        }

        if nonce == range.end {
            break;
        }
        nonce += 1;

        if pending == POLL_INTERVAL {
            shared.attempts.fetch_add(pending, Ordering::Relaxed);
            pending = 0;
            if shared.found.load(Ordering::Acquire) {
                return None;
            }
        }
    }

    shared.attempts.fetch_add(pending, Ordering::Relaxed);
    None
}
