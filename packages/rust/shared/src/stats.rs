//! Run-wide counters shared between the scrape loop and download tasks.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Atomic counters for a single build run.
///
/// Download completions race with ongoing surah scans, so every counter is
/// independently atomic. One instance is created per run and shared behind
/// an `Arc`; there is no global state.
#[derive(Debug, Default)]
pub struct RunStats {
    discovered: AtomicU64,
    downloaded: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A verse row passed every scan precondition and was emitted.
    pub fn add_discovered(&self) {
        self.discovered.fetch_add(1, Ordering::Relaxed);
    }

    /// An audio asset was fetched and written.
    pub fn add_downloaded(&self) {
        self.downloaded.fetch_add(1, Ordering::Relaxed);
    }

    /// An audio asset already existed on disk.
    pub fn add_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// An audio asset failed all retry attempts.
    pub fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy for reporting.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            discovered: self.discovered.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of [`RunStats`] at one moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub discovered: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = RunStats::new();
        stats.add_discovered();
        stats.add_discovered();
        stats.add_downloaded();
        stats.add_skipped();

        let snap = stats.snapshot();
        assert_eq!(snap.discovered, 2);
        assert_eq!(snap.downloaded, 1);
        assert_eq!(snap.skipped, 1);
        assert_eq!(snap.failed, 0);
    }

    #[test]
    fn concurrent_increments_are_lossless() {
        use std::sync::Arc;

        let stats = Arc::new(RunStats::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let stats = stats.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.add_downloaded();
                }
            }));
        }
        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(stats.snapshot().downloaded, 8000);
    }
}
