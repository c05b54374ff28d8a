//! Registry counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time registry statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Currently registered connections
    pub connected: usize,
    /// Successful engine opens
    pub opens: u64,
    /// Successful engine closes
    pub closes: u64,
    /// Engine opens that failed
    pub open_failures: u64,
    /// Engine closes that failed
    pub close_failures: u64,
    /// Connects answered with an already-registered handle
    pub reused: u64,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    pub(crate) opens: AtomicU64,
    pub(crate) closes: AtomicU64,
    pub(crate) open_failures: AtomicU64,
    pub(crate) close_failures: AtomicU64,
    pub(crate) reused: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, connected: usize) -> RegistryStats {
        RegistryStats {
            connected,
            opens: self.opens.load(Ordering::Relaxed),
            closes: self.closes.load(Ordering::Relaxed),
            open_failures: self.open_failures.load(Ordering::Relaxed),
            close_failures: self.close_failures.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
        }
    }
}
