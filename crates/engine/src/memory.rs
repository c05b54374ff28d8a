//! In-process engine with no storage
//!
//! `MemoryEngine` hands out lightweight handles and records how many times
//! each identifier was opened and closed. Failures can be injected per
//! identifier, and an artificial open latency widens race windows so the
//! registry's single-open guarantee is actually exercised under contention.

use connreg_core::{ConnectionId, DatabaseEngine, EngineError};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Handle produced by [`MemoryEngine`]
#[derive(Debug)]
pub struct MemoryHandle {
    id: ConnectionId,
    serial: u64,
    uses: u64,
}

impl MemoryHandle {
    /// Filename the handle was opened for
    pub fn filename(&self) -> &str {
        self.id.filename()
    }

    /// Engine-wide open sequence number, unique per handle
    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Record one use of the handle and return the running total
    pub fn touch(&mut self) -> u64 {
        self.uses += 1;
        self.uses
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct IdCounters {
    opens: usize,
    closes: usize,
}

/// Instrumented engine without any backing storage
#[derive(Debug, Default)]
pub struct MemoryEngine {
    next_serial: AtomicU64,
    opens: AtomicUsize,
    closes: AtomicUsize,
    live: AtomicUsize,
    in_flight: AtomicUsize,
    per_id: Mutex<FxHashMap<ConnectionId, IdCounters>>,
    fail_open: Mutex<FxHashSet<ConnectionId>>,
    fail_close: Mutex<FxHashSet<ConnectionId>>,
    open_delay: Mutex<Option<Duration>>,
}

impl MemoryEngine {
    /// Create an engine with no faults and no latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every `open`
    pub fn with_open_delay(self, delay: Duration) -> Self {
        *self.open_delay.lock() = Some(delay);
        self
    }

    /// Make every subsequent `open` of `filename` fail
    pub fn fail_open(&self, filename: &str) {
        self.fail_open.lock().insert(ConnectionId::from_filename(filename));
    }

    /// Make every subsequent `close` of `filename` fail
    pub fn fail_close(&self, filename: &str) {
        self.fail_close.lock().insert(ConnectionId::from_filename(filename));
    }

    /// Remove all injected faults
    pub fn clear_faults(&self) {
        self.fail_open.lock().clear();
        self.fail_close.lock().clear();
    }

    /// Successful opens so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Successful closes so far
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Handles opened and not yet closed
    pub fn live_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Calls to `open` that have started and not yet returned
    pub fn opens_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Successful opens of `filename`
    pub fn opens_for(&self, filename: &str) -> usize {
        self.per_id.lock().get(filename).map_or(0, |c| c.opens)
    }

    /// Successful closes of `filename`
    pub fn closes_for(&self, filename: &str) -> usize {
        self.per_id.lock().get(filename).map_or(0, |c| c.closes)
    }

    fn open_inner(&self, id: &ConnectionId) -> Result<MemoryHandle, EngineError> {
        let delay = *self.open_delay.lock();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if self.fail_open.lock().contains(id) {
            return Err(EngineError::Injected(format!("open of '{}' refused", id)));
        }

        let serial = self.next_serial.fetch_add(1, Ordering::SeqCst) + 1;
        self.per_id.lock().entry(id.clone()).or_default().opens += 1;
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);

        Ok(MemoryHandle {
            id: id.clone(),
            serial,
            uses: 0,
        })
    }
}

impl DatabaseEngine for MemoryEngine {
    type Handle = MemoryHandle;

    fn open(&self, id: &ConnectionId) -> Result<MemoryHandle, EngineError> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = self.open_inner(id);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn close(&self, handle: MemoryHandle) -> Result<(), (MemoryHandle, EngineError)> {
        if self.fail_close.lock().contains(&handle.id) {
            let err = EngineError::Injected(format!("close of '{}' refused", handle.id));
            return Err((handle, err));
        }

        self.per_id.lock().entry(handle.id.clone()).or_default().closes += 1;
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
