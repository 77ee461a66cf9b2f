//! Clock Abstraction Module
//!
//! All expiry decisions in the engine go through the [`Clock`] trait so that
//! TTL behavior can be tested deterministically with a manual clock instead
//! of real sleeps.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Clock Trait ==
/// Source of the engine's notion of "now", in milliseconds.
///
/// The engine only ever compares and adds these values, so any monotonically
/// non-decreasing millisecond counter is a valid implementation.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

// == System Clock ==
/// Default clock backed by the system wall clock (Unix milliseconds).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }
}

// == Manual Clock ==
/// A clock that only moves when told to. Intended for tests.
///
/// Clones share the same underlying counter, so a test can keep one handle
/// and advance time while the cache holds another.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a manual clock starting at the given millisecond value.
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Moves the clock forward by `delta_ms` milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute millisecond value.
    pub fn set(&self, now_ms: u64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
