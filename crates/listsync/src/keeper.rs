//! Temporary pinning of observable objects
//!
//! When the filter drops an add or replace command, that command may have been
//! the only strong reference to a freshly created object. The originating peer
//! resends a repaired command that references the same object id, so the
//! object is pinned here until the resend had a chance to arrive.

use crate::config::ReferenceKeeperConfig;
use crate::errors::Result;
use crate::registry::ObservableObject;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Keeps objects of dropped commands alive for a while
pub trait ReferenceKeeper: Send + Sync {
    /// Hold a strong reference to `object`
    fn keep_reference_to(&self, object: ObservableObject);

    /// Release references whose retention period ran out
    ///
    /// Called before every filter decision; must be cheap and idempotent.
    fn clean_reference_cache(&self);
}

/// Monotonic time source for pin expiry
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[allow(clippy::disallowed_methods)] // Clock implementation needs Instant::now
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Pin {
    pinned_at: Instant,
    object: ObservableObject,
}

/// Reference keeper with a time-to-live and a capacity bound
///
/// Pins are kept in insertion order. Since the TTL is fixed and the clock is
/// monotonic, the oldest pin always expires first.
pub struct TemporaryReferenceKeeper {
    pins: Mutex<VecDeque<Pin>>,
    ttl: Duration,
    max_pinned: usize,
    clock: Arc<dyn Clock>,
}

impl TemporaryReferenceKeeper {
    /// Create a keeper using the wall clock
    pub fn new(config: &ReferenceKeeperConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a keeper using an injected clock
    ///
    /// Fails with [`InvalidConfig`](crate::ListSyncError::InvalidConfig) for a
    /// zero TTL or zero capacity.
    pub fn with_clock(config: &ReferenceKeeperConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            pins: Mutex::new(VecDeque::new()),
            ttl: config.pin_ttl(),
            max_pinned: config.max_pinned,
            clock,
        })
    }

    /// Number of currently pinned references
    pub fn pinned_count(&self) -> usize {
        self.pins.lock().len()
    }

    /// Whether `object` is currently pinned
    pub fn is_pinned(&self, object: &ObservableObject) -> bool {
        self.pins
            .lock()
            .iter()
            .any(|pin| Arc::ptr_eq(&pin.object, object))
    }
}

impl ReferenceKeeper for TemporaryReferenceKeeper {
    fn keep_reference_to(&self, object: ObservableObject) {
        let mut pins = self.pins.lock();
        pins.push_back(Pin {
            pinned_at: self.clock.now(),
            object,
        });
        while pins.len() > self.max_pinned {
            pins.pop_front();
            tracing::trace!(max_pinned = self.max_pinned, "Evicted oldest pin over capacity");
        }
    }

    fn clean_reference_cache(&self) {
        let now = self.clock.now();
        let mut pins = self.pins.lock();
        let before = pins.len();
        while let Some(oldest) = pins.front() {
            if now.saturating_duration_since(oldest.pinned_at) < self.ttl {
                break;
            }
            pins.pop_front();
        }
        let evicted = before - pins.len();
        if evicted > 0 {
            tracing::trace!(evicted, remaining = pins.len(), "Released expired pins");
        }
    }
}

impl std::fmt::Debug for TemporaryReferenceKeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryReferenceKeeper")
            .field("pinned", &self.pinned_count())
            .field("ttl", &self.ttl)
            .field("max_pinned", &self.max_pinned)
            .finish()
    }
}
