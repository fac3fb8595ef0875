//! Sources of fresh version tokens
//!
//! Repair mints a new `to` version for every rewritten command. The source is
//! injected so that tests can produce deterministic tokens.

use crate::identifiers::VersionToken;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Produces version tokens that were never handed out before
pub trait VersionTokenSource: Send + Sync {
    /// Mint a fresh token
    fn next_version(&self) -> VersionToken;
}

/// Random v4 UUID tokens, the production source
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomVersionTokens;

impl VersionTokenSource for RandomVersionTokens {
    #[allow(clippy::disallowed_methods)] // Token source implementation needs Uuid::new_v4
    fn next_version(&self) -> VersionToken {
        VersionToken::from_uuid(Uuid::new_v4())
    }
}

/// Deterministic tokens counting up from a seed
///
/// Tokens from two sources only stay distinct if their ranges do not overlap,
/// so give each simulated peer its own seed.
#[derive(Debug)]
pub struct SequentialVersionTokens {
    next: AtomicU64,
    namespace: u64,
}

impl SequentialVersionTokens {
    /// Create a source whose tokens live in `namespace`
    pub fn new(namespace: u64) -> Self {
        Self {
            next: AtomicU64::new(1),
            namespace,
        }
    }
}

impl VersionTokenSource for SequentialVersionTokens {
    fn next_version(&self) -> VersionToken {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        VersionToken::from_uuid(Uuid::from_u64_pair(self.namespace, n))
    }
}

impl<T: VersionTokenSource + ?Sized> VersionTokenSource for std::sync::Arc<T> {
    fn next_version(&self) -> VersionToken {
        (**self).next_version()
    }
}
