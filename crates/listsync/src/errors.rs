//! Error types for list synchronization
//!
//! Every variant describes a protocol or invariant violation. None of them are
//! retried inside this crate. A version mismatch seen by the command filter is
//! not an error: it is reported as [`FilterDecision::Dropped`](crate::FilterDecision).

use crate::identifiers::{ListId, ObjectId, VersionToken};
use thiserror::Error;

/// List synchronization error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListSyncError {
    /// No metadata is registered for the list
    #[error("Unknown list: {0}")]
    UnknownList(ListId),

    /// Metadata for the list was already registered
    #[error("Metadata for list {0} already exists")]
    DuplicateList(ListId),

    /// An observable reference points to an object the registry does not know
    #[error("Unknown observable object: {0}")]
    UnknownObject(ObjectId),

    /// A different live object is already registered under this id
    #[error("Observable object {0} is already registered")]
    DuplicateObject(ObjectId),

    /// Both sides replaced the same slot; a policy above this crate must pick a winner
    #[error("Concurrent replace of index {index} in list {list_id} cannot be resolved by index")]
    UnresolvedConflict {
        /// List both commands target
        list_id: ListId,
        /// Slot both commands replace
        index: usize,
    },

    /// A command or version change does not start at the expected version
    #[error("Version mismatch on list {list_id}: expected {expected}, got {actual}")]
    VersionMismatch {
        /// List the mismatch was detected on
        list_id: ListId,
        /// Version the operation required
        expected: VersionToken,
        /// Version that was supplied
        actual: VersionToken,
    },

    /// Two commands that must target the same list do not
    #[error("Commands target different lists: {subject} and {other}")]
    ListMismatch {
        /// List of the command being repaired or recorded
        subject: ListId,
        /// List of the command it was paired with
        other: ListId,
    },

    /// A remote command was applied on the approved version while local commands are queued
    #[error("List {list_id} has {pending} unapproved local commands that must be rebased first")]
    PendingLocalCommands {
        /// Affected list
        list_id: ListId,
        /// Number of queued local commands
        pending: usize,
    },

    /// A sequence of commands does not form a contiguous version chain
    #[error("Broken version chain on list {list_id} at position {position}")]
    BrokenVersionChain {
        /// Affected list
        list_id: ListId,
        /// Index of the first command that does not continue the chain
        position: usize,
    },

    /// Configuration could not be parsed or failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ListSyncError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ListSyncError::UnknownList(_) => "unknown_list",
            ListSyncError::DuplicateList(_) => "duplicate_list",
            ListSyncError::UnknownObject(_) => "unknown_object",
            ListSyncError::DuplicateObject(_) => "duplicate_object",
            ListSyncError::UnresolvedConflict { .. } => "unresolved_conflict",
            ListSyncError::VersionMismatch { .. } => "version_mismatch",
            ListSyncError::ListMismatch { .. } => "list_mismatch",
            ListSyncError::PendingLocalCommands { .. } => "pending_local_commands",
            ListSyncError::BrokenVersionChain { .. } => "broken_version_chain",
            ListSyncError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Result type for list synchronization operations
pub type Result<T> = std::result::Result<T, ListSyncError>;

impl From<toml::de::Error> for ListSyncError {
    fn from(err: toml::de::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
