//! listsync prelude.
//!
//! Curated re-exports for embedding the list replication core.

pub use crate::{
    CommandFilter, CommandRepairer, FilterDecision, ListCommand, ListCommandExecutor, ListId,
    ListSyncConfig, ListSyncError, ListVersionStore, ObjectRegistry, ReferenceKeeper,
    ReplaceOrAddInList, SharedListVersionStore, TemporaryReferenceKeeper, Value, VersionChange,
    VersionReference, VersionToken, VersionTokenSource, WeakObjectRegistry,
};
