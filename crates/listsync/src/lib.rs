#![deny(clippy::dbg_macro)]
#![deny(clippy::todo)]
//! # listsync - Optimistic List Replication Core
//!
//! Keeps list properties of a replicated object graph consistent between peers
//! that mutate their local copies before anyone acknowledged the change.
//!
//! - **Version store**: per-list local and approved version plus the queue of
//!   unacknowledged local commands
//! - **Command filter**: forwards commands computed against the current list
//!   version and drops the rest, pinning objects they reference
//! - **Command repairer**: rebases replace commands over commands that were
//!   applied ahead of them
//!
//! ## Design Principles
//!
//! - **Version Chains**: every command names the version it starts from and
//!   the one it produces; tokens are compared for equality only
//! - **Fail Fast**: unknown lists, duplicate registrations and unknown objects
//!   are protocol violations and surface as errors
//! - **No Guessing**: concurrent replaces of the same slot are reported, not
//!   resolved
//! - **Injected Effects**: clocks, version tokens, object lookup and pinning
//!   are traits supplied by the embedding system

pub mod commands;
pub mod config;
pub mod errors;
pub mod executor;
pub mod filter;
pub mod identifiers;
pub mod keeper;
pub mod prelude;
pub mod registry;
pub mod repair;
pub mod store;
pub mod value;
pub mod versions;

pub use commands::{
    AddToList, ListCommand, RemoveFromList, RemoveFromListExcept, ReplaceInList,
    ReplaceOrAddInList, VersionChange,
};
pub use config::{FilterConfig, ListSyncConfig, ReferenceKeeperConfig, VersionReference};
pub use errors::{ListSyncError, Result};
pub use executor::ListCommandExecutor;
pub use filter::{CommandFilter, FilterDecision};
pub use identifiers::{ListId, ObjectId, VersionToken};
pub use keeper::{Clock, ReferenceKeeper, SystemClock, TemporaryReferenceKeeper};
pub use registry::{ObjectRegistry, ObservableObject, WeakObjectRegistry};
pub use repair::CommandRepairer;
pub use store::{ListMetaData, ListVersionStore, SharedListVersionStore};
pub use value::Value;
pub use versions::{RandomVersionTokens, SequentialVersionTokens, VersionTokenSource};
