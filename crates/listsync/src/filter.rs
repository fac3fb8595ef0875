//! Filtering of commands computed against a stale list version
//!
//! Each state of a list is identified by a version token. A command carries the
//! version it was computed against. If that is not the version the list is in,
//! other changes happened in between and it is impossible to tell whether the
//! command still applies, so it is dropped.
//!
//! The sending peer notices the drop and resends a repaired command. That
//! resend only contains the list command, not whatever created the observable
//! object it references, so the object is pinned in the [`ReferenceKeeper`]
//! until the resend arrives.

use crate::commands::ListCommand;
use crate::config::{FilterConfig, VersionReference};
use crate::errors::Result;
use crate::executor::ListCommandExecutor;
use crate::keeper::ReferenceKeeper;
use crate::registry::ObjectRegistry;
use crate::store::SharedListVersionStore;
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of passing a command through the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Forwarded to the downstream executor
    Accepted,
    /// Discarded because it targets another version
    Dropped,
}

/// Forwards commands whose `from` version matches the list's reference version
pub struct CommandFilter<E> {
    executor: E,
    reference_keeper: Arc<dyn ReferenceKeeper>,
    list_versions: SharedListVersionStore,
    object_registry: Arc<dyn ObjectRegistry>,
    reference: VersionReference,
}

impl<E: ListCommandExecutor> CommandFilter<E> {
    /// Create a filter in front of `executor`
    ///
    /// `reference` selects the version commands are checked against:
    /// [`VersionReference::Local`] for remote commands checked against this
    /// peer's optimistic state, [`VersionReference::Approved`] for checks
    /// against the last mutually approved state.
    pub fn new(
        executor: E,
        reference_keeper: Arc<dyn ReferenceKeeper>,
        list_versions: SharedListVersionStore,
        object_registry: Arc<dyn ObjectRegistry>,
        reference: VersionReference,
    ) -> Self {
        Self {
            executor,
            reference_keeper,
            list_versions,
            object_registry,
            reference,
        }
    }

    /// Create a filter whose mode comes from configuration
    pub fn from_config(
        config: &FilterConfig,
        executor: E,
        reference_keeper: Arc<dyn ReferenceKeeper>,
        list_versions: SharedListVersionStore,
        object_registry: Arc<dyn ObjectRegistry>,
    ) -> Self {
        Self::new(
            executor,
            reference_keeper,
            list_versions,
            object_registry,
            config.reference,
        )
    }

    /// Version this filter compares against
    pub fn reference(&self) -> VersionReference {
        self.reference
    }

    /// Downstream executor
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Downstream executor, mutably
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Whether `command` starts from the list's reference version
    ///
    /// Fails with [`UnknownList`](crate::ListSyncError::UnknownList) if the list
    /// was never registered.
    pub fn could_be_executed(&self, command: &ListCommand) -> Result<bool> {
        let list_versions = self.list_versions.read();
        let meta = list_versions.get_or_fail(command.list_id())?;
        let list_version = match self.reference {
            VersionReference::Local => meta.local_version(),
            VersionReference::Approved => meta.approved_version(),
        };
        Ok(command.version_change().from == list_version)
    }

    /// Forward `command` if it is still valid, otherwise drop it
    ///
    /// Dropped adds and replaces pin the observable object they reference.
    #[instrument(
        level = "debug",
        skip(self, command),
        fields(list_id = %command.list_id(), kind = command.kind(), from = %command.version_change().from)
    )]
    pub fn execute(&mut self, command: ListCommand) -> Result<FilterDecision> {
        self.reference_keeper.clean_reference_cache();

        if self.could_be_executed(&command)? {
            self.executor.execute(command)?;
            return Ok(FilterDecision::Accepted);
        }

        if let Some(value) = command.value() {
            self.keep_reference_if_observable(value)?;
        }
        debug!(reference = ?self.reference, "Dropped command for another list version");
        Ok(FilterDecision::Dropped)
    }

    fn keep_reference_if_observable(&self, value: &Value) -> Result<()> {
        let Some(object_id) = value.observable_object_id() else {
            return Ok(());
        };
        let object = self.object_registry.get_by_id_or_fail(&object_id)?;
        self.reference_keeper.keep_reference_to(object);
        debug!(object_id = %object_id, "Pinned object of dropped command");
        Ok(())
    }
}

impl<E: ListCommandExecutor> ListCommandExecutor for CommandFilter<E> {
    fn execute(&mut self, command: ListCommand) -> Result<()> {
        CommandFilter::execute(self, command).map(|_| ())
    }
}
