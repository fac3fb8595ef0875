//! Per-list version bookkeeping
//!
//! Every synchronized list has one [`ListMetaData`] entry keyed by its
//! [`ListId`]. The entry tracks two versions:
//!
//! - **approved**: the `from` version of the oldest local command no peer has
//!   acknowledged yet, or the `to` version of the newest applied remote command
//!   when nothing is pending.
//! - **local**: the `to` version of the newest queued local command, or the
//!   approved version when nothing is pending.
//!
//! The queued commands always form a version chain from approved to local.
//!
//! Entries are created explicitly exactly once. Reads never create entries.
//! Removal happens through [`ListVersionStore::forget`], called by whoever
//! owns the list instance once it becomes unreachable.

use crate::commands::{ListCommand, VersionChange};
use crate::errors::{ListSyncError, Result};
use crate::identifiers::{ListId, VersionToken};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Store shared between the filter, the executor and local command producers
pub type SharedListVersionStore = Arc<RwLock<ListVersionStore>>;

/// Version state of one list
#[derive(Debug, Clone, PartialEq)]
pub struct ListMetaData {
    list_id: ListId,
    local_version: VersionToken,
    approved_version: VersionToken,
    unapproved_commands: VecDeque<ListCommand>,
}

impl ListMetaData {
    fn new(list_id: ListId, local_version: VersionToken, approved_version: VersionToken) -> Self {
        Self {
            list_id,
            local_version,
            approved_version,
            unapproved_commands: VecDeque::new(),
        }
    }

    /// List this metadata belongs to
    pub fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Version the list has once every queued local command is counted
    pub fn local_version(&self) -> VersionToken {
        self.local_version
    }

    /// Version both peers last agreed on
    pub fn approved_version(&self) -> VersionToken {
        self.approved_version
    }

    /// Local commands awaiting acknowledgment, oldest first
    pub fn unapproved_commands(&self) -> &VecDeque<ListCommand> {
        &self.unapproved_commands
    }

    /// Whether local commands are awaiting acknowledgment
    pub fn has_pending(&self) -> bool {
        !self.unapproved_commands.is_empty()
    }

    /// Verify that the queue chains from the approved to the local version
    pub fn check_chain(&self) -> Result<()> {
        let tail = check_chain(self.list_id, self.approved_version, self.unapproved_commands.iter())?;
        if tail != self.local_version {
            return Err(ListSyncError::VersionMismatch {
                list_id: self.list_id,
                expected: self.local_version,
                actual: tail,
            });
        }
        Ok(())
    }
}

/// Walk `commands` from `start`, returning the version at the end of the chain
fn check_chain<'a>(
    list_id: ListId,
    start: VersionToken,
    commands: impl IntoIterator<Item = &'a ListCommand>,
) -> Result<VersionToken> {
    let mut current = start;
    for (position, command) in commands.into_iter().enumerate() {
        let change = command.version_change();
        if command.list_id() != list_id || change.from != current {
            return Err(ListSyncError::BrokenVersionChain { list_id, position });
        }
        current = change.to;
    }
    Ok(current)
}

/// Ownership table of list metadata
#[derive(Debug, Default)]
pub struct ListVersionStore {
    lists: HashMap<ListId, ListMetaData>,
}

impl ListVersionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }

    /// Wrap a new empty store for sharing
    pub fn shared() -> SharedListVersionStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Metadata of `list_id`
    pub fn get_or_fail(&self, list_id: ListId) -> Result<&ListMetaData> {
        self.lists
            .get(&list_id)
            .ok_or(ListSyncError::UnknownList(list_id))
    }

    fn get_mut_or_fail(&mut self, list_id: ListId) -> Result<&mut ListMetaData> {
        self.lists
            .get_mut(&list_id)
            .ok_or(ListSyncError::UnknownList(list_id))
    }

    /// Register metadata for a list seen for the first time
    ///
    /// A fresh entry has no queued local commands, so both initial versions
    /// must be the same token.
    pub fn create_or_fail(
        &mut self,
        list_id: ListId,
        initial_local: VersionToken,
        initial_approved: VersionToken,
    ) -> Result<()> {
        if self.lists.contains_key(&list_id) {
            return Err(ListSyncError::DuplicateList(list_id));
        }
        if initial_local != initial_approved {
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: initial_approved,
                actual: initial_local,
            });
        }
        tracing::debug!(list_id = %list_id, local = %initial_local, approved = %initial_approved, "Registered list metadata");
        self.lists.insert(
            list_id,
            ListMetaData::new(list_id, initial_local, initial_approved),
        );
        Ok(())
    }

    /// Whether metadata exists for `list_id`
    pub fn contains(&self, list_id: ListId) -> bool {
        self.lists.contains_key(&list_id)
    }

    /// Number of tracked lists
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether no list is tracked
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Drop the metadata of a list that is no longer reachable
    pub fn forget(&mut self, list_id: ListId) -> Option<ListMetaData> {
        let removed = self.lists.remove(&list_id);
        if let Some(meta) = &removed {
            tracing::debug!(
                list_id = %list_id,
                pending = meta.unapproved_commands.len(),
                "Discarded list metadata"
            );
        }
        removed
    }

    /// Queue a locally generated command and advance the local version
    pub fn log_local_command(&mut self, command: ListCommand) -> Result<()> {
        let list_id = command.list_id();
        let meta = self.get_mut_or_fail(list_id)?;
        let change = command.version_change();

        if change.from != meta.local_version {
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: meta.local_version,
                actual: change.from,
            });
        }

        meta.local_version = change.to;
        meta.unapproved_commands.push_back(command);
        tracing::trace!(
            list_id = %list_id,
            from = %change.from,
            to = %change.to,
            pending = meta.unapproved_commands.len(),
            "Queued local command"
        );
        Ok(())
    }

    /// Mark the oldest queued local command as acknowledged by the other peers
    ///
    /// `version_change` must be exactly the one of the oldest queued command.
    pub fn approve_local_command(
        &mut self,
        list_id: ListId,
        version_change: VersionChange,
    ) -> Result<ListCommand> {
        let meta = self.get_mut_or_fail(list_id)?;

        let Some(approved) = meta.unapproved_commands.pop_front() else {
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: meta.local_version,
                actual: version_change.from,
            });
        };
        let oldest = approved.version_change();
        if oldest != version_change {
            meta.unapproved_commands.push_front(approved);
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: oldest.from,
                actual: version_change.from,
            });
        }

        meta.approved_version = version_change.to;
        tracing::debug!(
            list_id = %list_id,
            approved = %meta.approved_version,
            pending = meta.unapproved_commands.len(),
            "Local command approved"
        );
        Ok(approved)
    }

    /// Record that a remote command with `version_change` was applied
    ///
    /// A remote command built on our local version implicitly approves every
    /// queued local command. One built on the approved version while local
    /// commands are queued requires [`rebase_unapproved`](Self::rebase_unapproved).
    pub fn apply_remote(&mut self, list_id: ListId, version_change: VersionChange) -> Result<()> {
        let meta = self.get_mut_or_fail(list_id)?;

        if version_change.from == meta.local_version {
            let implicitly_approved = meta.unapproved_commands.len();
            meta.unapproved_commands.clear();
            meta.approved_version = version_change.to;
            meta.local_version = version_change.to;
            tracing::debug!(
                list_id = %list_id,
                to = %version_change.to,
                implicitly_approved,
                "Applied remote command"
            );
            return Ok(());
        }

        if version_change.from == meta.approved_version {
            return Err(ListSyncError::PendingLocalCommands {
                list_id,
                pending: meta.unapproved_commands.len(),
            });
        }

        Err(ListSyncError::VersionMismatch {
            list_id,
            expected: meta.local_version,
            actual: version_change.from,
        })
    }

    /// Apply a remote command on the approved version and replace the queue
    /// with local commands repaired against it
    pub fn rebase_unapproved(
        &mut self,
        list_id: ListId,
        remote_change: VersionChange,
        repaired: Vec<ListCommand>,
    ) -> Result<()> {
        let meta = self.get_mut_or_fail(list_id)?;

        if remote_change.from != meta.approved_version {
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: meta.approved_version,
                actual: remote_change.from,
            });
        }
        let tail = check_chain(list_id, remote_change.to, repaired.iter())?;

        meta.approved_version = remote_change.to;
        meta.local_version = tail;
        meta.unapproved_commands = repaired.into();
        tracing::debug!(
            list_id = %list_id,
            approved = %meta.approved_version,
            local = %meta.local_version,
            pending = meta.unapproved_commands.len(),
            "Rebased unapproved local commands"
        );
        Ok(())
    }
}
