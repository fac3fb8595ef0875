//! Rebasing of replace commands over concurrently applied commands
//!
//! Two commands that declare the same `from` version were both computed against
//! a state that has since diverged: one of them (`other`) was applied first.
//! Repair rewrites the second one (`subject`) so it applies to the state `other`
//! produced. Only replaces need repair here; a replace whose slot was removed
//! turns into an add so the replacement value is not lost, which is why the
//! result is always a [`ReplaceOrAddInList`].
//!
//! Index rules for a replace of slot `i`:
//!
//! | other              | result                                        |
//! |--------------------|-----------------------------------------------|
//! | add at `j <= i`    | replace `i + 1`                               |
//! | add at `j > i`     | replace `i`                                   |
//! | remove `j < i`     | replace `i - 1`                               |
//! | remove `i`         | add at `i`                                    |
//! | remove `j > i`     | replace `i`                                   |
//! | replace `j != i`   | replace `i`                                   |
//! | replace `i`        | [`ListSyncError::UnresolvedConflict`]         |
//! | remove except `R`  | replace at new position if `i` in `R`, else add at `R.len()` |
//!
//! A replace that already became an add follows the usual insert shifting.
//! The repaired `from` is `other.to`; `to` is a fresh token.

use crate::commands::{
    AddToList, ListCommand, ReplaceInList, ReplaceOrAddInList, VersionChange,
};
use crate::errors::{ListSyncError, Result};
use crate::versions::{RandomVersionTokens, VersionTokenSource};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    Replace(usize),
    Add(usize),
}

/// Repairs replace commands against commands applied ahead of them
#[derive(Debug, Clone, Default)]
pub struct CommandRepairer<T = RandomVersionTokens> {
    versions: T,
}

impl<T: VersionTokenSource> CommandRepairer<T> {
    /// Create a repairer minting versions from `versions`
    pub fn new(versions: T) -> Self {
        Self { versions }
    }

    /// Rebase `subject` onto the state produced by `other`
    ///
    /// Both commands must target the same list and start from the same version.
    #[instrument(
        level = "debug",
        skip_all,
        fields(list_id = %subject.list_id(), index = subject.index(), other = other.kind())
    )]
    pub fn repair(
        &self,
        subject: &ReplaceOrAddInList,
        other: &ListCommand,
    ) -> Result<ReplaceOrAddInList> {
        let list_id = subject.list_id();
        if other.list_id() != list_id {
            return Err(ListSyncError::ListMismatch {
                subject: list_id,
                other: other.list_id(),
            });
        }
        let other_change = other.version_change();
        let subject_from = subject.version_change().from;
        if subject_from != other_change.from {
            return Err(ListSyncError::VersionMismatch {
                list_id,
                expected: other_change.from,
                actual: subject_from,
            });
        }

        let placement = match subject {
            ReplaceOrAddInList::Replace(replace) => replace_placement(replace, other)?,
            ReplaceOrAddInList::Add(add) => Placement::Add(insert_position(add.index, other)),
        };
        let version_change = VersionChange::new(other_change.to, self.versions.next_version());
        debug!(?placement, from = %version_change.from, to = %version_change.to, "Repaired command");

        let value = subject.value().clone();
        Ok(match placement {
            Placement::Replace(index) => ReplaceOrAddInList::Replace(ReplaceInList {
                list_id,
                index,
                value,
                version_change,
            }),
            Placement::Add(index) => ReplaceOrAddInList::Add(AddToList {
                list_id,
                index,
                value,
                version_change,
            }),
        })
    }

    /// Repair a remote command against a local command this peer applied first
    pub fn repair_remote_command(
        &self,
        remote: &ReplaceOrAddInList,
        local: &ListCommand,
    ) -> Result<ReplaceOrAddInList> {
        self.repair(remote, local)
    }

    /// Repair a queued local replace against a remote command applied first
    pub fn repair_local_command(
        &self,
        local: &ReplaceInList,
        remote: &ListCommand,
    ) -> Result<ReplaceOrAddInList> {
        self.repair(&ReplaceOrAddInList::Replace(local.clone()), remote)
    }

    /// Repair `subject` against a chain of commands applied in order ahead of it
    ///
    /// The first applied command must start from the subject's version and each
    /// following one from its predecessor's `to`.
    pub fn repair_against_all(
        &self,
        subject: &ReplaceOrAddInList,
        applied: &[ListCommand],
    ) -> Result<ReplaceOrAddInList> {
        applied
            .iter()
            .try_fold(subject.clone(), |current, other| self.repair(&current, other))
    }
}

fn replace_placement(replace: &ReplaceInList, other: &ListCommand) -> Result<Placement> {
    let i = replace.index;
    let placement = match other {
        ListCommand::Add(add) if add.index <= i => Placement::Replace(i + 1),
        ListCommand::Add(_) => Placement::Replace(i),
        ListCommand::Remove(remove) if remove.index < i => Placement::Replace(i - 1),
        ListCommand::Remove(remove) if remove.index == i => Placement::Add(i),
        ListCommand::Remove(_) => Placement::Replace(i),
        ListCommand::Replace(other_replace) if other_replace.index == i => {
            warn!(list_id = %replace.list_id, index = i, "Concurrent replace of the same slot");
            return Err(ListSyncError::UnresolvedConflict {
                list_id: replace.list_id,
                index: i,
            });
        }
        ListCommand::Replace(_) => Placement::Replace(i),
        ListCommand::RemoveExcept(except) => match except.new_position_of(i) {
            Some(position) => Placement::Replace(position),
            None => Placement::Add(except.retained.len()),
        },
    };
    Ok(placement)
}

/// Where an insert at `i` lands once `other` was applied
fn insert_position(i: usize, other: &ListCommand) -> usize {
    match other {
        ListCommand::Add(add) if add.index <= i => i + 1,
        ListCommand::Add(_) => i,
        ListCommand::Remove(remove) if remove.index < i => i - 1,
        ListCommand::Remove(_) | ListCommand::Replace(_) => i,
        ListCommand::RemoveExcept(except) => except.retained.range(..i).count(),
    }
}
