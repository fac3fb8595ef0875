//! List mutation commands
//!
//! Commands are immutable value objects. Each carries the list it targets and
//! a [`VersionChange`] naming the list state it was computed against (`from`)
//! and the state it produces (`to`). The set of command kinds is closed; adding
//! a fifth kind is a protocol change.

use crate::identifiers::{ListId, VersionToken};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Transition of a list from one version to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionChange {
    /// Version the command expects the list to be in
    pub from: VersionToken,
    /// Version the list is in after the command was applied
    pub to: VersionToken,
}

impl VersionChange {
    /// Create a new version change
    pub fn new(from: VersionToken, to: VersionToken) -> Self {
        Self { from, to }
    }
}

/// Insert `value` at `index`, shifting later elements up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddToList {
    /// Target list
    pub list_id: ListId,
    /// Insert position
    pub index: usize,
    /// Inserted element
    pub value: Value,
    /// Version transition
    pub version_change: VersionChange,
}

/// Remove the element at `index`, shifting later elements down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveFromList {
    /// Target list
    pub list_id: ListId,
    /// Removed position
    pub index: usize,
    /// Version transition
    pub version_change: VersionChange,
}

/// Overwrite the element at `index`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceInList {
    /// Target list
    pub list_id: ListId,
    /// Replaced position
    pub index: usize,
    /// New element
    pub value: Value,
    /// Version transition
    pub version_change: VersionChange,
}

/// Remove every element whose index is not in `retained`
///
/// Used to resynchronize a list in bulk. Indices refer to the list as it was
/// before the command; survivors keep their relative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveFromListExcept {
    /// Target list
    pub list_id: ListId,
    /// Indices of the elements that survive
    pub retained: BTreeSet<usize>,
    /// Version transition
    pub version_change: VersionChange,
}

impl RemoveFromListExcept {
    /// Position `index` ends up at after the command, if it survives
    pub fn new_position_of(&self, index: usize) -> Option<usize> {
        if self.retained.contains(&index) {
            Some(self.retained.range(..index).count())
        } else {
            None
        }
    }
}

/// Any list mutation command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListCommand {
    /// Insert an element
    Add(AddToList),
    /// Remove one element
    Remove(RemoveFromList),
    /// Overwrite one element
    Replace(ReplaceInList),
    /// Bulk removal of everything not retained
    RemoveExcept(RemoveFromListExcept),
}

impl ListCommand {
    /// List this command targets
    pub fn list_id(&self) -> ListId {
        match self {
            ListCommand::Add(cmd) => cmd.list_id,
            ListCommand::Remove(cmd) => cmd.list_id,
            ListCommand::Replace(cmd) => cmd.list_id,
            ListCommand::RemoveExcept(cmd) => cmd.list_id,
        }
    }

    /// Version transition of this command
    pub fn version_change(&self) -> VersionChange {
        match self {
            ListCommand::Add(cmd) => cmd.version_change,
            ListCommand::Remove(cmd) => cmd.version_change,
            ListCommand::Replace(cmd) => cmd.version_change,
            ListCommand::RemoveExcept(cmd) => cmd.version_change,
        }
    }

    /// Payload carried by the command, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            ListCommand::Add(cmd) => Some(&cmd.value),
            ListCommand::Replace(cmd) => Some(&cmd.value),
            ListCommand::Remove(_) | ListCommand::RemoveExcept(_) => None,
        }
    }

    /// Short name of the command kind, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ListCommand::Add(_) => "add",
            ListCommand::Remove(_) => "remove",
            ListCommand::Replace(_) => "replace",
            ListCommand::RemoveExcept(_) => "remove_except",
        }
    }
}

impl From<AddToList> for ListCommand {
    fn from(cmd: AddToList) -> Self {
        ListCommand::Add(cmd)
    }
}

impl From<RemoveFromList> for ListCommand {
    fn from(cmd: RemoveFromList) -> Self {
        ListCommand::Remove(cmd)
    }
}

impl From<ReplaceInList> for ListCommand {
    fn from(cmd: ReplaceInList) -> Self {
        ListCommand::Replace(cmd)
    }
}

impl From<RemoveFromListExcept> for ListCommand {
    fn from(cmd: RemoveFromListExcept) -> Self {
        ListCommand::RemoveExcept(cmd)
    }
}

/// Result of repairing a replace: either still a replace, or an add when the
/// replaced element was removed concurrently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplaceOrAddInList {
    /// The replaced slot still exists
    Replace(ReplaceInList),
    /// The replaced slot vanished; the value is re-inserted
    Add(AddToList),
}

impl ReplaceOrAddInList {
    /// List this command targets
    pub fn list_id(&self) -> ListId {
        match self {
            ReplaceOrAddInList::Replace(cmd) => cmd.list_id,
            ReplaceOrAddInList::Add(cmd) => cmd.list_id,
        }
    }

    /// Target position
    pub fn index(&self) -> usize {
        match self {
            ReplaceOrAddInList::Replace(cmd) => cmd.index,
            ReplaceOrAddInList::Add(cmd) => cmd.index,
        }
    }

    /// Carried payload
    pub fn value(&self) -> &Value {
        match self {
            ReplaceOrAddInList::Replace(cmd) => &cmd.value,
            ReplaceOrAddInList::Add(cmd) => &cmd.value,
        }
    }

    /// Version transition
    pub fn version_change(&self) -> VersionChange {
        match self {
            ReplaceOrAddInList::Replace(cmd) => cmd.version_change,
            ReplaceOrAddInList::Add(cmd) => cmd.version_change,
        }
    }
}

impl From<ReplaceInList> for ReplaceOrAddInList {
    fn from(cmd: ReplaceInList) -> Self {
        ReplaceOrAddInList::Replace(cmd)
    }
}

impl From<AddToList> for ReplaceOrAddInList {
    fn from(cmd: AddToList) -> Self {
        ReplaceOrAddInList::Add(cmd)
    }
}

impl From<ReplaceOrAddInList> for ListCommand {
    fn from(cmd: ReplaceOrAddInList) -> Self {
        match cmd {
            ReplaceOrAddInList::Replace(replace) => ListCommand::Replace(replace),
            ReplaceOrAddInList::Add(add) => ListCommand::Add(add),
        }
    }
}
