//! Shared fixtures for listsync integration tests.

#![allow(dead_code)]

use listsync::{
    Clock, ListCommand, ListCommandExecutor, ListId, Result, SharedListVersionStore, Value,
    VersionToken,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("listsync=debug")
        .try_init();
}

pub fn list_id(n: u128) -> ListId {
    ListId::from_uuid(Uuid::from_u128(n))
}

pub fn token(n: u128) -> VersionToken {
    VersionToken::from_uuid(Uuid::from_u128(n))
}

/// Apply `command` to an in-memory list
pub fn apply_to(list: &mut Vec<Value>, command: &ListCommand) {
    match command {
        ListCommand::Add(add) => list.insert(add.index, add.value.clone()),
        ListCommand::Remove(remove) => {
            list.remove(remove.index);
        }
        ListCommand::Replace(replace) => list[replace.index] = replace.value.clone(),
        ListCommand::RemoveExcept(except) => {
            let mut index = 0;
            list.retain(|_| {
                let keep = except.retained.contains(&index);
                index += 1;
                keep
            });
        }
    }
}

/// Executor applying accepted remote commands to plain vectors
pub struct VecListExecutor {
    pub lists: HashMap<ListId, Vec<Value>>,
    store: SharedListVersionStore,
}

impl VecListExecutor {
    pub fn new(store: SharedListVersionStore) -> Self {
        Self {
            lists: HashMap::new(),
            store,
        }
    }

    pub fn with_list(mut self, list_id: ListId, values: Vec<Value>) -> Self {
        self.lists.insert(list_id, values);
        self
    }

    pub fn list(&self, list_id: ListId) -> &[Value] {
        self.lists.get(&list_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl ListCommandExecutor for VecListExecutor {
    fn execute(&mut self, command: ListCommand) -> Result<()> {
        apply_to(self.lists.entry(command.list_id()).or_default(), &command);
        self.store
            .write()
            .apply_remote(command.list_id(), command.version_change())
    }
}

/// Clock advanced by hand
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        #[allow(clippy::disallowed_methods)]
        let start = Instant::now();
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

pub fn values(items: &[&str]) -> Vec<Value> {
    items.iter().map(|item| Value::simple(*item)).collect()
}
