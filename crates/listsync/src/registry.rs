//! Lookup of observable objects by id
//!
//! The registry only holds weak references. An object stays resolvable while
//! something else (the object graph, or a [`ReferenceKeeper`](crate::ReferenceKeeper)
//! pin) keeps it alive.

use crate::errors::{ListSyncError, Result};
use crate::identifiers::ObjectId;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A live observable object of the replicated graph
pub type ObservableObject = Arc<dyn Any + Send + Sync>;

/// Resolves object ids to live objects
pub trait ObjectRegistry: Send + Sync {
    /// Live object registered under `id`
    ///
    /// Fails with [`ListSyncError::UnknownObject`] when the id was never
    /// registered or its object is gone.
    fn get_by_id_or_fail(&self, id: &ObjectId) -> Result<ObservableObject>;
}

/// Registry holding weak references to registered objects
#[derive(Debug, Default)]
pub struct WeakObjectRegistry {
    objects: RwLock<HashMap<ObjectId, Weak<dyn Any + Send + Sync>>>,
}

impl WeakObjectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Register `object` under `id`
    ///
    /// Re-registering the same object is a no-op. Registering over an entry
    /// whose object was dropped replaces it.
    pub fn register(&self, id: ObjectId, object: &ObservableObject) -> Result<()> {
        let mut objects = self.objects.write();
        if let Some(existing) = objects.get(&id).and_then(Weak::upgrade) {
            if Arc::ptr_eq(&existing, object) {
                return Ok(());
            }
            return Err(ListSyncError::DuplicateObject(id));
        }
        objects.insert(id, Arc::downgrade(object));
        Ok(())
    }

    /// Drop entries whose objects are gone, returning how many were removed
    pub fn prune(&self) -> usize {
        let mut objects = self.objects.write();
        let before = objects.len();
        objects.retain(|_, weak| weak.strong_count() > 0);
        let pruned = before - objects.len();
        if pruned > 0 {
            tracing::trace!(pruned, remaining = objects.len(), "Pruned dead registry entries");
        }
        pruned
    }

    /// Number of entries, including ones whose objects may already be gone
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Whether the registry has no entries
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl ObjectRegistry for WeakObjectRegistry {
    fn get_by_id_or_fail(&self, id: &ObjectId) -> Result<ObservableObject> {
        self.objects
            .read()
            .get(id)
            .and_then(Weak::upgrade)
            .ok_or(ListSyncError::UnknownObject(*id))
    }
}
