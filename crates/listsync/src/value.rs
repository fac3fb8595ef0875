//! Payload of add and replace commands.

use crate::identifiers::ObjectId;
use serde::{Deserialize, Serialize};

/// A list element that is either an observable object or a simple value.
///
/// Exactly one variant is populated. `Simple(serde_json::Value::Null)` is a
/// real scalar, not an absent value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Reference to an object tracked by the object registry
    Observable(ObjectId),
    /// Inline scalar payload
    Simple(serde_json::Value),
}

impl Value {
    /// Wrap an inline scalar
    pub fn simple(value: impl Into<serde_json::Value>) -> Self {
        Value::Simple(value.into())
    }

    /// Whether this value is an inline scalar
    pub fn is_simple(&self) -> bool {
        matches!(self, Value::Simple(_))
    }

    /// The referenced object id, if this is an observable reference
    pub fn observable_object_id(&self) -> Option<ObjectId> {
        match self {
            Value::Observable(id) => Some(*id),
            Value::Simple(_) => None,
        }
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Observable(id)
    }
}
