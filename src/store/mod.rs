//! Persisted object/value store.
//!
//! The state tree is addressed by dotted paths (`Germany.Hospital.freeBeds`).
//! Every node is an object carrying metadata; leaf objects additionally hold
//! a value. The synchronizer only talks to the store through [`StateStore`].

pub mod json_store;

use crate::models::StateValue;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use json_store::JsonStore;

/// Kind of a node in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Device,
    Channel,
    State,
}

/// Display metadata of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Common {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<bool>,
}

/// A node of the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateObject {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    pub common: Common,
    #[serde(default)]
    pub native: Map<String, Value>,
}

impl StateObject {
    /// A folder-like node (device or channel).
    pub fn folder(kind: ObjectKind, name: &str) -> Self {
        Self {
            kind,
            common: Common {
                name: name.to_string(),
                ..Default::default()
            },
            native: Map::new(),
        }
    }
}

/// Partial update merged into an existing object. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub kind: Option<ObjectKind>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub value_type: Option<String>,
    pub unit: Option<String>,
    pub native: Map<String, Value>,
}

impl ObjectPatch {
    pub fn folder(kind: ObjectKind, name: &str) -> Self {
        Self {
            kind: Some(kind),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn native(native: Map<String, Value>) -> Self {
        Self {
            native,
            ..Default::default()
        }
    }

    /// Merge into `object`.
    pub fn apply(self, object: &mut StateObject) {
        if let Some(kind) = self.kind {
            object.kind = kind;
        }
        if let Some(name) = self.name {
            object.common.name = name;
        }
        if let Some(role) = self.role {
            object.common.role = Some(role);
        }
        if let Some(value_type) = self.value_type {
            object.common.value_type = Some(value_type);
        }
        if let Some(unit) = self.unit {
            object.common.unit = Some(unit);
        }
        object.native.extend(self.native);
    }

    /// Object created when extending a path that does not exist yet.
    pub fn into_object(self, id: &str) -> StateObject {
        let mut object = StateObject::folder(self.kind.unwrap_or(ObjectKind::State), id);
        self.apply(&mut object);
        object
    }
}

/// A stored value. `ack` marks a confirmed value rather than a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    pub val: StateValue,
    pub ack: bool,
}

/// Contract of the persisted tree.
///
/// Writes are awaited one at a time by the caller, so implementations need
/// no ordering guarantees beyond their own interior locking.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get_object(&self, id: &str) -> Result<Option<StateObject>>;

    /// Create the object unless one exists. Returns whether it was created.
    async fn set_object_not_exists(&self, id: &str, object: StateObject) -> Result<bool>;

    /// Merge `patch` into the object, creating it if missing.
    async fn extend_object(&self, id: &str, patch: ObjectPatch) -> Result<()>;

    async fn get_state(&self, id: &str) -> Result<Option<State>>;

    async fn set_state(&self, id: &str, state: State) -> Result<()>;

    /// Delete the object, its value and its whole subtree.
    async fn del_object(&self, id: &str) -> Result<()>;

    /// Persist pending changes.
    async fn flush(&self) -> Result<()>;
}
