//! Create-or-update and conditional prune of state tree nodes.

pub mod attributes;

use crate::error::{report_error, ErrorSink};
use crate::models::StateValue;
use crate::store::{Common, ObjectKind, ObjectPatch, State, StateObject, StateStore};
use anyhow::{Context, Result};
use serde_json::Map;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub use attributes::StateAttr;

/// Writes computed values into a [`StateStore`].
///
/// Holds the run-scoped set of attribute keys already warned about, so a
/// missing metadata entry is reported once per run no matter how many paths
/// use it.
pub struct Reconciler {
    store: Arc<dyn StateStore>,
    delete_unused: bool,
    missing_attributes: Mutex<HashSet<String>>,
    sink: Option<Arc<dyn ErrorSink>>,
}

impl Reconciler {
    pub fn new(store: Arc<dyn StateStore>, delete_unused: bool) -> Self {
        Self {
            store,
            delete_unused,
            missing_attributes: Mutex::new(HashSet::new()),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Option<Arc<dyn ErrorSink>>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &Arc<dyn StateStore> {
        &self.store
    }

    pub fn sink(&self) -> Option<&Arc<dyn ErrorSink>> {
        self.sink.as_ref()
    }

    fn attribute(&self, key: &str) -> StateAttr {
        if let Some(attr) = attributes::lookup(key) {
            return *attr;
        }

        let first = self
            .missing_attributes
            .lock()
            .map(|mut seen| seen.insert(key.to_string()))
            .unwrap_or(false);
        if first {
            warn!("State attribute definition missing for {}", key);
        }

        StateAttr {
            name: "",
            role: "state",
            unit: "",
            write: false,
        }
    }

    /// Write `value` to `path` with the metadata registered for `key`.
    ///
    /// A `None` value synchronizes metadata only, the previous value stays.
    /// Failures are reported and never propagated.
    pub async fn reconcile(&self, path: &str, key: &str, value: Option<StateValue>) {
        if let Err(e) = self.try_reconcile(path, key, value).await {
            report_error(self.sink(), "reconcile", &e);
        }
    }

    async fn try_reconcile(&self, path: &str, key: &str, value: Option<StateValue>) -> Result<()> {
        let attr = self.attribute(key);
        let name = if attr.name.is_empty() { key } else { attr.name };
        let value_type = value.as_ref().map(|v| v.type_name().to_string());

        let object = StateObject {
            kind: ObjectKind::State,
            common: Common {
                name: name.to_string(),
                role: Some(attr.role.to_string()),
                value_type: value_type.clone(),
                unit: Some(attr.unit.to_string()),
                read: Some(true),
                write: Some(attr.write),
            },
            native: Map::new(),
        };
        self.store
            .set_object_not_exists(path, object)
            .await
            .with_context(|| format!("Failed to create {}", path))?;

        self.store
            .extend_object(
                path,
                ObjectPatch {
                    kind: Some(ObjectKind::State),
                    name: Some(name.to_string()),
                    value_type,
                    unit: Some(attr.unit.to_string()),
                    ..Default::default()
                },
            )
            .await
            .with_context(|| format!("Failed to update metadata of {}", path))?;

        if let Some(val) = value {
            self.store
                .set_state(path, State { val, ack: true })
                .await
                .with_context(|| format!("Failed to write value of {}", path))?;
        }

        Ok(())
    }

    /// Create or rename a device/channel node.
    pub async fn ensure_folder(&self, path: &str, kind: ObjectKind, name: &str) -> Result<()> {
        self.store
            .extend_object(path, ObjectPatch::folder(kind, name))
            .await
            .with_context(|| format!("Failed to create {}", path))
    }

    /// Create a device/channel node only if missing.
    pub async fn ensure_folder_exists(&self, path: &str, kind: ObjectKind, name: &str) -> Result<()> {
        self.store
            .set_object_not_exists(path, StateObject::folder(kind, name))
            .await
            .map(|_| ())
            .with_context(|| format!("Failed to create {}", path))
    }

    /// Delete `path` and its subtree when pruning is enabled. Best effort.
    pub async fn prune(&self, path: &str) {
        if !self.delete_unused {
            return;
        }

        match self.store.get_object(path).await {
            Ok(Some(_)) => {
                if let Err(e) = self.store.del_object(path).await {
                    debug!("Could not delete {}: {:#}", path, e);
                } else {
                    debug!("Deleted {}", path);
                }
            }
            Ok(None) => {}
            Err(e) => debug!("Could not look up {}: {:#}", path, e),
        }
    }

    /// Attribute keys that had no metadata this run, sorted.
    pub fn missing_attributes(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .missing_attributes
            .lock()
            .map(|seen| seen.iter().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}
