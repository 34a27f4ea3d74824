//! JSON-file backed implementation of [`StateStore`].

use super::{ObjectPatch, State, StateObject, StateStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Tree {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    objects: BTreeMap<String, StateObject>,
    #[serde(default)]
    states: BTreeMap<String, State>,
}

/// Ordered in-memory tree, loaded from and flushed to a JSON file.
pub struct JsonStore {
    path: Option<PathBuf>,
    tree: Mutex<Tree>,
}

impl JsonStore {
    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tree: Mutex::new(Tree::default()),
        }
    }

    /// Open the store at `path`. A missing file is an empty tree.
    pub fn open(path: &Path) -> Result<Self> {
        let tree = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            let tree: Tree = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?;
            info!(
                "Loaded {} objects and {} values from {}",
                tree.objects.len(),
                tree.states.len(),
                path.display()
            );
            tree
        } else {
            debug!("State file {} does not exist yet", path.display());
            Tree::default()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            tree: Mutex::new(tree),
        })
    }

    /// All object ids, sorted.
    pub async fn object_ids(&self) -> Vec<String> {
        self.tree.lock().await.objects.keys().cloned().collect()
    }
}

fn in_subtree(candidate: &str, root: &str) -> bool {
    candidate == root
        || candidate
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}

#[async_trait]
impl StateStore for JsonStore {
    async fn get_object(&self, id: &str) -> Result<Option<StateObject>> {
        Ok(self.tree.lock().await.objects.get(id).cloned())
    }

    async fn set_object_not_exists(&self, id: &str, object: StateObject) -> Result<bool> {
        let mut tree = self.tree.lock().await;
        if tree.objects.contains_key(id) {
            return Ok(false);
        }
        tree.objects.insert(id.to_string(), object);
        Ok(true)
    }

    async fn extend_object(&self, id: &str, patch: ObjectPatch) -> Result<()> {
        let mut tree = self.tree.lock().await;
        match tree.objects.entry(id.to_string()) {
            Entry::Occupied(mut entry) => patch.apply(entry.get_mut()),
            Entry::Vacant(entry) => {
                entry.insert(patch.into_object(id));
            }
        }
        Ok(())
    }

    async fn get_state(&self, id: &str) -> Result<Option<State>> {
        Ok(self.tree.lock().await.states.get(id).cloned())
    }

    async fn set_state(&self, id: &str, state: State) -> Result<()> {
        self.tree.lock().await.states.insert(id.to_string(), state);
        Ok(())
    }

    async fn del_object(&self, id: &str) -> Result<()> {
        let mut tree = self.tree.lock().await;
        let before = tree.objects.len();
        tree.objects.retain(|key, _| !in_subtree(key, id));
        tree.states.retain(|key, _| !in_subtree(key, id));
        debug!("Deleted {} objects below {}", before - tree.objects.len(), id);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut tree = self.tree.lock().await;
        tree.saved_at = Some(Utc::now());
        let content =
            serde_json::to_string_pretty(&*tree).context("Failed to serialize state tree")?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        info!("State tree saved to {}", path.display());
        Ok(())
    }
}
