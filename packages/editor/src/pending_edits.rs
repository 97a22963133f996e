//! # Pending Edits
//!
//! Property panels keep a draft per field and commit it to the tree only once
//! typing has paused for the quiescence window. Blur flushes one field at
//! once; unmount flushes everything.
//!
//! Time is passed in explicitly, so the buffer has no timers of its own. The
//! host polls [`PendingEdits::due`] from whatever tick it already has.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_QUIESCENCE: Duration = Duration::from_millis(300);

/// Which part of a node an edit targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "field", content = "name", rename_all = "camelCase")]
pub enum EditField {
    Text,
    ClassName,
    Style(String),
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditKey {
    pub node_id: String,
    pub field: EditField,
}

impl EditKey {
    pub fn new(node_id: impl Into<String>, field: EditField) -> Self {
        Self {
            node_id: node_id.into(),
            field,
        }
    }
}

/// A settled edit, ready to be written to the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEdit {
    pub key: EditKey,
    pub value: String,
}

#[derive(Debug, Clone)]
struct Draft {
    value: String,
    last_change: Instant,
}

#[derive(Debug, Clone)]
pub struct PendingEdits {
    quiescence: Duration,
    drafts: IndexMap<EditKey, Draft>,
}

impl Default for PendingEdits {
    fn default() -> Self {
        Self::new(DEFAULT_QUIESCENCE)
    }
}

impl PendingEdits {
    pub fn new(quiescence: Duration) -> Self {
        Self {
            quiescence,
            drafts: IndexMap::new(),
        }
    }

    pub fn quiescence(&self) -> Duration {
        self.quiescence
    }

    /// Record a keystroke's worth of change; restarts that field's window
    pub fn stage(&mut self, key: EditKey, value: impl Into<String>, now: Instant) {
        self.drafts.insert(
            key,
            Draft {
                value: value.into(),
                last_change: now,
            },
        );
    }

    /// The value the field should display, if it has an uncommitted draft
    pub fn draft(&self, key: &EditKey) -> Option<&str> {
        self.drafts.get(key).map(|draft| draft.value.as_str())
    }

    /// Remove and return every draft that has been quiet for the whole window
    pub fn due(&mut self, now: Instant) -> Vec<PendingEdit> {
        let quiescence = self.quiescence;
        let ready: Vec<EditKey> = self
            .drafts
            .iter()
            .filter(|(_, draft)| now.saturating_duration_since(draft.last_change) >= quiescence)
            .map(|(key, _)| key.clone())
            .collect();

        ready.into_iter().filter_map(|key| self.take(key)).collect()
    }

    /// Blur: commit one field immediately
    pub fn flush_field(&mut self, key: &EditKey) -> Option<PendingEdit> {
        self.take(key.clone())
    }

    /// Unmount: commit everything immediately, in staging order
    pub fn flush_all(&mut self) -> Vec<PendingEdit> {
        debug!(count = self.drafts.len(), "Flushing all pending edits");
        self.drafts
            .drain(..)
            .map(|(key, draft)| PendingEdit {
                key,
                value: draft.value,
            })
            .collect()
    }

    /// Forget drafts for a node that went away
    pub fn discard_node(&mut self, node_id: &str) {
        self.drafts.retain(|key, _| key.node_id != node_id);
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    fn take(&mut self, key: EditKey) -> Option<PendingEdit> {
        self.drafts
            .shift_remove(&key)
            .map(|draft| PendingEdit { key, value: draft.value })
    }
}
