//! The currently selected element and the breadcrumb leading to it.

use serde::Serialize;
use tracing::debug;
use trellis_tree::{ElementNode, ElementTree};

/// One step of the breadcrumb trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionController {
    selected: Option<String>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select `id`. Selecting an id the tree does not hold clears the selection.
    pub fn select(&mut self, tree: &ElementTree, id: &str) -> bool {
        if tree.contains(id) {
            debug!(node_id = %id, "Selected element");
            self.selected = Some(id.to_string());
            true
        } else {
            self.selected = None;
            false
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// `[root, ..., selected]` as crumbs; empty when nothing is selected
    pub fn breadcrumb(&self, tree: &ElementTree) -> Vec<Crumb> {
        let Some(id) = &self.selected else {
            return Vec::new();
        };
        tree.ancestor_path(id)
            .into_iter()
            .map(|node| Crumb {
                id: node.id.clone(),
                label: label_for(node),
            })
            .collect()
    }

    /// Drop the selection if its node is gone. Returns whether it was dropped.
    pub fn reconcile(&mut self, tree: &ElementTree) -> bool {
        match &self.selected {
            Some(id) if !tree.contains(id) => {
                debug!(node_id = %id, "Selected element no longer exists");
                self.selected = None;
                true
            }
            _ => false,
        }
    }
}

fn label_for(node: &ElementNode) -> String {
    if node.is_root() {
        "Page".to_string()
    } else if node.is_text_run() {
        "Text".to_string()
    } else if node.is_expression() {
        "Expression".to_string()
    } else {
        node.node_type.clone()
    }
}
