//! # Undo/Redo Stack
//!
//! Snapshot-based history. Each entry holds the whole tree as it was before
//! an edit; undo swaps the current tree with the top entry and moves the
//! displaced tree onto the redo stack.
//!
//! ## Batching
//!
//! Several edits can be grouped so they undo as one step:
//!
//! ```rust
//! use trellis_editor::UndoStack;
//! use trellis_tree::ElementTree;
//!
//! let mut tree = ElementTree::new();
//! let mut stack = UndoStack::new();
//!
//! stack.begin_batch(&tree);
//! stack.record(&tree, "first");
//! stack.record(&tree, "second");
//! stack.end_batch();
//!
//! assert_eq!(stack.undo_levels(), 1);
//! # let _ = stack.undo(&mut tree);
//! ```

use tracing::debug;
use trellis_tree::ElementTree;

/// Tree state to return to, with a label for menus
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub snapshot: ElementTree,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
struct OpenBatch {
    entry: HistoryEntry,
    recorded: bool,
}

#[derive(Debug, Clone)]
pub struct UndoStack {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_levels: usize,
    current_batch: Option<OpenBatch>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// `0` keeps unlimited history
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record the state `before` an edit that has just succeeded.
    /// Inside a batch only the state at batch start is kept.
    pub fn record(&mut self, before: &ElementTree, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.recorded = true;
            if batch.entry.description.is_none() {
                batch.entry.description = Some(description.into());
            }
            return;
        }

        self.push_entry(HistoryEntry {
            snapshot: before.clone(),
            description: Some(description.into()),
        });
    }

    pub fn begin_batch(&mut self, tree: &ElementTree) {
        if self.current_batch.is_none() {
            self.current_batch = Some(OpenBatch {
                entry: HistoryEntry {
                    snapshot: tree.clone(),
                    description: None,
                },
                recorded: false,
            });
        }
    }

    /// Close the batch; an empty batch leaves no history
    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if batch.recorded {
                self.push_entry(batch.entry);
            }
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.entry.description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new edit invalidates the redo branch
        self.redo_stack.clear();
    }

    /// Restore the most recent snapshot into `tree`
    pub fn undo(&mut self, tree: &mut ElementTree) -> bool {
        let Some(entry) = self.undo_stack.pop() else {
            return false;
        };
        debug!(description = ?entry.description, "Undo");
        let current = std::mem::replace(tree, entry.snapshot);
        self.redo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description,
        });
        true
    }

    pub fn redo(&mut self, tree: &mut ElementTree) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        debug!(description = ?entry.description, "Redo");
        let current = std::mem::replace(tree, entry.snapshot);
        self.undo_stack.push(HistoryEntry {
            snapshot: current,
            description: entry.description,
        });
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::{ElementNode, ROOT_ID};

    fn push_child(tree: &mut ElementTree, id: &str) {
        tree.edit(|root| root.children.push(ElementNode::new(id, "div")));
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut tree = ElementTree::new();
        let mut stack = UndoStack::new();

        let before = tree.clone();
        push_child(&mut tree, "a");
        stack.record(&before, "Add a");

        assert!(stack.undo(&mut tree));
        assert!(tree.find("a").is_none());
        assert_eq!(stack.redo_description(), Some("Add a"));

        assert!(stack.redo(&mut tree));
        assert_eq!(tree.parent_id("a"), Some(ROOT_ID));
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut tree = ElementTree::new();
        let mut stack = UndoStack::new();

        stack.record(&tree, "one");
        push_child(&mut tree, "a");
        stack.undo(&mut tree);
        assert!(stack.can_redo());

        stack.record(&tree, "two");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_batch_is_one_level() {
        let mut tree = ElementTree::new();
        let mut stack = UndoStack::new();

        stack.begin_batch(&tree);
        for id in ["a", "b", "c"] {
            let before = tree.clone();
            push_child(&mut tree, id);
            stack.record(&before, format!("Add {}", id));
        }
        stack.set_batch_description("Add three");
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Add three"));
        stack.undo(&mut tree);
        assert_eq!(tree.count_nodes(), 1);
    }

    #[test]
    fn test_empty_batch_leaves_no_history() {
        let tree = ElementTree::new();
        let mut stack = UndoStack::new();
        stack.begin_batch(&tree);
        stack.end_batch();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_levels() {
        let tree = ElementTree::new();
        let mut stack = UndoStack::with_max_levels(3);
        for i in 0..5 {
            stack.record(&tree, format!("edit {}", i));
        }
        assert_eq!(stack.undo_levels(), 3);
        assert_eq!(stack.undo_description(), Some("edit 4"));
    }
}
