//! # Structural Mutations
//!
//! Add, duplicate, delete, move and update operations over an
//! [`ElementTree`].
//!
//! ## Guarantees
//!
//! Every operation validates against the current tree before touching it, so
//! an `Err` always leaves the tree exactly as it was. Structural changes run
//! through [`ElementTree::edit`], which rebuilds the parent index.
//!
//! ### Move
//! - The root sentinel never moves
//! - A node is never dropped onto itself
//! - One cycle rule for every position: the move is rejected when the target
//!   or the resolved destination parent lies inside the moved subtree
//! - The moved subtree forgets its source origin and is re-printed on save
//!
//! ### Duplicate
//! - Every node of the clone gets a fresh id, not only its root
//! - Duplicating the root duplicates each top-level element
//!
//! ### Commands
//! Gesture and toolbar layers talk to the engine through [`Command`] values,
//! which serialize to JSON for hosts that live out of process.

use crate::defaults::ElementDefaults;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use trellis_tree::visitor::Relabel;
use trellis_tree::{would_create_cycle, ElementNode, ElementTree, VisitorMut, ROOT_ID};

/// Where a dragged node lands relative to the node it was dropped on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// Sibling, immediately before the target
    Before,
    /// Sibling, immediately after the target
    After,
    /// Last child of the target
    Inside,
    /// Sibling of the target's parent, immediately after it
    Outside,
    /// Last child of the root
    Root,
}

impl std::fmt::Display for DropPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
            DropPosition::Inside => "inside",
            DropPosition::Outside => "outside",
            DropPosition::Root => "root",
        };
        f.write_str(name)
    }
}

/// Structural command dispatched to the [`MutationEngine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    Add {
        parent_id: String,
        #[serde(rename = "type")]
        node_type: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attributes: Option<IndexMap<String, String>>,
    },
    Duplicate {
        id: String,
    },
    Delete {
        id: String,
    },
    Move {
        source_id: String,
        target_id: String,
        position: DropPosition,
    },
    /// Replace the editable fields of the node with the same id
    Update {
        node: ElementNode,
    },
}

impl Command {
    pub fn describe(&self) -> String {
        match self {
            Command::Add { node_type, .. } => format!("Add {}", node_type),
            Command::Duplicate { id } => format!("Duplicate {}", id),
            Command::Delete { id } => format!("Delete {}", id),
            Command::Move {
                source_id,
                position,
                ..
            } => format!("Move {} {}", source_id, position),
            Command::Update { node } => format!("Update {}", node.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum MutationResult {
    Added { id: String },
    Duplicated { ids: Vec<String> },
    Deleted { id: String },
    Moved { id: String, parent_id: String },
    Updated { id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("The root element cannot be moved, deleted or replaced")]
    RootProtected,

    #[error("Cannot drop a node onto itself")]
    SameNode,

    #[error("Cannot place a node {position} '{target}'")]
    InvalidPosition {
        position: DropPosition,
        target: String,
    },
}

/// Resolved destination of a validated move
#[derive(Debug, Clone, PartialEq)]
struct MovePlan {
    from_parent: String,
    to_parent: String,
    anchor: Anchor,
}

#[derive(Debug, Clone, PartialEq)]
enum Anchor {
    Before(String),
    After(String),
    End,
}

#[derive(Debug, Clone, Default)]
pub struct MutationEngine {
    defaults: ElementDefaults,
}

impl MutationEngine {
    pub fn new(defaults: ElementDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ElementDefaults {
        &self.defaults
    }

    pub fn apply(&self, tree: &mut ElementTree, command: &Command) -> Result<MutationResult, MutationError> {
        match command {
            Command::Add {
                parent_id,
                node_type,
                position,
                text,
                attributes,
            } => self
                .add_element(tree, parent_id, node_type, *position, text.clone(), attributes.clone())
                .map(|id| MutationResult::Added { id }),

            Command::Duplicate { id } => self
                .duplicate_element(tree, id)
                .map(|ids| MutationResult::Duplicated { ids }),

            Command::Delete { id } => self
                .delete_element(tree, id)
                .map(|_| MutationResult::Deleted { id: id.clone() }),

            Command::Move {
                source_id,
                target_id,
                position,
            } => self
                .move_element(tree, source_id, target_id, *position)
                .map(|parent_id| MutationResult::Moved {
                    id: source_id.clone(),
                    parent_id,
                }),

            Command::Update { node } => self
                .update_element(tree, node)
                .map(|_| MutationResult::Updated { id: node.id.clone() }),
        }
    }

    /// Insert a new element under `parent_id`, appending unless `position` is given.
    /// Returns the new id.
    pub fn add_element(
        &self,
        tree: &mut ElementTree,
        parent_id: &str,
        node_type: &str,
        position: Option<usize>,
        text: Option<String>,
        attributes: Option<IndexMap<String, String>>,
    ) -> Result<String, MutationError> {
        let parent = tree
            .find(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        if !accepts_children(parent) {
            return Err(MutationError::InvalidPosition {
                position: DropPosition::Inside,
                target: parent_id.to_string(),
            });
        }

        let id = tree.fresh_id();
        let mut node = self.defaults.build(id.clone(), node_type);
        if let Some(text) = text {
            node.text_content = Some(text);
        }
        for (key, value) in attributes.into_iter().flatten() {
            node.attributes.insert(key, value);
        }

        tree.edit(|root| {
            if let Some(parent) = root.find_mut(parent_id) {
                let index = position.unwrap_or(parent.children.len()).min(parent.children.len());
                parent.children.insert(index, node);
            }
        });

        debug!(node_id = %id, parent_id = %parent_id, node_type = %node_type, "Added element");
        Ok(id)
    }

    /// Clone the subtree at `id` with fresh ids and insert it right after the
    /// original. Returns the id of each inserted clone.
    pub fn duplicate_element(&self, tree: &mut ElementTree, id: &str) -> Result<Vec<String>, MutationError> {
        let original = tree
            .find(id)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        if original.is_root() {
            let mut clones = original.children.clone();
            let ids: Vec<String> = clones.iter_mut().map(|clone| relabel(tree, clone)).collect();
            tree.edit(|root| root.children.extend(clones));
            debug!(count = ids.len(), "Duplicated every top-level element");
            return Ok(ids);
        }

        let mut clone = original.clone();
        let parent_id = tree
            .parent_id(id)
            .map(str::to_string)
            .ok_or_else(|| MutationError::ParentNotFound(id.to_string()))?;
        let index = tree.index_in_parent(id).unwrap_or(0);

        let new_id = relabel(tree, &mut clone);
        tree.edit(|root| {
            if let Some(parent) = root.find_mut(&parent_id) {
                let at = (index + 1).min(parent.children.len());
                parent.children.insert(at, clone);
            }
        });

        debug!(node_id = %id, clone_id = %new_id, "Duplicated element");
        Ok(vec![new_id])
    }

    /// Remove `id` and its whole subtree
    pub fn delete_element(&self, tree: &mut ElementTree, id: &str) -> Result<(), MutationError> {
        if id == ROOT_ID {
            return Err(MutationError::RootProtected);
        }
        let parent_id = tree
            .parent_id(id)
            .map(str::to_string)
            .ok_or_else(|| MutationError::NodeNotFound(id.to_string()))?;

        tree.edit(|root| {
            if let Some(parent) = root.find_mut(&parent_id) {
                parent.children.retain(|child| child.id != id);
            }
        });

        debug!(node_id = %id, "Deleted element");
        Ok(())
    }

    /// Relocate `source_id` relative to `target_id`. Returns the new parent id.
    pub fn move_element(
        &self,
        tree: &mut ElementTree,
        source_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Result<String, MutationError> {
        let plan = plan_move(tree, source_id, target_id, position)?;

        tree.edit(|root| -> Result<(), MutationError> {
            let from = root
                .find_mut(&plan.from_parent)
                .ok_or_else(|| MutationError::ParentNotFound(plan.from_parent.clone()))?;
            let index = from
                .children
                .iter()
                .position(|child| child.id == source_id)
                .ok_or_else(|| MutationError::NodeNotFound(source_id.to_string()))?;
            let mut node = from.children.remove(index);
            node.clear_origin();

            let Some(to) = root.find_mut(&plan.to_parent) else {
                // Validated above; put the node back rather than lose it
                if let Some(from) = root.find_mut(&plan.from_parent) {
                    from.children.insert(index, node);
                }
                return Err(MutationError::ParentNotFound(plan.to_parent.clone()));
            };

            let len = to.children.len();
            let position_of = |anchor: &str| to.children.iter().position(|child| child.id == anchor);
            let at = match &plan.anchor {
                Anchor::Before(anchor) => position_of(anchor).unwrap_or(len),
                Anchor::After(anchor) => position_of(anchor).map(|i| i + 1).unwrap_or(len),
                Anchor::End => len,
            };
            to.children.insert(at, node);
            Ok(())
        })?;

        debug!(
            node_id = %source_id,
            target_id = %target_id,
            position = %position,
            parent_id = %plan.to_parent,
            "Moved element"
        );
        Ok(plan.to_parent)
    }

    /// Copy the editable fields of `node` onto the tree node with the same id
    pub fn update_element(&self, tree: &mut ElementTree, node: &ElementNode) -> Result<(), MutationError> {
        if node.id == ROOT_ID {
            return Err(MutationError::RootProtected);
        }
        let existing = tree
            .find_mut(&node.id)
            .ok_or_else(|| MutationError::NodeNotFound(node.id.clone()))?;
        existing.assign_props(node);

        debug!(node_id = %node.id, "Updated element");
        Ok(())
    }
}

fn plan_move(
    tree: &ElementTree,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> Result<MovePlan, MutationError> {
    if source_id == ROOT_ID {
        return Err(MutationError::RootProtected);
    }
    if source_id == target_id {
        return Err(MutationError::SameNode);
    }
    let from_parent = tree
        .parent_id(source_id)
        .map(str::to_string)
        .ok_or_else(|| MutationError::NodeNotFound(source_id.to_string()))?;
    let target = tree
        .find(target_id)
        .ok_or_else(|| MutationError::NodeNotFound(target_id.to_string()))?;

    let invalid = || MutationError::InvalidPosition {
        position,
        target: target_id.to_string(),
    };

    let (to_parent, anchor) = match position {
        DropPosition::Before => (
            tree.parent_id(target_id).ok_or_else(invalid)?.to_string(),
            Anchor::Before(target_id.to_string()),
        ),
        DropPosition::After => (
            tree.parent_id(target_id).ok_or_else(invalid)?.to_string(),
            Anchor::After(target_id.to_string()),
        ),
        DropPosition::Inside => {
            if !accepts_children(target) {
                return Err(invalid());
            }
            (target_id.to_string(), Anchor::End)
        }
        DropPosition::Outside => {
            let parent = tree.parent_id(target_id).ok_or_else(invalid)?;
            let grandparent = tree.parent_id(parent).ok_or_else(invalid)?;
            (grandparent.to_string(), Anchor::After(parent.to_string()))
        }
        DropPosition::Root => (ROOT_ID.to_string(), Anchor::End),
    };

    let source = source_id.to_string();
    if tree.is_descendant(source_id, target_id) || would_create_cycle(tree, &source, &to_parent) {
        return Err(MutationError::CycleDetected);
    }

    Ok(MovePlan {
        from_parent,
        to_parent,
        anchor,
    })
}

/// Text runs and raw expressions are leaves
fn accepts_children(node: &ElementNode) -> bool {
    !node.is_text_run() && !node.is_expression()
}

/// Give every node under `node` a fresh id and drop its origin. Returns the new root id.
fn relabel(tree: &mut ElementTree, node: &mut ElementNode) -> String {
    let mut relabel = Relabel {
        next_id: |_: &ElementNode| tree.fresh_id(),
    };
    relabel.visit_node_mut(node);
    node.clear_origin();
    node.id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// `root[div1[p2], div3]`
    fn sample() -> ElementTree {
        ElementTree::from_root(
            ElementNode::root()
                .with_child(ElementNode::new("div1", "div").with_child(ElementNode::new("p2", "p")))
                .with_child(ElementNode::new("div3", "div")),
        )
        .unwrap()
    }

    fn ids(node: &ElementNode) -> Vec<&str> {
        node.children.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_add_element_with_defaults() {
        let mut tree = sample();
        let engine = MutationEngine::default();

        let id = engine.add_element(&mut tree, "div3", "h2", None, None, None).unwrap();
        let node = tree.find(&id).unwrap();
        assert_eq!(node.text_content.as_deref(), Some("Heading 2"));
        assert_eq!(tree.parent_id(&id), Some("div3"));
        assert!(tree.ids_are_unique());
    }

    #[test]
    fn test_add_element_at_position_with_overrides() {
        let mut tree = sample();
        let engine = MutationEngine::default();
        let attrs = IndexMap::from([("id".to_string(), "cta".to_string())]);

        let id = engine
            .add_element(&mut tree, ROOT_ID, "button", Some(0), Some("Go".to_string()), Some(attrs))
            .unwrap();
        assert_eq!(tree.index_in_parent(&id), Some(0));
        let node = tree.find(&id).unwrap();
        assert_eq!(node.text_content.as_deref(), Some("Go"));
        assert_eq!(node.attributes["id"], "cta");
    }

    #[test]
    fn test_add_to_unknown_parent_is_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        let result = MutationEngine::default().add_element(&mut tree, "nope", "p", None, None, None);
        assert_eq!(result, Err(MutationError::ParentNotFound("nope".to_string())));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_duplicate_inserts_after_original() {
        let mut tree = sample();
        let ids_before: HashSet<String> = tree.all_ids().into_iter().collect();

        let clones = MutationEngine::default().duplicate_element(&mut tree, "div1").unwrap();
        assert_eq!(clones.len(), 1);
        assert_eq!(tree.index_in_parent(&clones[0]), Some(1));

        let clone = tree.find(&clones[0]).unwrap();
        assert_eq!(clone.children.len(), 1);
        assert!(!ids_before.contains(&clone.children[0].id));
        assert!(tree.ids_are_unique());
    }

    #[test]
    fn test_duplicate_root_duplicates_top_level() {
        let mut tree = sample();
        let clones = MutationEngine::default().duplicate_element(&mut tree, ROOT_ID).unwrap();
        assert_eq!(clones.len(), 2);
        assert_eq!(tree.root().children.len(), 4);
        assert_eq!(tree.count_nodes(), 7);
        assert!(tree.ids_are_unique());
    }

    #[test]
    fn test_delete_root_is_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        assert_eq!(
            MutationEngine::default().delete_element(&mut tree, ROOT_ID),
            Err(MutationError::RootProtected)
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let mut tree = sample();
        MutationEngine::default().delete_element(&mut tree, "div1").unwrap();
        assert!(tree.find("p2").is_none());
        assert!(!tree.contains("p2"));
        assert_eq!(ids(tree.root()), vec!["div3"]);
    }

    #[test]
    fn test_move_after_sibling_of_other_branch() {
        let mut tree = sample();
        let parent = MutationEngine::default()
            .move_element(&mut tree, "p2", "div3", DropPosition::After)
            .unwrap();
        assert_eq!(parent, ROOT_ID);
        assert_eq!(ids(tree.root()), vec!["div1", "div3", "p2"]);
        assert!(tree.find("div1").unwrap().children.is_empty());
    }

    #[test]
    fn test_move_into_descendant_is_rejected() {
        let mut tree = sample();
        let before = tree.clone();
        assert_eq!(
            MutationEngine::default().move_element(&mut tree, "div1", "p2", DropPosition::Inside),
            Err(MutationError::CycleDetected)
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn test_cycle_rule_applies_to_root_drop() {
        let mut tree = sample();
        // Target inside the moved subtree is rejected for every position
        assert_eq!(
            MutationEngine::default().move_element(&mut tree, "div1", "p2", DropPosition::Root),
            Err(MutationError::CycleDetected)
        );
    }

    #[test]
    fn test_move_outside_promotes_one_level() {
        let mut tree = sample();
        MutationEngine::default()
            .move_element(&mut tree, "div3", "p2", DropPosition::Outside)
            .unwrap();
        assert_eq!(ids(tree.root()), vec!["div1", "div3"]);

        let mut tree = ElementTree::from_root(
            ElementNode::root().with_child(
                ElementNode::new("a", "div").with_child(
                    ElementNode::new("b", "div")
                        .with_child(ElementNode::new("c", "p"))
                        .with_child(ElementNode::new("d", "p")),
                ),
            ),
        )
        .unwrap();
        MutationEngine::default()
            .move_element(&mut tree, "d", "c", DropPosition::Outside)
            .unwrap();
        assert_eq!(ids(tree.find("a").unwrap()), vec!["b", "d"]);
    }

    #[test]
    fn test_move_outside_of_top_level_is_invalid() {
        let mut tree = sample();
        assert!(matches!(
            MutationEngine::default().move_element(&mut tree, "p2", "div3", DropPosition::Outside),
            Err(MutationError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_move_guards() {
        let mut tree = sample();
        let engine = MutationEngine::default();
        assert_eq!(
            engine.move_element(&mut tree, "div1", "div1", DropPosition::Inside),
            Err(MutationError::SameNode)
        );
        assert_eq!(
            engine.move_element(&mut tree, ROOT_ID, "div1", DropPosition::Inside),
            Err(MutationError::RootProtected)
        );
        assert_eq!(
            engine.move_element(&mut tree, "ghost", "div1", DropPosition::Inside),
            Err(MutationError::NodeNotFound("ghost".to_string()))
        );
        assert!(matches!(
            engine.move_element(&mut tree, "div1", ROOT_ID, DropPosition::Before),
            Err(MutationError::InvalidPosition { .. })
        ));
    }

    #[test]
    fn test_move_before_within_same_parent() {
        let mut tree = sample();
        MutationEngine::default()
            .move_element(&mut tree, "div3", "div1", DropPosition::Before)
            .unwrap();
        assert_eq!(ids(tree.root()), vec!["div3", "div1"]);
        assert_eq!(tree.parent_id("p2"), Some("div1"));
    }

    #[test]
    fn test_update_keeps_children() {
        let mut tree = sample();
        let mut edited = tree.find("div1").unwrap().clone();
        edited.children.clear();
        edited.class_name = "flex".to_string();
        edited.node_type = "section".to_string();

        MutationEngine::default().update_element(&mut tree, &edited).unwrap();
        let node = tree.find("div1").unwrap();
        assert_eq!(node.node_type, "section");
        assert_eq!(node.class_name, "flex");
        assert_eq!(ids(node), vec!["p2"]);
    }

    #[test]
    fn test_command_json_shape() {
        let command: Command = serde_json::from_str(
            r#"{ "command": "move", "sourceId": "p2", "targetId": "div3", "position": "after" }"#,
        )
        .unwrap();
        assert_eq!(
            command,
            Command::Move {
                source_id: "p2".to_string(),
                target_id: "div3".to_string(),
                position: DropPosition::After,
            }
        );

        let add = Command::Add {
            parent_id: ROOT_ID.to_string(),
            node_type: "p".to_string(),
            position: None,
            text: None,
            attributes: None,
        };
        let json = serde_json::to_value(&add).unwrap();
        assert_eq!(json, serde_json::json!({ "command": "add", "parentId": "root", "type": "p" }));
    }
}
