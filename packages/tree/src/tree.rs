//! # Element Tree
//!
//! Owns the root sentinel and every node below it.
//!
//! Children vectors are the only ownership edges. Upward navigation goes
//! through a parent index (`child id → parent id`) that is rebuilt whenever
//! the structure changes, so nodes never hold back-pointers.
//!
//! Invariants:
//! - the root id is [`ROOT_ID`]
//! - ids are unique across the whole tree
//! - every non-root node has exactly one parent

use crate::hierarchy::{self, Hierarchy};
use crate::id_generator::IDGenerator;
use crate::node::{ElementNode, ROOT_ID};
use crate::visitor::{IdCollector, ParentCollector, Visitor};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub const DEFAULT_ID_SEED: &str = "document";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Root node must have id 'root', found '{0}'")]
    InvalidRoot(String),
}

#[derive(Debug, Clone)]
pub struct ElementTree {
    root: ElementNode,
    parents: HashMap<String, String>,
    ids: IDGenerator,
}

impl Default for ElementTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ElementTree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl ElementTree {
    /// Empty tree holding only the root sentinel
    pub fn new() -> Self {
        Self {
            root: ElementNode::root(),
            parents: HashMap::new(),
            ids: IDGenerator::new(DEFAULT_ID_SEED),
        }
    }

    /// Build a tree around an existing root, validating id uniqueness
    pub fn from_root(root: ElementNode) -> Result<Self, TreeError> {
        Self::with_generator(root, IDGenerator::new(DEFAULT_ID_SEED))
    }

    pub fn with_generator(root: ElementNode, ids: IDGenerator) -> Result<Self, TreeError> {
        if root.id != ROOT_ID {
            return Err(TreeError::InvalidRoot(root.id));
        }

        let mut collector = IdCollector::default();
        collector.visit_node(&root);
        let mut seen = HashSet::new();
        for id in collector.ids {
            if !seen.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id));
            }
        }

        let mut tree = Self {
            root,
            parents: HashMap::new(),
            ids,
        };
        tree.reindex();
        Ok(tree)
    }

    pub fn root(&self) -> &ElementNode {
        &self.root
    }

    pub fn into_root(self) -> ElementNode {
        self.root
    }

    pub fn find(&self, id: &str) -> Option<&ElementNode> {
        self.root.find(id)
    }

    /// Mutable access for property edits. Structural edits go through [`ElementTree::edit`].
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ElementNode> {
        self.root.find_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        id == ROOT_ID || self.parents.contains_key(id)
    }

    pub fn count_nodes(&self) -> usize {
        self.root.count_nodes()
    }

    pub fn parent_of(&self, id: &str) -> Option<&ElementNode> {
        self.parents.get(id).and_then(|parent| self.find(parent))
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    pub fn index_in_parent(&self, id: &str) -> Option<usize> {
        self.parent_of(id)
            .and_then(|parent| parent.children.iter().position(|child| child.id == id))
    }

    /// `[root, ..., node]`, or empty when `id` is not in the tree
    pub fn ancestor_path(&self, id: &str) -> Vec<&ElementNode> {
        if !self.contains(id) {
            return Vec::new();
        }

        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent_id(current) {
            chain.push(parent);
            current = parent;
        }

        chain.iter().rev().filter_map(|id| self.find(*id)).collect()
    }

    pub fn all_ids(&self) -> Vec<String> {
        let mut collector = IdCollector::default();
        collector.visit_node(&self.root);
        collector.ids
    }

    pub fn is_descendant(&self, ancestor: &str, candidate: &str) -> bool {
        hierarchy::is_descendant(self, &ancestor.to_string(), &candidate.to_string())
    }

    /// An id no node in the tree currently uses
    pub fn fresh_id(&mut self) -> String {
        let parents = &self.parents;
        self.ids
            .new_id_avoiding(|candidate| candidate == ROOT_ID || parents.contains_key(candidate))
    }

    /// Run a structural edit against the root, then rebuild the parent index.
    ///
    /// Callers validate before editing; the closure must leave ids unique.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut ElementNode) -> R) -> R {
        let result = f(&mut self.root);
        self.reindex();
        debug_assert!(self.ids_are_unique(), "structural edit duplicated an id");
        result
    }

    pub fn ids_are_unique(&self) -> bool {
        let ids = self.all_ids();
        let unique: HashSet<&String> = ids.iter().collect();
        unique.len() == ids.len()
    }

    fn reindex(&mut self) {
        let mut collector = ParentCollector::default();
        collector.visit_node(&self.root);
        self.parents = collector.edges.into_iter().collect();
    }
}

impl Hierarchy for ElementTree {
    type Id = String;

    fn children_of(&self, id: &String) -> Vec<String> {
        self.find(id).map(ElementNode::child_ids).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ElementTree {
        ElementTree::from_root(
            ElementNode::root()
                .with_child(ElementNode::new("div1", "div").with_child(ElementNode::new("p2", "p")))
                .with_child(ElementNode::new("div3", "div")),
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let root = ElementNode::root()
            .with_child(ElementNode::new("a", "div"))
            .with_child(ElementNode::new("a", "p"));
        assert_eq!(
            ElementTree::from_root(root),
            Err(TreeError::DuplicateId("a".to_string()))
        );
    }

    #[test]
    fn test_rejects_wrong_root() {
        let result = ElementTree::from_root(ElementNode::new("a", "div"));
        assert!(matches!(result, Err(TreeError::InvalidRoot(_))));
    }

    #[test]
    fn test_ancestor_path() {
        let tree = sample();
        let path: Vec<&str> = tree.ancestor_path("p2").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(path, vec!["root", "div1", "p2"]);

        let root_path: Vec<&str> = tree.ancestor_path(ROOT_ID).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(root_path, vec!["root"]);

        assert!(tree.ancestor_path("missing").is_empty());
    }

    #[test]
    fn test_parent_navigation() {
        let tree = sample();
        assert_eq!(tree.parent_of("p2").map(|n| n.id.as_str()), Some("div1"));
        assert_eq!(tree.index_in_parent("div3"), Some(1));
        assert!(tree.parent_of(ROOT_ID).is_none());
    }

    #[test]
    fn test_is_descendant() {
        let tree = sample();
        assert!(tree.is_descendant("div1", "p2"));
        assert!(tree.is_descendant(ROOT_ID, "p2"));
        assert!(!tree.is_descendant("p2", "div1"));
        assert!(!tree.is_descendant("div3", "p2"));
    }

    #[test]
    fn test_fresh_id_is_unique() {
        let mut tree = sample();
        let mut seen = HashSet::new();
        for _ in 0..10 {
            let id = tree.fresh_id();
            assert!(!tree.contains(&id));
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn test_edit_reindexes() {
        let mut tree = sample();
        tree.edit(|root| {
            let moved = root.children[0].children.remove(0);
            root.children.push(moved);
        });
        assert_eq!(tree.parent_id("p2"), Some(ROOT_ID));
        assert_eq!(tree.count_nodes(), 4);
    }
}
