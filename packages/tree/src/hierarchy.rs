//! Descendant checks shared by every parent/child structure.
//!
//! The element tree owns its children, while flat lists such as category
//! hierarchies only store a parent pointer per entry. Both answer the same
//! question before a re-parent: "is the new parent inside the subtree being
//! moved?" The walk below is the single implementation of that check.

use std::collections::HashSet;
use std::hash::Hash;

/// Anything that can enumerate the direct children of an entry
pub trait Hierarchy {
    type Id: Clone + Eq + Hash;

    fn children_of(&self, id: &Self::Id) -> Vec<Self::Id>;
}

/// Every entry strictly below `id`
pub fn descendants<H: Hierarchy>(hierarchy: &H, id: &H::Id) -> HashSet<H::Id> {
    let mut found = HashSet::new();
    let mut stack = hierarchy.children_of(id);

    while let Some(current) = stack.pop() {
        // A malformed flat list may loop back on itself.
        if current == *id || !found.insert(current.clone()) {
            continue;
        }
        stack.extend(hierarchy.children_of(&current));
    }

    found
}

pub fn is_descendant<H: Hierarchy>(hierarchy: &H, ancestor: &H::Id, candidate: &H::Id) -> bool {
    descendants(hierarchy, ancestor).contains(candidate)
}

/// Whether placing `node` under `new_parent` would make `node` its own ancestor
pub fn would_create_cycle<H: Hierarchy>(hierarchy: &H, node: &H::Id, new_parent: &H::Id) -> bool {
    node == new_parent || is_descendant(hierarchy, node, new_parent)
}

/// Parent-pointer adjacency list
#[derive(Debug, Clone, Default)]
pub struct FlatHierarchy<Id> {
    links: Vec<(Id, Option<Id>)>,
}

impl<Id: Clone + Eq + Hash> FlatHierarchy<Id> {
    pub fn new(links: Vec<(Id, Option<Id>)>) -> Self {
        Self { links }
    }

    pub fn parent_of(&self, id: &Id) -> Option<&Id> {
        self.links
            .iter()
            .find(|(entry, _)| entry == id)
            .and_then(|(_, parent)| parent.as_ref())
    }

    /// Re-parent an entry, refusing moves that would close a loop
    pub fn set_parent(&mut self, id: &Id, parent: Option<Id>) -> bool {
        if let Some(new_parent) = &parent {
            if would_create_cycle(self, id, new_parent) {
                return false;
            }
        }
        match self.links.iter_mut().find(|(entry, _)| entry == id) {
            Some((_, slot)) => {
                *slot = parent;
                true
            }
            None => false,
        }
    }
}

impl<Id: Clone + Eq + Hash> Hierarchy for FlatHierarchy<Id> {
    type Id = Id;

    fn children_of(&self, id: &Id) -> Vec<Id> {
        self.links
            .iter()
            .filter(|(_, parent)| parent.as_ref() == Some(id))
            .map(|(entry, _)| entry.clone())
            .collect()
    }
}
