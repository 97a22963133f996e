use crate::node::ElementNode;

/// Visitor pattern for traversing element nodes immutably
///
/// The default implementation walks the entire subtree, parents before children.
/// Override `visit_node` to act on each node and call `walk_node` to continue.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &ElementNode) {
        walk_node(self, node);
    }
}

/// Mutable visitor pattern for transforming element nodes
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut ElementNode) {
        walk_node_mut(self, node);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &ElementNode) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut ElementNode) {
    for child in &mut node.children {
        visitor.visit_node_mut(child);
    }
}

/// Collects every id in visiting order
#[derive(Debug, Default)]
pub struct IdCollector {
    pub ids: Vec<String>,
}

impl Visitor for IdCollector {
    fn visit_node(&mut self, node: &ElementNode) {
        self.ids.push(node.id.clone());
        walk_node(self, node);
    }
}

/// Records `child id → parent id` for every edge
#[derive(Debug, Default)]
pub struct ParentCollector {
    pub edges: Vec<(String, String)>,
}

impl Visitor for ParentCollector {
    fn visit_node(&mut self, node: &ElementNode) {
        for child in &node.children {
            self.edges.push((child.id.clone(), node.id.clone()));
        }
        walk_node(self, node);
    }
}

/// Re-labels every node in a subtree through a caller-supplied generator
pub struct Relabel<F: FnMut(&ElementNode) -> String> {
    pub next_id: F,
}

impl<F: FnMut(&ElementNode) -> String> VisitorMut for Relabel<F> {
    fn visit_node_mut(&mut self, node: &mut ElementNode) {
        node.id = (self.next_id)(node);
        walk_node_mut(self, node);
    }
}
