use crate::style::StyleDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use trellis_tree::AnimationDescriptor;

/// Virtual DOM node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VNode {
    /// Primitive element, or the output of a component constructor
    Element {
        tag: String,
        /// Tree node this element was rendered from (for click mapping)
        #[serde(rename = "nodeId", skip_serializing_if = "Option::is_none")]
        node_id: Option<String>,
        attributes: IndexMap<String, String>,
        styles: IndexMap<String, String>,
        children: Vec<VNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        animation: Option<AnimationDescriptor>,
        /// Bumped to force a remount so a preview animation replays
        #[serde(rename = "remountKey", default, skip_serializing_if = "is_zero")]
        remount_key: u64,
    },

    /// Children without a wrapper element
    Fragment { children: Vec<VNode> },

    /// Text node
    Text { content: String },

    /// Component whose fallback compile has not finished yet
    Loading {
        #[serde(rename = "nodeId")]
        node_id: String,
    },

    /// Error node (shows the failure inline instead of crashing the render)
    Error {
        #[serde(rename = "nodeId")]
        node_id: String,
        message: String,
    },

    /// Component reference nothing can provide
    Unknown {
        #[serde(rename = "nodeId")]
        node_id: String,
        name: String,
    },
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            node_id: None,
            attributes: IndexMap::new(),
            styles: IndexMap::new(),
            children: Vec::new(),
            animation: None,
            remount_key: 0,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn error(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        VNode::Error {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element { ref mut styles, .. } = self {
            styles.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        match self {
            VNode::Element {
                ref mut children, ..
            }
            | VNode::Fragment {
                ref mut children,
            } => children.extend(new_children),
            _ => {}
        }
        self
    }

    pub fn with_node_id(mut self, id: impl Into<String>) -> Self {
        if let VNode::Element {
            node_id: ref mut nid,
            ..
        } = self
        {
            *nid = Some(id.into());
        }
        self
    }

    /// Attach an animation; only elements carry one
    pub fn with_animation(mut self, descriptor: AnimationDescriptor, key: u64) -> Self {
        if let VNode::Element {
            ref mut animation,
            ref mut remount_key,
            ..
        } = self
        {
            *animation = Some(descriptor);
            *remount_key = key;
        }
        self
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } | VNode::Fragment { children } => children,
            _ => &[],
        }
    }

    /// Tree node id this VNode stands for, if any
    pub fn node_id(&self) -> Option<&str> {
        match self {
            VNode::Element { node_id, .. } => node_id.as_deref(),
            VNode::Loading { node_id }
            | VNode::Error { node_id, .. }
            | VNode::Unknown { node_id, .. } => Some(node_id),
            VNode::Fragment { .. } | VNode::Text { .. } => None,
        }
    }

    /// Depth-first search for the first VNode rendered from `node_id`
    pub fn find_by_node_id(&self, id: &str) -> Option<&VNode> {
        if self.node_id() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find_by_node_id(id))
    }
}

/// Rendered output of a whole tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualDomDocument {
    pub nodes: Vec<VNode>,
    pub styles: Vec<StyleDescriptor>,
}

impl VirtualDomDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: VNode) {
        self.nodes.push(node);
    }

    pub fn find_by_node_id(&self, id: &str) -> Option<&VNode> {
        self.nodes.iter().find_map(|node| node.find_by_node_id(id))
    }

    /// Count of nodes matching `pred`, across the whole document
    pub fn count(&self, pred: impl Fn(&VNode) -> bool + Copy) -> usize {
        fn walk(node: &VNode, pred: impl Fn(&VNode) -> bool + Copy) -> usize {
            let own = usize::from(pred(node));
            own + node.children().iter().map(|c| walk(c, pred)).sum::<usize>()
        }
        self.nodes.iter().map(|n| walk(n, pred)).sum()
    }
}
