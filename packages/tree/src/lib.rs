//! # Trellis Tree
//!
//! The element tree behind the visual editor: one node per markup element,
//! owned top-down through `children`, with id-based navigation in both
//! directions.
//!
//! ```rust
//! use trellis_tree::{ElementNode, ElementTree};
//!
//! let tree = ElementTree::from_root(
//!     ElementNode::root().with_child(ElementNode::new("title", "h1").with_text("Hello")),
//! )
//! .unwrap();
//!
//! assert_eq!(tree.count_nodes(), 2);
//! assert_eq!(tree.ancestor_path("title").len(), 2);
//! ```

pub mod animation;
pub mod hierarchy;
pub mod id_generator;
pub mod node;
pub mod tree;
pub mod visitor;

pub use animation::{
    AnimationConfig, AnimationDescriptor, AnimationKind, AnimationParams, AnimationPreview,
    AnimationState, AnimationTrigger, Direction, Timing, REPEAT_FOREVER,
};
pub use hierarchy::{descendants, is_descendant, would_create_cycle, FlatHierarchy, Hierarchy};
pub use id_generator::{get_seed, IDGenerator};
pub use node::{
    ComponentInfo, ElementNode, ImportType, NodeSnapshot, SourceOrigin, Span, EXPRESSION_TYPE,
    ROOT_ID, ROOT_TYPE, TEXT_TYPE,
};
pub use tree::{ElementTree, TreeError, DEFAULT_ID_SEED};
pub use visitor::{walk_node, walk_node_mut, Visitor, VisitorMut};
