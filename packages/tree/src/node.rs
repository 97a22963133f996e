use crate::animation::AnimationConfig;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Reserved id of the root sentinel
pub const ROOT_ID: &str = "root";

/// Node type of the root sentinel
pub const ROOT_TYPE: &str = "#root";

/// Node type of a text run interleaved with elements
pub const TEXT_TYPE: &str = "#text";

/// Node type of a raw `{...}` child expression
pub const EXPRESSION_TYPE: &str = "#expression";

/// Byte range into the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Re-base this span so it is relative to `outer`
    pub fn relative_to(&self, outer: &Span) -> Span {
        Span::new(self.start - outer.start, self.end - outer.start)
    }
}

/// How a component reference was imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    Named,
    Default,
    Namespace,
}

/// Marks a node as a reference to an externally supplied building block
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub is_component: bool,
    pub package_name: String,
    pub import_name: String,
    pub import_type: ImportType,
}

impl ComponentInfo {
    pub fn named(package_name: impl Into<String>, import_name: impl Into<String>) -> Self {
        Self {
            is_component: true,
            package_name: package_name.into(),
            import_name: import_name.into(),
            import_type: ImportType::Named,
        }
    }
}

/// Editable fields of a node as they were at parse time
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSnapshot {
    pub node_type: String,
    pub class_name: String,
    pub style: IndexMap<String, String>,
    pub attributes: IndexMap<String, String>,
    pub text_content: Option<String>,
    pub animations: Option<AnimationConfig>,
    pub child_ids: Vec<String>,
}

/// Where a node came from in the original source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceOrigin {
    /// Whole element, open tag to close tag
    pub span: Span,
    /// `<tag ...>` (or the whole element when self-closing)
    pub open_tag: Span,
    /// Between the open and close tag; `None` when self-closing
    pub content: Option<Span>,
    /// Verbatim `source[span]`
    pub fragment: String,
    pub snapshot: NodeSnapshot,
}

impl SourceOrigin {
    pub fn is_self_closing(&self) -> bool {
        self.content.is_none()
    }
}

/// One entry of the element tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub style: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_info: Option<ComponentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animations: Option<AnimationConfig>,
    #[serde(skip)]
    pub source: Option<SourceOrigin>,
}

impl ElementNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            class_name: String::new(),
            style: IndexMap::new(),
            attributes: IndexMap::new(),
            text_content: None,
            children: Vec::new(),
            component_info: None,
            animations: None,
            source: None,
        }
    }

    /// The root sentinel
    pub fn root() -> Self {
        Self::new(ROOT_ID, ROOT_TYPE)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_content = Some(text.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_component(mut self, info: ComponentInfo) -> Self {
        self.component_info = Some(info);
        self
    }

    pub fn with_animations(mut self, animations: AnimationConfig) -> Self {
        self.animations = Some(animations);
        self
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }

    pub fn is_text_run(&self) -> bool {
        self.node_type == TEXT_TYPE
    }

    pub fn is_expression(&self) -> bool {
        self.node_type == EXPRESSION_TYPE
    }

    pub fn is_component(&self) -> bool {
        self.component_info
            .as_ref()
            .map(|info| info.is_component)
            .unwrap_or(false)
    }

    /// The node itself plus all of its descendants
    pub fn count_nodes(&self) -> usize {
        1 + self.children.iter().map(ElementNode::count_nodes).sum::<usize>()
    }

    /// Depth-first search, children in order
    pub fn find(&self, id: &str) -> Option<&ElementNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ElementNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub fn child_ids(&self) -> Vec<String> {
        self.children.iter().map(|c| c.id.clone()).collect()
    }

    pub fn original_source_fragment(&self) -> Option<&str> {
        self.source.as_ref().map(|origin| origin.fragment.as_str())
    }

    /// Capture the current editable state
    pub fn snapshot(&self) -> NodeSnapshot {
        NodeSnapshot {
            node_type: self.node_type.clone(),
            class_name: self.class_name.clone(),
            style: self.style.clone(),
            attributes: self.attributes.clone(),
            text_content: self.text_content.clone(),
            animations: self.animations.clone(),
            child_ids: self.child_ids(),
        }
    }

    /// Whether class, style, attributes, text or animations differ from parse time.
    /// Nodes without an origin always count as changed.
    pub fn props_changed(&self) -> bool {
        match &self.source {
            Some(origin) => {
                let before = &origin.snapshot;
                before.class_name != self.class_name
                    || before.style != self.style
                    || before.attributes != self.attributes
                    || before.animations != self.animations
            }
            None => true,
        }
    }

    pub fn text_changed(&self) -> bool {
        match &self.source {
            Some(origin) => origin.snapshot.text_content != self.text_content,
            None => true,
        }
    }

    /// Whether the list of direct children was reordered, grown or shrunk
    pub fn children_changed(&self) -> bool {
        match &self.source {
            Some(origin) => {
                origin.snapshot.child_ids.len() != self.children.len()
                    || origin
                        .snapshot
                        .child_ids
                        .iter()
                        .zip(&self.children)
                        .any(|(before, child)| *before != child.id)
            }
            None => true,
        }
    }

    /// Copy editable fields from `other`, keeping id, children and origin
    pub fn assign_props(&mut self, other: &ElementNode) {
        self.node_type = other.node_type.clone();
        self.class_name = other.class_name.clone();
        self.style = other.style.clone();
        self.attributes = other.attributes.clone();
        self.text_content = other.text_content.clone();
        self.component_info = other.component_info.clone();
        self.animations = other.animations.clone();
    }

    /// Forget where this subtree came from so it is fully re-printed
    pub fn clear_origin(&mut self) {
        self.source = None;
        for child in &mut self.children {
            child.clear_origin();
        }
    }
}
