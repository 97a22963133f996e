//! # Component Catalog
//!
//! The fast path of component resolution: a table from component name to a
//! descriptor holding its family, the class tokens it relies on and a plain
//! constructor function. Lookups are a single hash probe.
//!
//! Three families ship with [`ComponentCatalog::standard`]:
//! - icons (rendered as inline `svg` placeholders)
//! - UI widgets (rendered as their primitive element plus base classes)
//! - framework built-ins (`Fragment`, `Link`, `Image`)

use crate::vdom::VNode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trellis_tree::ElementNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentFamily {
    Icon,
    Widget,
    Builtin,
}

/// Everything a constructor gets to see of the node being rendered
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentProps {
    pub node_id: String,
    pub class_name: String,
    pub style: IndexMap<String, String>,
    pub attributes: IndexMap<String, String>,
    pub text_content: Option<String>,
}

impl ComponentProps {
    pub fn from_node(node: &ElementNode) -> Self {
        Self {
            node_id: node.id.clone(),
            class_name: node.class_name.clone(),
            style: node.style.clone(),
            attributes: node.attributes.clone(),
            text_content: node.text_content.clone(),
        }
    }

    /// Attribute with literal expressions (`{24}`, `{true}`, `{"x"}`) unwrapped
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).map(|raw| literal_value(raw))
    }
}

pub type Constructor = fn(&ComponentDescriptor, &ComponentProps, Vec<VNode>) -> VNode;

#[derive(Clone)]
pub struct ComponentDescriptor {
    pub name: String,
    pub family: ComponentFamily,
    /// Primitive element the component renders as
    pub tag: String,
    pub class_tokens: Vec<String>,
    pub construct: Constructor,
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("name", &self.name)
            .field("family", &self.family)
            .field("tag", &self.tag)
            .field("class_tokens", &self.class_tokens)
            .finish()
    }
}

impl PartialEq for ComponentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.family == other.family
            && self.tag == other.tag
            && self.class_tokens == other.class_tokens
    }
}

impl ComponentDescriptor {
    pub fn new(
        name: impl Into<String>,
        family: ComponentFamily,
        tag: impl Into<String>,
        class_tokens: &[&str],
        construct: Constructor,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            tag: tag.into(),
            class_tokens: class_tokens.iter().map(|t| t.to_string()).collect(),
            construct,
        }
    }

    pub fn instantiate(&self, props: &ComponentProps, children: Vec<VNode>) -> VNode {
        (self.construct)(self, props, children)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComponentCatalog {
    entries: HashMap<String, ComponentDescriptor>,
}

const ICONS: &[&str] = &[
    "ArrowLeft", "ArrowRight", "Bell", "Calendar", "Check", "ChevronDown", "ChevronLeft",
    "ChevronRight", "ChevronUp", "Copy", "Download", "Heart", "Home", "Info", "Mail", "Menu",
    "Minus", "Plus", "Search", "Settings", "ShoppingCart", "Star", "Trash", "Upload", "User", "X",
];

const WIDGETS: &[(&str, &str, &[&str])] = &[
    ("Button", "button", &["inline-flex", "items-center", "rounded-md", "px-4", "py-2"]),
    ("Badge", "span", &["inline-flex", "rounded-full", "px-2", "text-xs"]),
    ("Card", "div", &["rounded-lg", "border", "shadow-sm"]),
    ("CardHeader", "div", &["flex", "flex-col", "p-6"]),
    ("CardTitle", "h3", &["text-2xl", "font-semibold"]),
    ("CardDescription", "p", &["text-sm", "text-muted-foreground"]),
    ("CardContent", "div", &["p-6", "pt-0"]),
    ("CardFooter", "div", &["flex", "items-center", "p-6", "pt-0"]),
    ("Input", "input", &["h-10", "w-full", "rounded-md", "border", "px-3"]),
    ("Label", "label", &["text-sm", "font-medium"]),
    ("Separator", "hr", &["shrink-0", "bg-border"]),
    ("Avatar", "span", &["relative", "flex", "h-10", "w-10", "rounded-full"]),
];

impl ComponentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Icons, widgets and framework built-ins
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        for name in ICONS {
            catalog.register(ComponentDescriptor::new(
                *name,
                ComponentFamily::Icon,
                "svg",
                &["inline-block", "shrink-0"],
                construct_icon,
            ));
        }

        for (name, tag, tokens) in WIDGETS {
            catalog.register(ComponentDescriptor::new(
                *name,
                ComponentFamily::Widget,
                *tag,
                tokens,
                construct_primitive,
            ));
        }

        catalog.register(ComponentDescriptor::new(
            "Fragment",
            ComponentFamily::Builtin,
            "",
            &[],
            construct_fragment,
        ));
        catalog.register(ComponentDescriptor::new(
            "Link",
            ComponentFamily::Builtin,
            "a",
            &[],
            construct_primitive,
        ));
        catalog.register(ComponentDescriptor::new(
            "Image",
            ComponentFamily::Builtin,
            "img",
            &[],
            construct_primitive,
        ));

        catalog
    }

    pub fn register(&mut self, descriptor: ComponentDescriptor) {
        self.entries.insert(descriptor.name.clone(), descriptor);
    }

    pub fn lookup(&self, name: &str) -> Option<&ComponentDescriptor> {
        self.entries.get(name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ComponentDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `{24}` → `24`, `{true}` → `true`, `{"a"}` → `a`; anything else as written
pub fn literal_value(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('{').and_then(|r| r.strip_suffix('}')) else {
        return raw.to_string();
    };
    match serde_json::from_str::<serde_json::Value>(inner.trim()) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(value @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_))) => value.to_string(),
        _ => raw.to_string(),
    }
}

fn merged_class(descriptor: &ComponentDescriptor, props: &ComponentProps) -> String {
    let mut tokens: Vec<&str> = descriptor.class_tokens.iter().map(String::as_str).collect();
    tokens.extend(props.class_name.split_whitespace());
    tokens.join(" ")
}

fn base_element(descriptor: &ComponentDescriptor, props: &ComponentProps) -> VNode {
    let mut node = VNode::element(descriptor.tag.clone()).with_node_id(props.node_id.clone());
    let class = merged_class(descriptor, props);
    if !class.is_empty() {
        node = node.with_attr("class", class);
    }
    for (key, value) in &props.style {
        node = node.with_style(key.clone(), literal_value(value));
    }
    node
}

fn construct_icon(descriptor: &ComponentDescriptor, props: &ComponentProps, _children: Vec<VNode>) -> VNode {
    let size = props.attribute("size").unwrap_or_else(|| "24".to_string());
    base_element(descriptor, props)
        .with_attr("data-icon", kebab_case(&descriptor.name))
        .with_attr("width", size.clone())
        .with_attr("height", size)
        .with_attr("viewBox", "0 0 24 24")
}

fn construct_primitive(descriptor: &ComponentDescriptor, props: &ComponentProps, children: Vec<VNode>) -> VNode {
    let mut node = base_element(descriptor, props);
    for key in props.attributes.keys() {
        if let Some(value) = props.attribute(key) {
            node = node.with_attr(key.clone(), value);
        }
    }
    if let Some(text) = props.text_content.as_deref().filter(|t| !t.is_empty()) {
        node = node.with_child(VNode::text(text));
    }
    node.with_children(children)
}

fn construct_fragment(_descriptor: &ComponentDescriptor, props: &ComponentProps, children: Vec<VNode>) -> VNode {
    let mut all = Vec::with_capacity(children.len() + 1);
    if let Some(text) = props.text_content.as_deref().filter(|t| !t.is_empty()) {
        all.push(VNode::text(text));
    }
    all.extend(children);
    VNode::Fragment { children: all }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(id: &str) -> ComponentProps {
        ComponentProps::from_node(&ElementNode::new(id, "X"))
    }

    #[test]
    fn test_standard_catalog_has_all_families() {
        let catalog = ComponentCatalog::standard();
        assert_eq!(catalog.lookup("Home").map(|d| d.family), Some(ComponentFamily::Icon));
        assert_eq!(catalog.lookup("Button").map(|d| d.family), Some(ComponentFamily::Widget));
        assert_eq!(catalog.lookup("Link").map(|d| d.family), Some(ComponentFamily::Builtin));
        assert!(catalog.lookup("Nope").is_none());
    }

    #[test]
    fn test_icon_constructor() {
        let catalog = ComponentCatalog::standard();
        let mut p = props("i1");
        p.attributes.insert("size".to_string(), "{16}".to_string());

        let vnode = catalog.lookup("ShoppingCart").unwrap().instantiate(&p, Vec::new());
        match vnode {
            VNode::Element { tag, attributes, node_id, .. } => {
                assert_eq!(tag, "svg");
                assert_eq!(node_id.as_deref(), Some("i1"));
                assert_eq!(attributes.get("data-icon").map(String::as_str), Some("shopping-cart"));
                assert_eq!(attributes.get("width").map(String::as_str), Some("16"));
            }
            other => panic!("expected element, got {:?}", other),
        }
    }

    #[test]
    fn test_widget_merges_classes_and_text() {
        let catalog = ComponentCatalog::standard();
        let mut p = props("b1");
        p.class_name = "w-full".to_string();
        p.text_content = Some("Save".to_string());

        let vnode = catalog.lookup("Button").unwrap().instantiate(&p, Vec::new());
        let VNode::Element { tag, attributes, children, .. } = vnode else {
            panic!("expected element");
        };
        assert_eq!(tag, "button");
        assert!(attributes["class"].ends_with("py-2 w-full"));
        assert_eq!(children, vec![VNode::text("Save")]);
    }

    #[test]
    fn test_literal_value() {
        assert_eq!(literal_value("{24}"), "24");
        assert_eq!(literal_value("{true}"), "true");
        assert_eq!(literal_value(r#"{"x"}"#), "x");
        assert_eq!(literal_value("{handler}"), "{handler}");
        assert_eq!(literal_value("plain"), "plain");
    }
}
