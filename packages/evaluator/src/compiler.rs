//! # Snippet Compiler
//!
//! Fallback resolution for component references the catalog cannot answer
//! directly: namespaced members, compound names, aliased imports.
//!
//! 1. synthesize a minimal markup snippet for the node (its import plus the
//!    element itself, with a `{children}` slot standing in for live children)
//! 2. parse the snippet and lower it to a [`RenderPlan`], resolving every name
//!    through the [`Environment`] allow-list only
//! 3. the plan is cached by content and executed on every render
//!
//! Children are not part of the plan. They are rendered live and passed in at
//! execution, so editing them never invalidates a compiled plan.

use crate::catalog::{ComponentDescriptor, ComponentProps};
use crate::environment::{is_html_tag, Environment};
use crate::vdom::VNode;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::debug;
use trellis_parser::{parse, ParseError, Serializer};
use trellis_tree::{ElementNode, ImportType, EXPRESSION_TYPE, TEXT_TYPE};

/// Expression that marks where live children go
pub const CHILDREN_SLOT: &str = "children";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Snippet failed to parse: {0}")]
    Parse(#[from] ParseError),

    #[error("Package '{package}' is not in the allowed module list")]
    PackageNotAllowed { package: String },

    #[error("'{name}' is not provided by '{package}'")]
    NameNotAllowed { name: String, package: String },

    #[error("Tag '{tag}' is neither a primitive element nor a component")]
    UnknownTag { tag: String },

    #[error("Snippet produced no element")]
    EmptySnippet,
}

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    Primitive {
        tag: String,
        props: ComponentProps,
        children: Vec<PlanNode>,
    },
    Component {
        descriptor: ComponentDescriptor,
        props: ComponentProps,
        children: Vec<PlanNode>,
    },
    Text(String),
    /// Raw expression, shown as written
    Expression(String),
    /// Where the live children are inserted
    Slot,
}

/// Compiled, cacheable form of one component reference
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub root: PlanNode,
}

impl RenderPlan {
    /// Instantiate the plan. `node_id` re-targets the output at the node being
    /// rendered; `children` fill the slot.
    pub fn execute(&self, node_id: &str, children: Vec<VNode>) -> VNode {
        let mut children = Some(children);
        execute_node(&self.root, node_id, &mut children)
    }
}

fn execute_node(plan: &PlanNode, node_id: &str, children: &mut Option<Vec<VNode>>) -> VNode {
    match plan {
        PlanNode::Primitive {
            tag,
            props,
            children: plan_children,
        } => {
            let mut node = VNode::element(tag.clone()).with_node_id(node_id);
            if !props.class_name.is_empty() {
                node = node.with_attr("class", props.class_name.clone());
            }
            for (key, value) in &props.style {
                node = node.with_style(key.clone(), value.clone());
            }
            for key in props.attributes.keys() {
                if let Some(value) = props.attribute(key) {
                    node = node.with_attr(key.clone(), value);
                }
            }
            let rendered = execute_children(plan_children, node_id, children);
            node.with_children(rendered)
        }
        PlanNode::Component {
            descriptor,
            props,
            children: plan_children,
        } => {
            let mut props = props.clone();
            props.node_id = node_id.to_string();
            let rendered = execute_children(plan_children, node_id, children);
            descriptor.instantiate(&props, rendered)
        }
        PlanNode::Text(text) => VNode::text(text.clone()),
        PlanNode::Expression(raw) => VNode::text(format!("{{{}}}", raw)),
        PlanNode::Slot => VNode::Fragment {
            children: children.take().unwrap_or_default(),
        },
    }
}

fn execute_children(
    plan_children: &[PlanNode],
    node_id: &str,
    children: &mut Option<Vec<VNode>>,
) -> Vec<VNode> {
    let mut rendered = Vec::new();
    for child in plan_children {
        match execute_node(child, node_id, children) {
            // Splice the slot's children in place
            VNode::Fragment { children: inner } if matches!(child, PlanNode::Slot) => {
                rendered.extend(inner)
            }
            vnode => rendered.push(vnode),
        }
    }
    rendered
}

/// Build the markup snippet that stands for `node`
pub fn synthesize_snippet(node: &ElementNode) -> String {
    let mut snippet = String::new();

    if let Some(info) = node.component_info.as_ref().filter(|i| !i.package_name.is_empty()) {
        let local = node.node_type.split('.').next().unwrap_or(&node.node_type);
        let line = match info.import_type {
            ImportType::Named => {
                let imported = info.import_name.split('.').next().unwrap_or(&info.import_name);
                if imported == local {
                    format!("import {{ {} }} from \"{}\";\n", local, info.package_name)
                } else {
                    format!("import {{ {} as {} }} from \"{}\";\n", imported, local, info.package_name)
                }
            }
            ImportType::Default => format!("import {} from \"{}\";\n", local, info.package_name),
            ImportType::Namespace => format!("import * as {} from \"{}\";\n", local, info.package_name),
        };
        snippet.push_str(&line);
    }

    let mut template = node.clone();
    template.clear_origin();
    template.children.clear();
    if !node.children.is_empty() {
        template
            .children
            .push(ElementNode::new("slot", EXPRESSION_TYPE).with_text(CHILDREN_SLOT));
    }

    Serializer::new().serialize_node(&template, &mut snippet);
    snippet
}

/// Compile one component node into a plan, resolving names through `env`
pub fn compile(node: &ElementNode, env: &Environment) -> CompileResult<RenderPlan> {
    let snippet = synthesize_snippet(node);
    debug!(node_id = %node.id, snippet_len = snippet.len(), "Compiling component snippet");

    let doc = parse(&snippet)?;
    let element = doc
        .tree
        .root()
        .children
        .first()
        .ok_or(CompileError::EmptySnippet)?;

    Ok(RenderPlan {
        root: lower(element, env)?,
    })
}

fn lower(node: &ElementNode, env: &Environment) -> CompileResult<PlanNode> {
    match node.node_type.as_str() {
        TEXT_TYPE => {
            return Ok(PlanNode::Text(node.text_content.clone().unwrap_or_default()));
        }
        EXPRESSION_TYPE => {
            let raw = node.text_content.clone().unwrap_or_default();
            return Ok(if raw.trim() == CHILDREN_SLOT {
                PlanNode::Slot
            } else {
                PlanNode::Expression(raw)
            });
        }
        _ => {}
    }

    let props = ComponentProps {
        node_id: node.id.clone(),
        class_name: node.class_name.clone(),
        style: node.style.clone(),
        attributes: node.attributes.clone(),
        text_content: node.text_content.clone(),
    };

    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        children.push(lower(child, env)?);
    }

    if let Some(info) = node.component_info.as_ref().filter(|i| i.is_component) {
        let descriptor = env.resolve_component(info)?.clone();
        return Ok(PlanNode::Component {
            descriptor,
            props,
            children,
        });
    }

    if !is_html_tag(&node.node_type) {
        return Err(CompileError::UnknownTag {
            tag: node.node_type.clone(),
        });
    }

    if let Some(text) = props.text_content.clone().filter(|t| !t.is_empty()) {
        children.insert(0, PlanNode::Text(text));
    }

    Ok(PlanNode::Primitive {
        tag: node.node_type.clone(),
        props: ComponentProps {
            style: resolve_styles(&props.style),
            ..props
        },
        children,
    })
}

fn resolve_styles(style: &IndexMap<String, String>) -> IndexMap<String, String> {
    style
        .iter()
        .map(|(k, v)| (k.clone(), crate::catalog::literal_value(v)))
        .collect()
}
