//! # Renderer
//!
//! Walks an [`ElementTree`] and produces a [`VirtualDomDocument`].
//!
//! Primitive elements map one-to-one onto [`VNode::Element`]. Component
//! references go through [`ComponentResolver`]:
//! - catalog hit from an allowed package: constructed directly
//! - nothing imported and not a built-in: [`VNode::Unknown`]
//! - anything else: the cached plan if there is one, otherwise a queued
//!   compile and a [`VNode::Loading`] placeholder
//!
//! Failures stay local to the node that caused them.

use crate::cache::{cache_key, ComponentCache};
use crate::catalog::{literal_value, ComponentProps};
use crate::compiler::PlanNode;
use crate::environment::Environment;
use crate::scheduler::{CompileJob, IdleScheduler};
use crate::style::StyleCollector;
use crate::vdom::{VNode, VirtualDomDocument};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use trellis_tree::{AnimationPreview, AnimationState, ElementNode, ElementTree, EXPRESSION_TYPE, TEXT_TYPE};

/// Resolves component references against an allow-list environment
#[derive(Debug, Clone)]
pub struct ComponentResolver {
    env: Arc<Environment>,
    cache: Arc<ComponentCache>,
}

impl Default for ComponentResolver {
    fn default() -> Self {
        Self::new(Environment::standard())
    }
}

impl ComponentResolver {
    /// Resolver backed by the process-wide cache
    pub fn new(env: Environment) -> Self {
        Self::with_cache(env, ComponentCache::global())
    }

    pub fn with_cache(env: Environment, cache: Arc<ComponentCache>) -> Self {
        Self {
            env: Arc::new(env),
            cache,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn shared_env(&self) -> Arc<Environment> {
        self.env.clone()
    }

    pub fn cache(&self) -> &Arc<ComponentCache> {
        &self.cache
    }

    /// Render one component node; `children` are its already-rendered children
    pub fn resolve(
        &self,
        node: &ElementNode,
        children: Vec<VNode>,
        scheduler: &mut IdleScheduler,
        styles: &mut StyleCollector,
    ) -> VNode {
        let Some(info) = node.component_info.as_ref().filter(|info| info.is_component) else {
            return unknown(node);
        };

        if let Some(descriptor) = self.env.lookup_direct(info) {
            if !node.node_type.contains('.') {
                debug!(node_id = %node.id, component = %descriptor.name, "Resolved from catalog");
                styles.record(descriptor);
                return descriptor.instantiate(&ComponentProps::from_node(node), children);
            }
        } else if info.package_name.is_empty() {
            debug!(node_id = %node.id, name = %node.node_type, "Unknown component");
            return unknown(node);
        }

        let key = cache_key(node);
        match self.cache.get(&key) {
            Some(Ok(plan)) => {
                record_plan_styles(&plan.root, styles);
                plan.execute(&node.id, children)
            }
            Some(Err(e)) => {
                debug!(node_id = %node.id, error = %e, "Rendering cached compile error");
                VNode::error(node.id.clone(), e.to_string())
            }
            None => {
                scheduler.enqueue(CompileJob::new(node));
                VNode::Loading {
                    node_id: node.id.clone(),
                }
            }
        }
    }
}

fn unknown(node: &ElementNode) -> VNode {
    VNode::Unknown {
        node_id: node.id.clone(),
        name: node.node_type.clone(),
    }
}

fn record_plan_styles(plan: &PlanNode, styles: &mut StyleCollector) {
    match plan {
        PlanNode::Component {
            descriptor,
            children,
            ..
        } => {
            styles.record(descriptor);
            for child in children {
                record_plan_styles(child, styles);
            }
        }
        PlanNode::Primitive { children, .. } => {
            for child in children {
                record_plan_styles(child, styles);
            }
        }
        PlanNode::Text(_) | PlanNode::Expression(_) | PlanNode::Slot => {}
    }
}

pub struct Renderer<'a> {
    resolver: &'a ComponentResolver,
    scheduler: &'a mut IdleScheduler,
    previews: Option<&'a HashMap<String, AnimationPreview>>,
    styles: StyleCollector,
}

impl<'a> Renderer<'a> {
    pub fn new(resolver: &'a ComponentResolver, scheduler: &'a mut IdleScheduler) -> Self {
        Self {
            resolver,
            scheduler,
            previews: None,
            styles: StyleCollector::new(),
        }
    }

    /// Preview counters; a node's counter becomes its VNode remount key
    pub fn with_previews(mut self, previews: &'a HashMap<String, AnimationPreview>) -> Self {
        self.previews = Some(previews);
        self
    }

    #[instrument(skip(self, tree), fields(nodes = tree.count_nodes()))]
    pub fn render(mut self, tree: &ElementTree) -> VirtualDomDocument {
        info!("Starting tree render");

        let mut vdoc = VirtualDomDocument::new();
        for child in &tree.root().children {
            let vnode = self.render_node(child);
            vdoc.add_node(vnode);
        }
        vdoc.styles = self.styles.finish();

        info!(
            nodes = vdoc.nodes.len(),
            styles = vdoc.styles.len(),
            queued = self.scheduler.len(),
            "Tree render complete"
        );
        vdoc
    }

    pub fn render_node(&mut self, node: &ElementNode) -> VNode {
        match node.node_type.as_str() {
            TEXT_TYPE => return VNode::text(node.text_content.clone().unwrap_or_default()),
            EXPRESSION_TYPE => {
                return VNode::text(format!("{{{}}}", node.text_content.as_deref().unwrap_or("")))
            }
            _ => {}
        }

        let children: Vec<VNode> = node.children.iter().map(|c| self.render_node(c)).collect();

        let vnode = if node.is_component() {
            self.resolver
                .resolve(node, children, self.scheduler, &mut self.styles)
        } else {
            primitive(node, children)
        };

        self.apply_animation(node, vnode)
    }

    fn apply_animation(&self, node: &ElementNode, vnode: VNode) -> VNode {
        let Some(config) = &node.animations else {
            return vnode;
        };
        match config.state() {
            AnimationState::Enabled(descriptor) => {
                let key = self
                    .previews
                    .and_then(|previews| previews.get(&node.id))
                    .map(AnimationPreview::remount_key)
                    .unwrap_or(0);
                vnode.with_animation(descriptor, key)
            }
            AnimationState::Disabled => vnode,
        }
    }
}

fn primitive(node: &ElementNode, children: Vec<VNode>) -> VNode {
    let mut vnode = VNode::element(node.node_type.clone()).with_node_id(node.id.clone());
    if !node.class_name.is_empty() {
        vnode = vnode.with_attr("class", node.class_name.clone());
    }
    for (key, value) in &node.style {
        vnode = vnode.with_style(key.clone(), literal_value(value));
    }
    for (key, value) in &node.attributes {
        vnode = vnode.with_attr(key.clone(), literal_value(value));
    }
    if let Some(text) = node.text_content.as_deref().filter(|t| !t.is_empty()) {
        vnode = vnode.with_child(VNode::text(text));
    }
    vnode.with_children(children)
}

/// Render `tree` with a fresh style collector and no animation previews
pub fn render_tree(
    tree: &ElementTree,
    resolver: &ComponentResolver,
    scheduler: &mut IdleScheduler,
) -> VirtualDomDocument {
    Renderer::new(resolver, scheduler).render(tree)
}
