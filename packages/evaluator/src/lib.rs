//! # Trellis Evaluator
//!
//! Renders an element tree into a virtual DOM and resolves the component
//! references it contains.
//!
//! ## Resolution
//!
//! Every component is resolved against an [`Environment`]: the
//! [`ComponentCatalog`] of known components and the [`ModuleResolver`] of
//! allowed packages. Nothing else is reachable.
//!
//! - **Fast path**: a plain name from an allowed package is a hash lookup
//!   followed by a constructor call.
//! - **Fallback**: namespaced and compound references are compiled from a
//!   synthesized snippet into a [`RenderPlan`], cached process-wide by a
//!   content hash, and executed on later renders. Compiles are deferred to
//!   the [`IdleScheduler`] so a render pass never blocks on them.
//!
//! ## Failure containment
//!
//! A node that cannot be resolved renders as [`VNode::Error`] or
//! [`VNode::Unknown`] in place; the rest of the tree is unaffected.
//!
//! ## Usage
//!
//! ```rust
//! use trellis_evaluator::{render_tree, ComponentResolver, IdleScheduler};
//! use trellis_parser::parse;
//!
//! let doc = parse(r#"import { Button } from "@/components/ui";
//! <Button>Save</Button>"#).unwrap();
//!
//! let resolver = ComponentResolver::default();
//! let mut scheduler = IdleScheduler::new();
//! let vdom = render_tree(&doc.tree, &resolver, &mut scheduler);
//! assert_eq!(vdom.nodes.len(), 1);
//! ```

pub mod cache;
pub mod catalog;
pub mod compiler;
pub mod environment;
pub mod renderer;
pub mod scheduler;
pub mod style;
pub mod vdom;

pub use cache::{cache_key, ComponentCache};
pub use catalog::{ComponentCatalog, ComponentDescriptor, ComponentFamily, ComponentProps};
pub use compiler::{compile, synthesize_snippet, CompileError, PlanNode, RenderPlan};
pub use environment::{is_html_tag, Environment, ModuleResolver};
pub use renderer::{render_tree, ComponentResolver, Renderer};
#[cfg(feature = "async")]
pub use scheduler::BackgroundCompiler;
pub use scheduler::{CompileJob, IdleReport, IdleScheduler, JobOutcome};
pub use style::{StyleCollector, StyleDescriptor};
pub use vdom::{VNode, VirtualDomDocument};
