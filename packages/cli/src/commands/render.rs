use super::read_source;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use trellis_editor::{Document, VirtualDomDocument};
use trellis_evaluator::VNode;

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Markup file to render
    pub input: PathBuf,

    /// Print the first pass as-is, with placeholders for uncompiled components
    #[arg(long)]
    pub first_pass: bool,

    /// Idle budget per compile round, in milliseconds
    #[arg(long, default_value = "50")]
    pub budget_ms: u64,
}

pub fn render(args: RenderArgs, cwd: &str, config: &Config) -> Result<()> {
    let (path, source) = read_source(&args.input, cwd)?;
    let mut doc = Document::load(source).with_engine(config.engine());
    if let Some(err) = doc.parse_error() {
        eprintln!(
            "{} {} did not parse ({}), rendering raw text",
            "⚠️".yellow(),
            path.display(),
            err
        );
    }

    let vdom = if args.first_pass {
        doc.render(&config.resolver())
    } else {
        render_settled(&mut doc, config, Duration::from_millis(args.budget_ms))
    };

    println!("{}", serde_json::to_string_pretty(&vdom)?);
    Ok(())
}

/// Render, compile in idle rounds until nothing is queued, render again
pub fn render_settled(doc: &mut Document, config: &Config, budget: Duration) -> VirtualDomDocument {
    let resolver = config.resolver();
    let mut vdom = doc.render(&resolver);

    while doc.pending_compiles() > 0 {
        let report = doc.run_idle(&resolver, budget);
        debug!(
            compiled = report.outcomes.len(),
            remaining = report.remaining,
            "Idle compile round"
        );
        if report.outcomes.is_empty() {
            break;
        }
        vdom = doc.render(&resolver);
    }

    let placeholders = vdom.count(|node| matches!(node, VNode::Loading { .. }));
    debug!(placeholders, "Render settled");
    vdom
}
