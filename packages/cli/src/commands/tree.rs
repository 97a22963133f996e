use super::read_source;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use trellis_parser::parse;
use trellis_tree::{ElementNode, ElementTree};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Markup file to outline
    pub input: PathBuf,

    /// Print the element tree as JSON instead of an outline
    #[arg(long)]
    pub json: bool,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let (path, source) = read_source(&args.input, cwd)?;
    let doc = parse(&source).map_err(|e| anyhow!("{}: {}", path.display(), e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(doc.tree.root())?);
    } else {
        print!("{}", outline(&doc.tree));
    }
    Ok(())
}

/// One line per node, indented by depth: `type #id .classes "text"`
pub fn outline(tree: &ElementTree) -> String {
    let mut output = String::new();
    write_node(tree.root(), 0, &mut output);
    output
}

fn write_node(node: &ElementNode, depth: usize, output: &mut String) {
    output.push_str(&"  ".repeat(depth));
    output.push_str(&node.node_type.bold().to_string());
    output.push_str(&format!(" #{}", node.id).dimmed().to_string());

    if let Some(info) = &node.component_info {
        output.push_str(&format!(" [{}]", info.package_name).cyan().to_string());
    }
    if !node.class_name.is_empty() {
        output.push_str(&format!(" .{}", node.class_name.split_whitespace().collect::<Vec<_>>().join(".")));
    }
    if let Some(text) = &node.text_content {
        output.push_str(&format!(" {:?}", text).green().to_string());
    }
    output.push('\n');

    for child in &node.children {
        write_node(child, depth + 1, output);
    }
}
