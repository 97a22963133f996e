use super::read_source;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use trellis_editor::{DispatchOutcome, Document, DropPosition};

#[derive(Args, Debug)]
pub struct DropArgs {
    /// Markup file to edit
    pub input: PathBuf,

    /// Id of the dragged node (see `trellis tree`)
    #[arg(long)]
    pub source: String,

    /// Id of the node under the pointer
    #[arg(long)]
    pub target: String,

    /// Pointer offset from the target's left edge
    #[arg(long)]
    pub x: f64,

    /// Pointer offset from the target's top edge
    #[arg(long)]
    pub y: f64,

    /// Target box width
    #[arg(long)]
    pub width: f64,

    /// Target box height
    #[arg(long)]
    pub height: f64,

    /// Write the result back to the input file
    #[arg(short, long)]
    pub write: bool,
}

/// Replay a drag-and-drop gesture: infer the position from the pointer, then move
pub fn drop_at(args: DropArgs, cwd: &str, config: &Config) -> Result<()> {
    let (path, source) = read_source(&args.input, cwd)?;
    let mut doc = Document::load(source).with_engine(config.engine());

    let position = config
        .drop_zones
        .infer(args.x, args.y, args.width, args.height);
    let outcome = move_to(&mut doc, &args.source, &args.target, position)?;

    match outcome {
        DispatchOutcome::Applied(_) => {
            eprintln!("{} Moved {} {} {}", "✓".green(), args.source, position, args.target);
        }
        DispatchOutcome::Rejected(reason) => {
            return Err(anyhow!("Drop rejected: {}", reason));
        }
    }

    let output = doc.save();
    if args.write {
        std::fs::write(&path, &output)?;
        eprintln!("   Wrote {}", path.display());
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn move_to(doc: &mut Document, source: &str, target: &str, position: DropPosition) -> Result<DispatchOutcome> {
    if !doc.is_structured() {
        return Err(anyhow!("Source did not parse; drops are disabled"));
    }
    Ok(doc.move_element(source, target, position)?)
}
