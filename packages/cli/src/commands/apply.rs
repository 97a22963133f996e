use super::read_source;
use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use trellis_editor::{Command, DispatchOutcome, Document, PendingEdit};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Markup file to edit
    pub input: PathBuf,

    /// JSON file holding the commands to apply
    #[arg(short, long)]
    pub commands: PathBuf,

    /// Write the result back to the input file
    #[arg(short, long)]
    pub write: bool,

    /// Write the result to this file instead
    #[arg(short, long, conflicts_with = "write")]
    pub output: Option<PathBuf>,
}

/// A command file: either a bare list of commands or commands plus property edits
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Script {
    Commands(Vec<Command>),
    Full {
        #[serde(default)]
        commands: Vec<Command>,
        #[serde(default)]
        edits: Vec<PendingEdit>,
    },
}

impl Script {
    fn into_parts(self) -> (Vec<Command>, Vec<PendingEdit>) {
        match self {
            Script::Commands(commands) => (commands, Vec::new()),
            Script::Full { commands, edits } => (commands, edits),
        }
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct ApplySummary {
    pub applied: usize,
    pub rejected: usize,
    pub edits: usize,
}

pub fn apply(args: ApplyArgs, cwd: &str, config: &Config) -> Result<()> {
    let (path, source) = read_source(&args.input, cwd)?;
    let (_, script) = read_source(&args.commands, cwd)?;
    let script: Script = serde_json::from_str(&script)?;

    let mut doc = Document::load(source)
        .with_engine(config.engine())
        .with_undo_levels(config.undo_levels);
    if let Some(err) = doc.parse_error() {
        return Err(anyhow!("{} did not parse: {}", path.display(), err));
    }

    let summary = run_script(&mut doc, script, config)?;
    let output = doc.save();

    eprintln!();
    eprintln!(
        "✨ {} {} applied, {} rejected, {} edits",
        "Done".green().bold(),
        summary.applied,
        summary.rejected,
        summary.edits
    );

    let target = match (&args.output, args.write) {
        (Some(out), _) => Some(PathBuf::from(cwd).join(out)),
        (None, true) => Some(path),
        (None, false) => None,
    };
    match target {
        Some(target) => {
            std::fs::write(&target, &output)?;
            eprintln!("   Wrote {}", target.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Dispatch every command, then stage the edits and flush them as one step.
/// Progress goes to stderr; stdout is reserved for the regenerated source.
pub fn run_script(doc: &mut Document, script: Script, config: &Config) -> Result<ApplySummary> {
    let (commands, edits) = script.into_parts();
    let mut summary = ApplySummary::default();

    for command in commands {
        let label = command.describe();
        match doc.dispatch(command)? {
            DispatchOutcome::Applied(_) => {
                summary.applied += 1;
                eprintln!("{} {}", "✓".green(), label);
            }
            DispatchOutcome::Rejected(reason) => {
                summary.rejected += 1;
                eprintln!("{} {}: {}", "✗".red(), label, reason);
            }
        }
    }

    if !edits.is_empty() {
        let mut pending = config.pending_edits();
        let now = Instant::now();
        for edit in edits {
            pending.stage(edit.key, edit.value, now);
        }
        summary.edits = doc.commit_edits(pending.flush_all())?;
    }

    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        edits = summary.edits,
        "Script applied"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_command_list() {
        let json = r#"[{ "command": "delete", "id": "x" }]"#;
        let (commands, edits) = serde_json::from_str::<Script>(json).unwrap().into_parts();
        assert_eq!(commands.len(), 1);
        assert!(edits.is_empty());
    }

    #[test]
    fn test_script_with_edits() {
        let mut doc = Document::load("<section><h1>Old</h1></section>");
        let heading = doc.tree().unwrap().root().children[0].children[0].id.clone();
        let json = format!(
            r#"{{
                "commands": [{{ "command": "delete", "id": "missing" }}],
                "edits": [{{ "key": {{ "nodeId": "{}", "field": {{ "field": "text" }} }}, "value": "New" }}]
            }}"#,
            heading
        );

        let script: Script = serde_json::from_str(&json).unwrap();
        let summary = run_script(&mut doc, script, &Config::default()).unwrap();
        assert_eq!(
            summary,
            ApplySummary {
                applied: 0,
                rejected: 1,
                edits: 1
            }
        );
        assert!(doc.save().contains("<h1>New</h1>"));
    }
}
