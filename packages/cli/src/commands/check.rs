use super::read_source;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use trellis_parser::{format_error, parse};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Markup files to parse
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

/// Parse every input; report failures with source context
pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let mut failed = 0;

    for input in &args.inputs {
        let (path, source) = read_source(input, cwd)?;
        match parse(&source) {
            Ok(doc) => {
                println!(
                    "{} {} ({} nodes, {} imports)",
                    "✓".green(),
                    path.display(),
                    doc.tree.count_nodes(),
                    doc.imports.len()
                );
            }
            Err(err) => {
                failed += 1;
                println!("{} {}", "✗".red(), path.display());
                eprintln!("{}", format_error(&source, &path.display().to_string(), &err));
            }
        }
    }

    if failed > 0 {
        return Err(anyhow!(
            "{} of {} files failed to parse",
            failed,
            args.inputs.len()
        ));
    }
    Ok(())
}
