use super::read_source;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use trellis_parser::{parse, print, regenerate};

#[derive(Args, Debug)]
pub struct RoundtripArgs {
    /// Markup files to parse and regenerate
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Compare against a fresh pretty-print instead of the patched source
    #[arg(long)]
    pub pretty: bool,
}

/// Parse, regenerate, and verify the output matches the input byte for byte
pub fn roundtrip(args: RoundtripArgs, cwd: &str) -> Result<()> {
    let mut mismatched = 0;

    for input in &args.inputs {
        let (path, source) = read_source(input, cwd)?;
        let doc = parse(&source).map_err(|e| anyhow!("{}: {}", path.display(), e))?;
        let output = if args.pretty {
            print(&doc.tree)
        } else {
            regenerate(&doc.tree, &source)
        };

        match first_difference(&source, &output) {
            None => println!("{} {}", "✓".green(), path.display()),
            Some((line, expected, found)) => {
                mismatched += 1;
                println!("{} {} differs at line {}", "✗".red(), path.display(), line);
                println!("   {} {}", "-".red(), expected);
                println!("   {} {}", "+".green(), found);
            }
        }
    }

    if mismatched > 0 {
        return Err(anyhow!("{} files did not round-trip", mismatched));
    }
    Ok(())
}

/// 1-based line number and the two differing lines, if any
pub fn first_difference(expected: &str, found: &str) -> Option<(usize, String, String)> {
    if expected == found {
        return None;
    }

    let mut left = expected.split('\n');
    let mut right = found.split('\n');
    let mut line = 1;
    loop {
        match (left.next(), right.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (a, b) => {
                return Some((
                    line,
                    a.unwrap_or("<end of input>").to_string(),
                    b.unwrap_or("<end of output>").to_string(),
                ))
            }
        }
    }
}
