mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, check, drop_at, render, roundtrip, tree, ApplyArgs, CheckArgs, DropArgs, RenderArgs,
    RoundtripArgs, TreeArgs,
};
use config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(about = "Trellis - structural editing for component markup", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to trellis.config.json in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse files and report syntax errors
    Check(CheckArgs),

    /// Print the element tree of a file
    Tree(TreeArgs),

    /// Verify that parse + regenerate reproduces the source
    Roundtrip(RoundtripArgs),

    /// Render a file to the virtual DOM as JSON
    Render(RenderArgs),

    /// Apply JSON editing commands to a file
    Apply(ApplyArgs),

    /// Move a node by replaying a pointer drop
    Drop(DropArgs),
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, cwd: &str) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(cwd)?,
    };

    match cli.command {
        Command::Check(args) => check(args, cwd),
        Command::Tree(args) => tree(args, cwd),
        Command::Roundtrip(args) => roundtrip(args, cwd),
        Command::Render(args) => render(args, cwd, &config),
        Command::Apply(args) => apply(args, cwd, &config),
        Command::Drop(args) => drop_at(args, cwd, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| run(cli, &cwd.display().to_string()));

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
