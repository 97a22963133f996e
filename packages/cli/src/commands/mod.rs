pub mod apply;
pub mod check;
pub mod drop;
pub mod render;
pub mod roundtrip;
pub mod tree;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use drop::{drop_at, DropArgs};
pub use render::{render, RenderArgs};
pub use roundtrip::{roundtrip, RoundtripArgs};
pub use tree::{tree, TreeArgs};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Resolve `input` against the working directory and read it
pub(crate) fn read_source(input: &Path, cwd: &str) -> Result<(PathBuf, String)> {
    let path = if input.is_absolute() {
        input.to_path_buf()
    } else {
        PathBuf::from(cwd).join(input)
    };
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    Ok((path, source))
}
