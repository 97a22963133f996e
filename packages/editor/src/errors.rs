//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] trellis_parser::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid command: {0}")]
    InvalidCommand(#[from] serde_json::Error),

    #[error("Structural editing is disabled: {reason}")]
    StructuralEditingDisabled { reason: String },
}
