//! # Trellis Parser
//!
//! The bridge between markup source and the element tree:
//!
//! - [`parse`] turns markup into a [`ParsedDocument`] (imports plus tree)
//! - [`regenerate`] writes an edited tree back, patching the original text
//! - [`print`] prints a tree from scratch
//!
//! ```rust
//! use trellis_parser::{parse, regenerate};
//!
//! let source = "<div>\n  <p>Hello</p>\n</div>";
//! let doc = parse(source).unwrap();
//! assert_eq!(regenerate(&doc.tree, source), source);
//! ```

pub mod ast;
pub mod error;
pub mod import_sync;
pub mod lossless_serializer;
pub mod parser;
pub mod serializer;
pub mod tokenizer;

pub use ast::{Import, ImportBinding, ParsedDocument};
pub use error::{format_error, ParseError, ParseResult};
pub use import_sync::sync_imports;
pub use lossless_serializer::{regenerate, LosslessSerializer};
pub use parser::{parse, parse_imports, parse_with_seed, Parser, ANIMATION_ATTRIBUTE};
pub use serializer::{print, Serializer};
pub use tokenizer::{tokenize, Token};
