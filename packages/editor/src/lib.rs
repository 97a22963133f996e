//! # Trellis Editor
//!
//! Structural editing on top of the element tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup → ElementTree                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + commands       │
//! │  - add / duplicate / delete / move / update │
//! │  - drop-position inference                  │
//! │  - selection and breadcrumbs                │
//! │  - debounced property edits, undo / redo    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ evaluator: ElementTree → VDOM               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The tree is the source of truth while editing. The markup is regenerated
//! from it on save, patching the loaded text wherever nodes kept their origin.
//!
//! ## Usage
//!
//! ```rust
//! use trellis_editor::{Document, DropPosition};
//!
//! let mut doc = Document::load("<div>\n  <p>One</p>\n</div>\n<section></section>");
//! let tree = doc.tree().unwrap();
//! let p = tree.root().children[0].children[0].id.clone();
//! let section = tree.root().children[1].id.clone();
//!
//! let outcome = doc.move_element(&p, &section, DropPosition::Inside).unwrap();
//! assert!(outcome.is_applied());
//! assert!(doc.save().contains("<section>"));
//! ```

mod defaults;
mod document;
mod drop_zones;
mod errors;
mod mutations;
mod pending_edits;
mod selection;
mod undo_stack;

pub use defaults::{components_from_catalog, ClassPalette, ElementDefaults};
pub use document::{DispatchOutcome, Document, DocumentMode, SaveCallback};
pub use drop_zones::DropZones;
pub use errors::EditorError;
pub use mutations::{Command, DropPosition, MutationEngine, MutationError, MutationResult};
pub use pending_edits::{EditField, EditKey, PendingEdit, PendingEdits, DEFAULT_QUIESCENCE};
pub use selection::{Crumb, SelectionController};
pub use undo_stack::{HistoryEntry, UndoStack};

// Re-export common types for convenience
pub use trellis_evaluator::VirtualDomDocument;
pub use trellis_tree::{ElementNode, ElementTree};
