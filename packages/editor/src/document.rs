//! # Document Handle
//!
//! One markup source and its editing state.
//!
//! A document is either:
//! - **Structured**: the source parsed, the tree is editable, save
//!   regenerates the markup from the tree
//! - **Opaque**: the source did not parse; it is kept verbatim, structural
//!   commands are refused and save hands the text back unchanged
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Command / Edit → Render → Save
//!   ↓      ↓          ↓             ↓       ↓
//! Text   Tree     Mutations       VDOM    Text
//! ```

use crate::errors::EditorError;
use crate::mutations::{Command, DropPosition, MutationEngine, MutationResult};
use crate::pending_edits::{EditField, PendingEdit};
use crate::selection::{Crumb, SelectionController};
use crate::undo_stack::UndoStack;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};
use trellis_evaluator::{ComponentResolver, IdleReport, IdleScheduler, Renderer, VNode, VirtualDomDocument};
use trellis_parser::{parse, regenerate, ParseError};
use trellis_tree::{AnimationPreview, ElementNode, ElementTree};

pub type SaveCallback = Box<dyn FnMut(&str)>;

#[derive(Debug)]
pub enum DocumentMode {
    Structured { tree: ElementTree },
    Opaque { error: ParseError },
}

/// What happened to a dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Applied(MutationResult),
    /// Guard failure or stale id; the tree is unchanged
    Rejected(String),
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied(_))
    }
}

pub struct Document {
    /// Source as loaded; regeneration patches against it
    source: String,
    mode: DocumentMode,
    engine: MutationEngine,
    selection: SelectionController,
    history: UndoStack,
    scheduler: IdleScheduler,
    previews: HashMap<String, AnimationPreview>,
    on_save: Option<SaveCallback>,
    pub version: u64,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("mode", &self.mode)
            .field("version", &self.version)
            .field("selected", &self.selection.selected())
            .finish()
    }
}

impl Document {
    /// Parse `source`; a parse failure yields an opaque document, never an error
    pub fn load(source: impl Into<String>) -> Self {
        let source = source.into();
        let mode = Self::parse_mode(&source);
        Self {
            source,
            mode,
            engine: MutationEngine::default(),
            selection: SelectionController::new(),
            history: UndoStack::new(),
            scheduler: IdleScheduler::new(),
            previews: HashMap::new(),
            on_save: None,
            version: 0,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::load(source))
    }

    pub fn with_engine(mut self, engine: MutationEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(levels);
        self
    }

    /// Called with the regenerated text on every save
    pub fn on_save(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_save = Some(Box::new(callback));
        self
    }

    fn parse_mode(source: &str) -> DocumentMode {
        match parse(source) {
            Ok(doc) => {
                info!(nodes = doc.tree.count_nodes(), "Loaded document");
                DocumentMode::Structured { tree: doc.tree }
            }
            Err(error) => {
                warn!(error = %error, "Source did not parse, structural editing disabled");
                DocumentMode::Opaque { error }
            }
        }
    }

    /// Replace the whole tree from new source text
    pub fn reload(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.mode = Self::parse_mode(&self.source);
        self.history.clear();
        self.previews.clear();
        self.version += 1;
        self.reconcile_selection();
    }

    pub fn mode(&self) -> &DocumentMode {
        &self.mode
    }

    pub fn is_structured(&self) -> bool {
        matches!(self.mode, DocumentMode::Structured { .. })
    }

    pub fn tree(&self) -> Option<&ElementTree> {
        match &self.mode {
            DocumentMode::Structured { tree } => Some(tree),
            DocumentMode::Opaque { .. } => None,
        }
    }

    pub fn parse_error(&self) -> Option<&ParseError> {
        match &self.mode {
            DocumentMode::Opaque { error } => Some(error),
            DocumentMode::Structured { .. } => None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Apply a command. Guard failures are logged and reported as
    /// [`DispatchOutcome::Rejected`]; only an opaque document is an error.
    pub fn dispatch(&mut self, command: Command) -> Result<DispatchOutcome, EditorError> {
        let engine = &self.engine;
        let tree = match &mut self.mode {
            DocumentMode::Structured { tree } => tree,
            DocumentMode::Opaque { error } => return Err(disabled(error)),
        };

        let before = tree.clone();
        match engine.apply(tree, &command) {
            Ok(result) => {
                self.history.record(&before, command.describe());
                self.version += 1;
                self.reconcile_selection();
                Ok(DispatchOutcome::Applied(result))
            }
            Err(e) => {
                warn!(error = %e, command = %command.describe(), "Command rejected");
                Ok(DispatchOutcome::Rejected(e.to_string()))
            }
        }
    }

    /// Parse a JSON command and dispatch it
    pub fn dispatch_json(&mut self, json: &str) -> Result<DispatchOutcome, EditorError> {
        let command: Command = serde_json::from_str(json)?;
        self.dispatch(command)
    }

    pub fn add_element(
        &mut self,
        parent_id: &str,
        node_type: &str,
        position: Option<usize>,
        text: Option<String>,
        attributes: Option<IndexMap<String, String>>,
    ) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Command::Add {
            parent_id: parent_id.to_string(),
            node_type: node_type.to_string(),
            position,
            text,
            attributes,
        })
    }

    pub fn duplicate_element(&mut self, id: &str) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Command::Duplicate { id: id.to_string() })
    }

    pub fn delete_element(&mut self, id: &str) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Command::Delete { id: id.to_string() })
    }

    pub fn move_element(
        &mut self,
        source_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Command::Move {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            position,
        })
    }

    /// Entry point for property panels
    pub fn update_element(&mut self, node: ElementNode) -> Result<DispatchOutcome, EditorError> {
        self.dispatch(Command::Update { node })
    }

    /// Write settled property edits to the tree as one undo step.
    /// Edits for nodes that no longer exist are skipped. Returns how many applied.
    pub fn commit_edits(&mut self, edits: Vec<PendingEdit>) -> Result<usize, EditorError> {
        let tree = match &mut self.mode {
            DocumentMode::Structured { tree } => tree,
            DocumentMode::Opaque { error } => return Err(disabled(error)),
        };
        let before = tree.clone();

        let mut applied = 0;
        for edit in edits {
            let Some(node) = tree.find_mut(&edit.key.node_id) else {
                debug!(node_id = %edit.key.node_id, "Skipping edit for missing node");
                continue;
            };
            apply_edit(node, &edit.key.field, edit.value);
            applied += 1;
        }

        if applied > 0 {
            self.history.record(&before, "Edit properties");
            self.version += 1;
        }
        Ok(applied)
    }

    /// Click on a rendered element. Returns whether anything got selected.
    pub fn on_element_click(&mut self, id: &str) -> bool {
        match &self.mode {
            DocumentMode::Structured { tree } => self.selection.select(tree, id),
            DocumentMode::Opaque { .. } => false,
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn breadcrumb(&self) -> Vec<Crumb> {
        self.tree()
            .map(|tree| self.selection.breadcrumb(tree))
            .unwrap_or_default()
    }

    /// `[root, ..., id]`; empty for unknown ids and opaque documents
    pub fn ancestor_path(&self, id: &str) -> Vec<&ElementNode> {
        self.tree().map(|tree| tree.ancestor_path(id)).unwrap_or_default()
    }

    /// Restart the preview animation on `id`. Returns the new remount key.
    pub fn replay_animation(&mut self, id: &str) -> Option<u64> {
        let has_animation = self.tree()?.find(id)?.animations.is_some();
        if !has_animation {
            return None;
        }
        Some(self.previews.entry(id.to_string()).or_default().replay())
    }

    /// Render the current tree. An opaque document renders its raw text.
    pub fn render(&mut self, resolver: &ComponentResolver) -> VirtualDomDocument {
        match &self.mode {
            DocumentMode::Structured { tree } => Renderer::new(resolver, &mut self.scheduler)
                .with_previews(&self.previews)
                .render(tree),
            DocumentMode::Opaque { .. } => {
                let mut vdoc = VirtualDomDocument::new();
                vdoc.add_node(VNode::text(self.source.clone()));
                vdoc
            }
        }
    }

    /// Compile queued components for up to `budget`
    pub fn run_idle(&mut self, resolver: &ComponentResolver, budget: Duration) -> IdleReport {
        match &self.mode {
            DocumentMode::Structured { tree } => {
                self.scheduler
                    .run_idle(budget, resolver.env(), resolver.cache(), tree)
            }
            DocumentMode::Opaque { .. } => IdleReport::default(),
        }
    }

    pub fn pending_compiles(&self) -> usize {
        self.scheduler.len()
    }

    /// Regenerate the markup and hand it to the save callback
    pub fn save(&mut self) -> String {
        let text = match &self.mode {
            DocumentMode::Structured { tree } => regenerate(tree, &self.source),
            DocumentMode::Opaque { .. } => self.source.clone(),
        };
        info!(bytes = text.len(), version = self.version, "Saving document");
        if let Some(callback) = self.on_save.as_mut() {
            callback(&text);
        }
        text
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let tree = match &mut self.mode {
            DocumentMode::Structured { tree } => tree,
            DocumentMode::Opaque { error } => return Err(disabled(error)),
        };
        let undone = self.history.undo(tree);
        if undone {
            self.version += 1;
            self.reconcile_selection();
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let tree = match &mut self.mode {
            DocumentMode::Structured { tree } => tree,
            DocumentMode::Opaque { error } => return Err(disabled(error)),
        };
        let redone = self.history.redo(tree);
        if redone {
            self.version += 1;
            self.reconcile_selection();
        }
        Ok(redone)
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    fn reconcile_selection(&mut self) {
        match &self.mode {
            DocumentMode::Structured { tree } => {
                self.selection.reconcile(tree);
            }
            DocumentMode::Opaque { .. } => self.selection.clear(),
        }
    }
}

fn disabled(error: &ParseError) -> EditorError {
    EditorError::StructuralEditingDisabled {
        reason: error.to_string(),
    }
}

fn apply_edit(node: &mut ElementNode, field: &EditField, value: String) {
    match field {
        EditField::Text => node.text_content = Some(value),
        EditField::ClassName => {
            if !value.is_empty() {
                node.attributes.shift_remove("className");
                node.attributes.shift_remove("class");
            }
            node.class_name = value;
        }
        EditField::Style(property) if value.is_empty() => {
            node.style.shift_remove(property);
        }
        EditField::Style(property) => {
            // A verbatim style expression cannot be merged into, so the object replaces it
            node.attributes.shift_remove("style");
            node.style.insert(property.clone(), value);
        }
        EditField::Attribute(name) if value.is_empty() => {
            node.attributes.shift_remove(name);
        }
        EditField::Attribute(name) => {
            node.attributes.insert(name.clone(), value);
        }
    }
}
