use serde::{Deserialize, Serialize};
use trellis_tree::{ElementTree, ImportType, Span};

/// One name brought in by an import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBinding {
    /// Name exported by the package (`"default"` / `"*"` for default and namespace imports)
    pub imported: String,
    /// Name visible in the markup
    pub local: String,
    pub import_type: ImportType,
}

/// `import ... from "package";`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub package: String,
    pub bindings: Vec<ImportBinding>,
    pub span: Span,
}

impl Import {
    pub fn binding(&self, local: &str) -> Option<&ImportBinding> {
        self.bindings.iter().find(|b| b.local == local)
    }
}

/// Result of parsing a markup source
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub imports: Vec<Import>,
    pub tree: ElementTree,
}

impl ParsedDocument {
    /// Find the import that binds `local`, returning the package and binding
    pub fn resolve_local(&self, local: &str) -> Option<(&str, &ImportBinding)> {
        resolve_local(&self.imports, local)
    }
}

pub fn resolve_local<'a>(imports: &'a [Import], local: &str) -> Option<(&'a str, &'a ImportBinding)> {
    imports.iter().find_map(|import| {
        import
            .binding(local)
            .map(|binding| (import.package.as_str(), binding))
    })
}
