//! The allow-list every component reference is resolved against.
//!
//! Nothing outside this environment is reachable from rendered markup: a
//! reference resolves only if its package is known to the [`ModuleResolver`]
//! and its name is in the [`ComponentCatalog`] under the same family.

use crate::catalog::{ComponentCatalog, ComponentDescriptor, ComponentFamily};
use crate::compiler::CompileError;
use std::collections::HashMap;
use trellis_tree::ComponentInfo;

/// Maps package names to the component family they may provide
#[derive(Debug, Clone, Default)]
pub struct ModuleResolver {
    packages: HashMap<String, ComponentFamily>,
}

impl ModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut modules = Self::new();
        modules.allow("lucide-react", ComponentFamily::Icon);
        modules.allow("@/components/ui", ComponentFamily::Widget);
        modules.allow("next/link", ComponentFamily::Builtin);
        modules.allow("next/image", ComponentFamily::Builtin);
        modules.allow("react", ComponentFamily::Builtin);
        modules
    }

    pub fn allow(&mut self, package: impl Into<String>, family: ComponentFamily) {
        self.packages.insert(package.into(), family);
    }

    /// Family for `package`; sub-paths of an allowed package inherit its family
    /// (`@/components/ui/button` → `@/components/ui`)
    pub fn resolve(&self, package: &str) -> Option<ComponentFamily> {
        if let Some(family) = self.packages.get(package) {
            return Some(*family);
        }
        let mut prefix = package;
        while let Some((parent, _)) = prefix.rsplit_once('/') {
            if let Some(family) = self.packages.get(parent) {
                return Some(*family);
            }
            prefix = parent;
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub catalog: ComponentCatalog,
    pub modules: ModuleResolver,
}

impl Default for Environment {
    fn default() -> Self {
        Self::standard()
    }
}

impl Environment {
    pub fn new(catalog: ComponentCatalog, modules: ModuleResolver) -> Self {
        Self { catalog, modules }
    }

    pub fn standard() -> Self {
        Self::new(ComponentCatalog::standard(), ModuleResolver::standard())
    }

    /// Fast-path lookup: a plain (non-dotted) name from an allowed package,
    /// or a built-in used without an import
    pub fn lookup_direct(&self, info: &ComponentInfo) -> Option<&ComponentDescriptor> {
        if info.import_name.contains('.') {
            return None;
        }
        let descriptor = self.catalog.lookup(&info.import_name)?;
        let allowed = if info.package_name.is_empty() {
            descriptor.family == ComponentFamily::Builtin
        } else {
            self.modules.resolve(&info.package_name) == Some(descriptor.family)
        };
        allowed.then_some(descriptor)
    }

    /// Full resolution used by the snippet compiler. Compound names
    /// (`Card.Header`) are tried joined (`CardHeader`) and by their last segment.
    pub fn resolve_component(&self, info: &ComponentInfo) -> Result<&ComponentDescriptor, CompileError> {
        let family = if info.package_name.is_empty() {
            ComponentFamily::Builtin
        } else {
            self.modules
                .resolve(&info.package_name)
                .ok_or_else(|| CompileError::PackageNotAllowed {
                    package: info.package_name.clone(),
                })?
        };

        let joined = info.import_name.replace('.', "");
        let last = info.import_name.rsplit('.').next().unwrap_or(&info.import_name);

        let found = [info.import_name.as_str(), joined.as_str(), last]
            .into_iter()
            .filter_map(|name| self.catalog.lookup(name))
            .find(|descriptor| descriptor.family == family);
        found.ok_or_else(|| CompileError::NameNotAllowed {
            name: info.import_name.clone(),
            package: info.package_name.clone(),
        })
    }
}

/// Check if a name is a known HTML tag
pub fn is_html_tag(name: &str) -> bool {
    matches!(
        name,
        "a" | "abbr" | "address" | "area" | "article" | "aside" | "audio" |
        "b" | "blockquote" | "br" | "button" |
        "canvas" | "caption" | "cite" | "code" | "col" | "colgroup" |
        "data" | "datalist" | "dd" | "del" | "details" | "dfn" | "dialog" | "div" | "dl" | "dt" |
        "em" | "embed" |
        "fieldset" | "figcaption" | "figure" | "footer" | "form" |
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "header" | "hgroup" | "hr" |
        "i" | "iframe" | "img" | "input" | "ins" |
        "kbd" |
        "label" | "legend" | "li" |
        "main" | "mark" | "menu" | "meter" |
        "nav" |
        "ol" | "optgroup" | "option" | "output" |
        "p" | "picture" | "pre" | "progress" |
        "q" |
        "s" | "samp" | "search" | "section" | "select" | "small" | "source" | "span" | "strong" | "sub" | "summary" | "sup" | "svg" |
        "table" | "tbody" | "td" | "textarea" | "tfoot" | "th" | "thead" | "time" | "tr" | "track" |
        "u" | "ul" |
        "var" | "video" |
        "wbr"
    )
}
