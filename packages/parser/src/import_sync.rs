//! Adds import statements for components the tree uses but the source does not import.

use crate::ast::{resolve_local, Import};
use crate::parser::parse_imports;
use indexmap::IndexMap;
use tracing::debug;
use trellis_tree::{walk_node, ElementNode, ElementTree, ImportType, Visitor};

/// A binding some component node needs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Needed {
    package: String,
    imported: String,
    local: String,
    import_type: ImportType,
}

#[derive(Default)]
struct ComponentCollector {
    needed: Vec<Needed>,
}

impl Visitor for ComponentCollector {
    fn visit_node(&mut self, node: &ElementNode) {
        if let Some(info) = node.component_info.as_ref().filter(|info| info.is_component) {
            if !info.package_name.is_empty() {
                let local = base_name(&node.node_type).to_string();
                let imported = match info.import_type {
                    ImportType::Named => base_name(&info.import_name).to_string(),
                    ImportType::Default | ImportType::Namespace => local.clone(),
                };
                let needed = Needed {
                    package: info.package_name.clone(),
                    imported,
                    local,
                    import_type: info.import_type,
                };
                if !self.needed.contains(&needed) {
                    self.needed.push(needed);
                }
            }
        }
        walk_node(self, node);
    }
}

fn base_name(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Insert `import` lines for every component package the tree references but
/// `source` does not import. Unparseable import preludes are left alone.
pub fn sync_imports(tree: &ElementTree, source: &str) -> String {
    let Ok(imports) = parse_imports(source) else {
        return source.to_string();
    };

    let mut collector = ComponentCollector::default();
    collector.visit_node(tree.root());

    let missing: Vec<Needed> = collector
        .needed
        .into_iter()
        .filter(|needed| resolve_local(&imports, &needed.local).is_none())
        .collect();

    if missing.is_empty() {
        return source.to_string();
    }

    debug!(count = missing.len(), "Adding missing component imports");
    let lines = import_lines(&missing);
    insert_after_imports(source, &imports, &lines)
}

fn import_lines(missing: &[Needed]) -> Vec<String> {
    let mut named: IndexMap<&str, Vec<String>> = IndexMap::new();
    let mut lines = Vec::new();

    for needed in missing {
        match needed.import_type {
            ImportType::Named => {
                let specifier = if needed.imported == needed.local {
                    needed.imported.clone()
                } else {
                    format!("{} as {}", needed.imported, needed.local)
                };
                let specifiers = named.entry(needed.package.as_str()).or_default();
                if !specifiers.contains(&specifier) {
                    specifiers.push(specifier);
                }
            }
            ImportType::Default => {
                lines.push(format!("import {} from \"{}\";", needed.local, needed.package));
            }
            ImportType::Namespace => {
                lines.push(format!("import * as {} from \"{}\";", needed.local, needed.package));
            }
        }
    }

    let mut named_lines: Vec<String> = named
        .into_iter()
        .map(|(package, specifiers)| {
            format!("import {{ {} }} from \"{}\";", specifiers.join(", "), package)
        })
        .collect();
    named_lines.extend(lines);
    named_lines
}

fn insert_after_imports(source: &str, imports: &[Import], lines: &[String]) -> String {
    let block = lines.join("\n");
    match imports.last() {
        Some(last) => {
            let at = last.span.end;
            format!("{}\n{}{}", &source[..at], block, &source[at..])
        }
        None => {
            let separator = if source.starts_with('\n') { "\n" } else { "\n\n" };
            format!("{}{}{}", block, separator, source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_tree::ComponentInfo;

    fn tree_with(nodes: Vec<ElementNode>) -> ElementTree {
        ElementTree::from_root(ElementNode::root().with_children(nodes)).unwrap()
    }

    #[test]
    fn test_adds_missing_named_import() {
        let tree = tree_with(vec![ElementNode::new("a", "Button")
            .with_component(ComponentInfo::named("@/components/ui", "Button"))]);
        let source = "import React from \"react\";\n\n<Button />";

        assert_eq!(
            sync_imports(&tree, source),
            "import React from \"react\";\nimport { Button } from \"@/components/ui\";\n\n<Button />"
        );
    }

    #[test]
    fn test_groups_by_package_without_existing_imports() {
        let tree = tree_with(vec![
            ElementNode::new("a", "Card").with_component(ComponentInfo::named("ui", "Card")),
            ElementNode::new("b", "Badge").with_component(ComponentInfo::named("ui", "Badge")),
        ]);

        assert_eq!(
            sync_imports(&tree, "<Card />"),
            "import { Card, Badge } from \"ui\";\n\n<Card />"
        );
    }

    #[test]
    fn test_existing_import_is_left_alone() {
        let tree = tree_with(vec![
            ElementNode::new("a", "Card").with_component(ComponentInfo::named("ui", "Card")),
        ]);
        let source = "import { Card } from 'ui';\n<Card />";
        assert_eq!(sync_imports(&tree, source), source);
    }

    #[test]
    fn test_components_without_package_are_skipped() {
        let tree = tree_with(vec![
            ElementNode::new("a", "Local").with_component(ComponentInfo::named("", "Local")),
        ]);
        assert_eq!(sync_imports(&tree, "<Local />"), "<Local />");
    }
}
