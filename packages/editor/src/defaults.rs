//! # Element Defaults
//!
//! What a freshly added element looks like. The values live in data tables
//! rather than in the add operation, so a host can swap the palette or the
//! placeholder text without touching the mutation code.
//!
//! - placeholder text per tag (`p` → "paragraph text", `h2` → "Heading 2")
//! - placeholder attributes per tag (`img` → `src` / `alt`)
//! - default class tokens per tag, from a [`ClassPalette`]
//! - `component_info` for names the component catalog knows about

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use trellis_evaluator::{ComponentCatalog, ComponentFamily};
use trellis_tree::{ComponentInfo, ElementNode, ImportType};

/// Default class tokens keyed by element type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassPalette {
    tokens: IndexMap<String, Vec<String>>,
}

impl Default for ClassPalette {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClassPalette {
    pub fn new(tokens: IndexMap<String, Vec<String>>) -> Self {
        Self { tokens }
    }

    pub fn standard() -> Self {
        let table: &[(&str, &[&str])] = &[
            ("div", &["p-4"]),
            ("section", &["py-8", "px-4"]),
            ("p", &["text-base", "text-gray-700"]),
            ("h1", &["text-4xl", "font-bold"]),
            ("h2", &["text-3xl", "font-bold"]),
            ("h3", &["text-2xl", "font-semibold"]),
            ("h4", &["text-xl", "font-semibold"]),
            ("h5", &["text-lg", "font-medium"]),
            ("h6", &["text-base", "font-medium"]),
            ("button", &["px-4", "py-2", "rounded", "bg-blue-600", "text-white"]),
            ("a", &["text-blue-600", "underline"]),
            ("img", &["max-w-full", "h-auto"]),
            ("ul", &["list-disc", "pl-6"]),
        ];
        let tokens = table
            .iter()
            .map(|(tag, tokens)| (tag.to_string(), tokens.iter().map(|t| t.to_string()).collect()))
            .collect();
        Self { tokens }
    }

    pub fn tokens_for(&self, node_type: &str) -> &[String] {
        self.tokens.get(node_type).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Override or add the tokens for one element type
    pub fn set(&mut self, node_type: impl Into<String>, tokens: Vec<String>) {
        self.tokens.insert(node_type.into(), tokens);
    }
}

#[derive(Debug, Clone)]
pub struct ElementDefaults {
    pub texts: HashMap<String, String>,
    pub attributes: HashMap<String, Vec<(String, String)>>,
    pub palette: ClassPalette,
    pub components: HashMap<String, ComponentInfo>,
}

impl Default for ElementDefaults {
    fn default() -> Self {
        Self::standard()
    }
}

impl ElementDefaults {
    /// Placeholder tables plus the standard palette and component catalog
    pub fn standard() -> Self {
        let mut texts: HashMap<String, String> = [
            ("p", "paragraph text"),
            ("button", "Button"),
            ("a", "Link"),
            ("span", "text"),
            ("li", "List item"),
            ("Button", "Button"),
            ("Badge", "Badge"),
            ("Label", "Label"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for level in 1..=6 {
            texts.insert(format!("h{}", level), format!("Heading {}", level));
        }

        let attributes = HashMap::from([
            (
                "img".to_string(),
                vec![
                    ("src".to_string(), "/placeholder.svg".to_string()),
                    ("alt".to_string(), "Placeholder image".to_string()),
                ],
            ),
            ("a".to_string(), vec![("href".to_string(), "#".to_string())]),
        ]);

        Self {
            texts,
            attributes,
            palette: ClassPalette::standard(),
            components: components_from_catalog(&ComponentCatalog::standard()),
        }
    }

    pub fn with_palette(mut self, palette: ClassPalette) -> Self {
        self.palette = palette;
        self
    }

    /// A new, unattached node of `node_type` with every default applied
    pub fn build(&self, id: impl Into<String>, node_type: &str) -> ElementNode {
        let mut node = ElementNode::new(id, node_type);

        node.class_name = self.palette.tokens_for(node_type).join(" ");
        node.text_content = self.texts.get(node_type).cloned();
        if let Some(pairs) = self.attributes.get(node_type) {
            for (key, value) in pairs {
                node.attributes.insert(key.clone(), value.clone());
            }
        }
        node.component_info = self.components.get(node_type).cloned();
        node
    }
}

/// Import every catalog entry would need when dropped into a page
pub fn components_from_catalog(catalog: &ComponentCatalog) -> HashMap<String, ComponentInfo> {
    catalog
        .descriptors()
        .map(|descriptor| {
            let (package, import_type) = match (descriptor.family, descriptor.name.as_str()) {
                (ComponentFamily::Icon, _) => ("lucide-react", ImportType::Named),
                (ComponentFamily::Widget, _) => ("@/components/ui", ImportType::Named),
                (ComponentFamily::Builtin, "Link") => ("next/link", ImportType::Default),
                (ComponentFamily::Builtin, "Image") => ("next/image", ImportType::Default),
                (ComponentFamily::Builtin, _) => ("react", ImportType::Named),
            };
            let info = ComponentInfo {
                is_component: true,
                package_name: package.to_string(),
                import_name: descriptor.name.clone(),
                import_type,
            };
            (descriptor.name.clone(), info)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph_text() {
        let defaults = ElementDefaults::standard();
        assert_eq!(defaults.build("a", "p").text_content.as_deref(), Some("paragraph text"));
        assert_eq!(defaults.build("b", "h2").text_content.as_deref(), Some("Heading 2"));
        assert_eq!(defaults.build("c", "div").text_content, None);
    }

    #[test]
    fn test_image_placeholders_and_palette() {
        let node = ElementDefaults::standard().build("img1", "img");
        assert_eq!(node.attributes["src"], "/placeholder.svg");
        assert_eq!(node.attributes["alt"], "Placeholder image");
        assert_eq!(node.class_name, "max-w-full h-auto");
    }

    #[test]
    fn test_catalog_components_get_import_info() {
        let defaults = ElementDefaults::standard();
        let star = defaults.build("s", "Star");
        let info = star.component_info.unwrap();
        assert_eq!(info.package_name, "lucide-react");
        assert_eq!(info.import_name, "Star");

        let link = defaults.build("l", "Link").component_info.unwrap();
        assert_eq!(link.import_type, ImportType::Default);
    }

    #[test]
    fn test_palette_override() {
        let mut palette = ClassPalette::standard();
        palette.set("p", vec!["leading-7".to_string()]);
        let defaults = ElementDefaults::standard().with_palette(palette);
        assert_eq!(defaults.build("x", "p").class_name, "leading-7");
    }

    #[test]
    fn test_palette_deserializes_from_map() {
        let palette: ClassPalette = serde_json::from_str(r#"{ "div": ["flex", "gap-2"] }"#).unwrap();
        assert_eq!(palette.tokens_for("div"), ["flex".to_string(), "gap-2".to_string()]);
        assert!(palette.tokens_for("p").is_empty());
    }
}
