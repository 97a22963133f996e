use crate::parser::{is_expression_value, ANIMATION_ATTRIBUTE};
use trellis_tree::{ElementNode, ElementTree, EXPRESSION_TYPE, ROOT_TYPE, TEXT_TYPE};

/// Serializer prints an element tree as markup from scratch.
///
/// Used for nodes that have no usable source origin (added, duplicated or
/// moved) and as the fallback when a tree was never parsed. Output is
/// canonical: `className` first, then `style`, then attributes in order.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Start printing at a nesting depth, so nested lines line up with their new parent
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.indent_level = depth;
        self
    }

    /// Serialize the top-level elements of a tree, one after another
    pub fn serialize(&mut self, tree: &ElementTree) -> String {
        let mut output = String::new();
        self.serialize_node(tree.root(), &mut output);
        output
    }

    /// Write one node. The caller has already written the indent for the first line.
    pub fn serialize_node(&mut self, node: &ElementNode, output: &mut String) {
        match node.node_type.as_str() {
            ROOT_TYPE => {
                for (i, child) in node.children.iter().enumerate() {
                    if i > 0 {
                        output.push('\n');
                        self.write_indent(output);
                    }
                    self.serialize_node(child, output);
                }
            }
            TEXT_TYPE => {
                output.push_str(&escape_text(node.text_content.as_deref().unwrap_or("")));
            }
            EXPRESSION_TYPE => {
                output.push('{');
                output.push_str(node.text_content.as_deref().unwrap_or(""));
                output.push('}');
            }
            _ => self.serialize_element(node, output),
        }
    }

    fn serialize_element(&mut self, node: &ElementNode, output: &mut String) {
        let text = node.text_content.as_deref().filter(|t| !t.is_empty());

        if node.children.is_empty() {
            match text {
                None => output.push_str(&open_tag(node, true)),
                Some(text) => {
                    output.push_str(&open_tag(node, false));
                    output.push_str(&escape_text(text));
                    output.push_str(&close_tag(node));
                }
            }
            return;
        }

        output.push_str(&open_tag(node, false));
        self.serialize_children(node, output);
        output.push_str(&close_tag(node));
    }

    /// Write the content region of an element: a newline, each child on its
    /// own indented line, then the indent for the closing tag
    pub fn serialize_children(&mut self, node: &ElementNode, output: &mut String) {
        output.push('\n');
        self.indent_level += 1;

        if let Some(text) = node.text_content.as_deref().filter(|t| !t.is_empty()) {
            self.write_indent(output);
            output.push_str(&escape_text(text));
            output.push('\n');
        }

        for child in &node.children {
            self.write_indent(output);
            self.serialize_node(child, output);
            output.push('\n');
        }

        self.indent_level -= 1;
        self.write_indent(output);
    }

    pub fn write_indent(&self, output: &mut String) {
        for _ in 0..self.indent_level {
            output.push_str(&self.indent_string);
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }
}

/// Print a whole tree with default settings
pub fn print(tree: &ElementTree) -> String {
    Serializer::new().serialize(tree)
}

/// `<tag attrs>` or `<tag attrs />`
pub fn open_tag(node: &ElementNode, self_closing: bool) -> String {
    let mut output = String::new();
    output.push('<');
    output.push_str(&node.node_type);

    if !node.class_name.is_empty() {
        output.push_str(" className=");
        output.push_str(&quote_attribute(&node.class_name));
    }

    if !node.style.is_empty() {
        output.push_str(" style={{ ");
        for (i, (key, value)) in node.style.iter().enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            output.push_str(&style_key(key));
            output.push_str(": ");
            output.push_str(&style_value(value));
        }
        output.push_str(" }}");
    }

    for (name, value) in &node.attributes {
        if is_superseded(node, name) {
            continue;
        }
        output.push(' ');
        output.push_str(name);
        if value == "{true}" {
            continue;
        }
        output.push('=');
        if is_expression_value(value) {
            output.push_str(value);
        } else {
            output.push_str(&quote_attribute(value));
        }
    }

    if let Some(config) = &node.animations {
        if let Ok(json) = serde_json::to_string(config) {
            output.push(' ');
            output.push_str(ANIMATION_ATTRIBUTE);
            output.push_str("='");
            // Keep the single-quoted attribute intact; ' is still valid JSON
            output.push_str(&json.replace('\'', "\\u0027"));
            output.push('\'');
        }
    }

    output.push_str(if self_closing { " />" } else { ">" });
    output
}

/// An expression `className` / `style` kept verbatim loses to the structured field once set
fn is_superseded(node: &ElementNode, attribute: &str) -> bool {
    match attribute {
        "className" | "class" => !node.class_name.is_empty(),
        "style" => !node.style.is_empty(),
        _ => false,
    }
}

pub fn close_tag(node: &ElementNode) -> String {
    format!("</{}>", node.node_type)
}

/// Text that would be read back as markup is written as a string expression
pub fn escape_text(text: &str) -> String {
    if text.contains(['<', '>', '{', '}']) {
        let quoted = serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text));
        format!("{{{}}}", quoted)
    } else {
        text.to_string()
    }
}

fn quote_attribute(value: &str) -> String {
    if value.contains('"') {
        let quoted = serde_json::to_string(value).unwrap_or_else(|_| format!("'{}'", value));
        format!("{{{}}}", quoted)
    } else {
        format!("\"{}\"", value)
    }
}

fn style_key(key: &str) -> String {
    let plain = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain && !key.is_empty() {
        key.to_string()
    } else {
        format!("\"{}\"", key)
    }
}

fn style_value(value: &str) -> String {
    if is_expression_value(value) {
        value[1..value.len() - 1].to_string()
    } else if value.parse::<f64>().is_ok() {
        value.to_string()
    } else {
        serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
    }
}
