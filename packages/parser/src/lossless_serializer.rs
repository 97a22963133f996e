use crate::import_sync::sync_imports;
use crate::parser::parse_imports;
use crate::serializer::{escape_text, open_tag, Serializer};
use tracing::debug;
use trellis_tree::{ElementNode, ElementTree, SourceOrigin, Span, EXPRESSION_TYPE, TEXT_TYPE};

/// Lossless serializer that patches edits back into the original source
///
/// Every parsed node remembers its span and a snapshot of its fields. On
/// regeneration:
/// - clean nodes copy their original text verbatim
/// - a node whose props changed gets a re-printed open tag and keeps the rest
/// - changed text is spliced into the node's content region
/// - a node whose child list changed keeps its tags, and its children region is re-printed
/// - nodes without a usable origin are printed from scratch at their new depth
///
/// Text outside the top-level elements (imports, comments, trailing text) is kept.
pub struct LosslessSerializer<'a> {
    source: &'a str,
}

impl<'a> LosslessSerializer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    pub fn serialize(&self, tree: &ElementTree) -> String {
        let root = tree.root();

        let mut output = String::new();
        match self.origin_of(root) {
            Some(origin) => {
                output.push_str(&self.source[..origin.span.start]);
                self.serialize_top_level(root, origin, &mut output);
                output.push_str(&self.source[origin.span.end..]);
            }
            None => {
                // Never parsed from this source: keep its imports, print the rest
                let prelude_end = parse_imports(self.source)
                    .ok()
                    .and_then(|imports| imports.last().map(|import| import.span.end))
                    .unwrap_or(0);
                output.push_str(&self.source[..prelude_end]);
                if prelude_end > 0 {
                    output.push_str("\n\n");
                }
                output.push_str(&Serializer::new().serialize(tree));
                output.push('\n');
            }
        }
        output
    }

    fn serialize_top_level(&self, root: &ElementNode, origin: &SourceOrigin, output: &mut String) {
        if root.children_changed() || !self.children_have_origins(root) {
            debug!("Top-level element list changed, re-printing region");
            for (i, child) in root.children.iter().enumerate() {
                if i > 0 {
                    output.push('\n');
                }
                self.serialize_node(child, 0, output);
            }
            return;
        }

        let mut cursor = origin.span.start;
        self.patch_children(root, 0, &mut cursor, output);
        output.push_str(&self.source[cursor..origin.span.end]);
    }

    /// Emit a node at `depth`, patching its original text where possible
    pub fn serialize_node(&self, node: &ElementNode, depth: usize, output: &mut String) {
        let Some(origin) = self.origin_of(node) else {
            Serializer::new().at_depth(depth).serialize_node(node, output);
            return;
        };

        if node.node_type != origin.snapshot.node_type {
            debug!(node_id = %node.id, "Node type changed, re-printing");
            Serializer::new().at_depth(depth).serialize_node(node, output);
            return;
        }

        match node.node_type.as_str() {
            TEXT_TYPE => {
                if node.text_changed() {
                    output.push_str(&escape_text(node.text_content.as_deref().unwrap_or("")));
                } else {
                    output.push_str(&origin.fragment);
                }
                return;
            }
            EXPRESSION_TYPE => {
                if node.text_changed() {
                    output.push('{');
                    output.push_str(node.text_content.as_deref().unwrap_or(""));
                    output.push('}');
                } else {
                    output.push_str(&origin.fragment);
                }
                return;
            }
            _ => {}
        }

        let has_body = !node.children.is_empty()
            || node.text_content.as_deref().is_some_and(|t| !t.is_empty());

        let Some(content) = origin.content else {
            if has_body {
                // A self-closing tag grew content; there is no region to patch
                Serializer::new().at_depth(depth).serialize_node(node, output);
            } else if node.props_changed() {
                output.push_str(&open_tag(node, true));
            } else {
                output.push_str(&origin.fragment);
            }
            return;
        };

        if node.props_changed() {
            output.push_str(&open_tag(node, false));
        } else {
            output.push_str(self.slice(origin.open_tag.start, origin.open_tag.end));
        }

        let reprint_children = node.children_changed()
            || (!node.children.is_empty() && node.text_changed())
            || !self.children_have_origins(node);

        if node.children.is_empty() {
            if origin.snapshot.child_ids.is_empty() {
                self.patch_text(node, content, output);
            } else if let Some(text) = node.text_content.as_deref().filter(|t| !t.is_empty()) {
                output.push_str(&escape_text(text));
            }
        } else if reprint_children {
            self.serialize_children_region(node, depth, output);
        } else {
            let mut cursor = content.start;
            self.patch_children(node, depth + 1, &mut cursor, output);
            output.push_str(self.slice(cursor, content.end));
        }

        output.push_str(self.slice(content.end, origin.span.end));
    }

    /// Re-print an element's content region, emitting each child through the
    /// patcher so untouched descendants keep their text
    fn serialize_children_region(&self, node: &ElementNode, depth: usize, output: &mut String) {
        let outer = Serializer::new().at_depth(depth);
        let inner = Serializer::new().at_depth(depth + 1);
        output.push('\n');

        if let Some(text) = node.text_content.as_deref().filter(|t| !t.is_empty()) {
            inner.write_indent(output);
            output.push_str(&escape_text(text));
            output.push('\n');
        }

        for child in &node.children {
            inner.write_indent(output);
            self.serialize_node(child, depth + 1, output);
            output.push('\n');
        }

        outer.write_indent(output);
    }

    /// Replace each child's span with its own regeneration, keeping the text between them
    fn patch_children(&self, node: &ElementNode, depth: usize, cursor: &mut usize, output: &mut String) {
        for child in &node.children {
            let Some(child_origin) = self.origin_of(child) else {
                continue;
            };
            output.push_str(self.slice(*cursor, child_origin.span.start));
            self.serialize_node(child, depth, output);
            *cursor = child_origin.span.end;
        }
    }

    /// Splice changed text into the trimmed part of the content region
    fn patch_text(&self, node: &ElementNode, content: Span, output: &mut String) {
        let region = self.slice(content.start, content.end);
        if !node.text_changed() {
            output.push_str(region);
            return;
        }

        let text = escape_text(node.text_content.as_deref().unwrap_or(""));
        let trimmed = region.trim();
        if trimmed.is_empty() {
            output.push_str(&text);
            return;
        }

        let lead = region.len() - region.trim_start().len();
        let trail = lead + trimmed.len();
        output.push_str(&region[..lead]);
        output.push_str(&text);
        output.push_str(&region[trail..]);
    }

    /// A node's origin, only if it still describes this source
    fn origin_of<'n>(&self, node: &'n ElementNode) -> Option<&'n SourceOrigin> {
        node.source.as_ref().filter(|origin| {
            self.source.get(origin.span.start..origin.span.end) == Some(origin.fragment.as_str())
        })
    }

    /// Children spans can only be patched in place when each one is known and in order
    fn children_have_origins(&self, node: &ElementNode) -> bool {
        let mut last_end = 0;
        for child in &node.children {
            match self.origin_of(child) {
                Some(origin) if origin.span.start >= last_end => last_end = origin.span.end,
                _ => return false,
            }
        }
        true
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.source.get(start..end).unwrap_or("")
    }
}

/// Regenerate markup for `tree`, preserving everything untouched in `original`
/// and adding imports for component packages that are not imported yet
pub fn regenerate(tree: &ElementTree, original: &str) -> String {
    let patched = LosslessSerializer::new(original).serialize(tree);
    sync_imports(tree, &patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn roundtrip(source: &str) -> String {
        let doc = parse(source).unwrap();
        regenerate(&doc.tree, source)
    }

    #[test]
    fn test_unchanged_is_byte_identical() {
        let source = "import { Button } from \"@/ui\";\n\n<div className=\"a\">\n  <Button   variant=\"x\">Go</Button>\n  {/* note */}\n</div>\n";
        assert_eq!(roundtrip(source), source);
    }

    #[test]
    fn test_class_change_rewrites_only_open_tag() {
        let source = "<div>\n  <p   className=\"old\">Keep   spacing</p>\n</div>";
        let mut doc = parse(source).unwrap();
        let p_id = doc.tree.root().children[0].children[0].id.clone();
        doc.tree.find_mut(&p_id).unwrap().class_name = "new".to_string();

        assert_eq!(
            regenerate(&doc.tree, source),
            "<div>\n  <p className=\"new\">Keep   spacing</p>\n</div>"
        );
    }

    #[test]
    fn test_text_change_is_spliced() {
        let source = "<h1 data-x=\"1\">\n  Hello\n</h1>";
        let mut doc = parse(source).unwrap();
        let id = doc.tree.root().children[0].id.clone();
        doc.tree.find_mut(&id).unwrap().text_content = Some("Goodbye".to_string());

        assert_eq!(regenerate(&doc.tree, source), "<h1 data-x=\"1\">\n  Goodbye\n</h1>");
    }

    #[test]
    fn test_removed_child_reprints_region() {
        let source = "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>";
        let mut doc = parse(source).unwrap();
        doc.tree.edit(|root| {
            root.children[0].children.remove(0);
        });

        assert_eq!(regenerate(&doc.tree, source), "<ul>\n  <li>b</li>\n</ul>");
    }

    #[test]
    fn test_new_node_printed_at_depth() {
        let source = "<main>\n  <section>\n    <p>x</p>\n  </section>\n</main>";
        let mut doc = parse(source).unwrap();
        let id = doc.tree.fresh_id();
        doc.tree.edit(|root| {
            root.children[0].children[0]
                .children
                .push(ElementNode::new(id, "ul").with_child(ElementNode::new("li-new", "li").with_text("y")));
        });

        assert_eq!(
            regenerate(&doc.tree, source),
            "<main>\n  <section>\n    <p>x</p>\n    <ul>\n      <li>y</li>\n    </ul>\n  </section>\n</main>"
        );
    }

    #[test]
    fn test_unparsed_tree_keeps_imports() {
        let tree = ElementTree::from_root(
            ElementNode::root().with_child(ElementNode::new("a", "p").with_text("hi")),
        )
        .unwrap();
        let output = regenerate(&tree, "import X from \"x\";\n<old />");
        assert_eq!(output, "import X from \"x\";\n\n<p>hi</p>\n");
    }
}
