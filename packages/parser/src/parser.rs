//! # Markup Parser
//!
//! Turns JSX-style markup into an [`ElementTree`].
//!
//! Accepted input is a run of `import` statements followed by one or more
//! elements. Each element becomes one node carrying its own source origin
//! (verbatim fragment, spans and a snapshot of its parse-time fields), which
//! is what lets [`crate::regenerate`] patch edits back into the original text.
//!
//! Value conventions:
//! - quoted attribute values are stored unquoted
//! - braced values are stored verbatim, braces included (`size={24}` → `"{24}"`)
//! - bare flags are stored as `"{true}"`
//! - `style={{...}}` becomes the ordered style map; string values unquoted
//!   (numeric-looking strings stay quoted, `"100"` → `{"100"}`), numbers raw,
//!   anything else wrapped in braces
//! - an expression `className={..}` or non-object `style={..}` stays in the
//!   attributes verbatim
//! - `data-animation='<json>'` becomes the node's animation config

use crate::ast::{resolve_local, Import, ImportBinding, ParsedDocument};
use crate::error::{ParseError, ParseResult};
use crate::tokenizer::{lex_at, unquote, Lexed, Token};
use indexmap::IndexMap;
use tracing::debug;
use trellis_tree::{
    AnimationConfig, ComponentInfo, ElementNode, ElementTree, IDGenerator, ImportType,
    SourceOrigin, Span, DEFAULT_ID_SEED, EXPRESSION_TYPE, TEXT_TYPE,
};

/// Reserved attribute carrying a node's animation config as JSON
pub const ANIMATION_ATTRIBUTE: &str = "data-animation";

/// Parse with the default id seed
pub fn parse(source: &str) -> ParseResult<ParsedDocument> {
    parse_with_seed(source, DEFAULT_ID_SEED)
}

/// Parse with a caller-chosen id seed; same source and seed always yield the same ids
pub fn parse_with_seed(source: &str, seed: &str) -> ParseResult<ParsedDocument> {
    Parser::new(source, IDGenerator::new(seed)).parse_document()
}

/// Parse only the leading import statements
pub fn parse_imports(source: &str) -> ParseResult<Vec<Import>> {
    let mut parser = Parser::new(source, IDGenerator::new(DEFAULT_ID_SEED));
    parser.parse_prelude()?;
    Ok(parser.imports)
}

enum AttrValue {
    Literal(String),
    Expression(String),
    Flag,
}

pub struct Parser<'src> {
    source: &'src str,
    pos: usize,
    ids: IDGenerator,
    imports: Vec<Import>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, ids: IDGenerator) -> Self {
        Self {
            source,
            pos: 0,
            ids,
            imports: Vec::new(),
        }
    }

    pub fn parse_document(mut self) -> ParseResult<ParsedDocument> {
        let prelude_end = self.parse_prelude()?;

        let mut top_level = Vec::new();
        let mut region: Option<Span> = None;

        loop {
            self.skip_trivia();
            if self.is_at_end() {
                break;
            }

            if !self.rest().starts_with('<') {
                // Trailing text after the last element is kept as suffix, untouched
                if !top_level.is_empty() && !self.rest().contains('<') {
                    debug!(offset = self.pos, "Keeping trailing text after the last element");
                    break;
                }
                return Err(ParseError::invalid_syntax(
                    Span::new(self.pos, self.pos + 1),
                    "expected an element",
                ));
            }

            let element = self.parse_element()?;
            let span = element
                .source
                .as_ref()
                .map(|origin| origin.span)
                .unwrap_or_else(|| Span::new(self.pos, self.pos));
            region = Some(match region {
                Some(existing) => Span::new(existing.start, span.end),
                None => span,
            });
            top_level.push(element);
        }

        let region = region.unwrap_or_else(|| Span::new(prelude_end, prelude_end));
        let mut root = ElementNode::root().with_children(top_level);
        root.source = Some(SourceOrigin {
            span: region,
            open_tag: Span::new(region.start, region.start),
            content: Some(region),
            fragment: self.source[region.start..region.end].to_string(),
            snapshot: root.snapshot(),
        });

        let tree = ElementTree::with_generator(root, self.ids)
            .map_err(|e| ParseError::invalid_syntax(region, e.to_string()))?;

        debug!(
            imports = self.imports.len(),
            nodes = tree.count_nodes(),
            "Parsed markup source"
        );

        Ok(ParsedDocument {
            imports: self.imports,
            tree,
        })
    }

    /// Parse leading imports, returning the offset right after the last one
    fn parse_prelude(&mut self) -> ParseResult<usize> {
        let mut end = 0;
        loop {
            self.skip_trivia();
            match self.peek() {
                Some((token, _)) if token.is_keyword("import") => {
                    let import = self.parse_import()?;
                    end = import.span.end;
                    self.imports.push(import);
                }
                _ => return Ok(end),
            }
        }
    }

    fn parse_import(&mut self) -> ParseResult<Import> {
        let start = self.pos;
        self.expect_keyword("import")?;

        let mut bindings = Vec::new();
        match self.next("import clause")? {
            (Token::Star, _) => {
                self.expect_keyword("as")?;
                let local = self.expect_ident("namespace name")?;
                bindings.push(ImportBinding {
                    imported: "*".to_string(),
                    local,
                    import_type: ImportType::Namespace,
                });
            }
            (Token::LBrace, _) => {
                self.parse_named_bindings(&mut bindings)?;
            }
            (Token::Ident(local), _) => {
                bindings.push(ImportBinding {
                    imported: "default".to_string(),
                    local: local.to_string(),
                    import_type: ImportType::Default,
                });
                if self.eat(&Token::Comma) {
                    self.expect(&Token::LBrace, "'{'")?;
                    self.parse_named_bindings(&mut bindings)?;
                }
            }
            (other, span) => {
                return Err(ParseError::unexpected_token(span, "import clause", other.describe()));
            }
        }

        self.expect_keyword("from")?;
        let package = match self.next("package name")? {
            (Token::DoubleString(s), _) | (Token::SingleString(s), _) => unquote(s),
            (other, span) => {
                return Err(ParseError::unexpected_token(span, "package name", other.describe()));
            }
        };
        self.eat(&Token::Semicolon);

        Ok(Import {
            package,
            bindings,
            span: Span::new(start, self.pos),
        })
    }

    fn parse_named_bindings(&mut self, bindings: &mut Vec<ImportBinding>) -> ParseResult<()> {
        loop {
            match self.next("imported name or '}'")? {
                (Token::RBrace, _) => return Ok(()),
                (Token::Ident(imported), _) => {
                    let local = if self.peek_keyword("as") {
                        self.expect_keyword("as")?;
                        self.expect_ident("local name")?
                    } else {
                        imported.to_string()
                    };
                    bindings.push(ImportBinding {
                        imported: imported.to_string(),
                        local,
                        import_type: ImportType::Named,
                    });
                    self.eat(&Token::Comma);
                }
                (other, span) => {
                    return Err(ParseError::unexpected_token(
                        span,
                        "imported name or '}'",
                        other.describe(),
                    ));
                }
            }
        }
    }

    fn parse_element(&mut self) -> ParseResult<ElementNode> {
        let (_, open_span) = self.expect(&Token::LAngle, "'<'")?;
        let start = open_span.start;
        let id = self.ids.new_id();

        let tag = self.expect_ident("tag name")?;
        let mut node = ElementNode::new(id, tag.clone());
        node.component_info = self.component_info_for(&tag);

        let self_closing = loop {
            match self.next("attribute, '>' or '/>'")? {
                (Token::RAngle, _) => break false,
                (Token::SelfClose, _) => break true,
                (Token::Ident(name), _) => {
                    let value = if self.eat(&Token::Equals) {
                        self.parse_attribute_value()?
                    } else {
                        AttrValue::Flag
                    };
                    apply_attribute(&mut node, name, value);
                }
                (Token::LBrace, span) => {
                    return Err(ParseError::invalid_syntax(
                        span,
                        "spread attributes are not supported",
                    ));
                }
                (other, span) => {
                    return Err(ParseError::unexpected_token(
                        span,
                        "attribute, '>' or '/>'",
                        other.describe(),
                    ));
                }
            }
        };
        let open_tag = Span::new(start, self.pos);

        let content = if self_closing {
            None
        } else {
            Some(self.parse_children(&mut node, &tag)?)
        };

        let span = Span::new(start, self.pos);
        node.source = Some(SourceOrigin {
            span,
            open_tag,
            content,
            fragment: self.source[span.start..span.end].to_string(),
            snapshot: node.snapshot(),
        });
        Ok(node)
    }

    /// Parse children up to and including the closing tag; returns the content span
    fn parse_children(&mut self, node: &mut ElementNode, tag: &str) -> ParseResult<Span> {
        let content_start = self.pos;
        let mut children = Vec::new();
        let mut text_runs = 0;

        let content_end = loop {
            let text_start = self.pos;
            let offset = self
                .rest()
                .find(|c: char| c == '<' || c == '{')
                .ok_or_else(|| ParseError::unexpected_eof(format!("</{}>", tag)))?;
            let text_end = text_start + offset;

            if let Some(span) = trimmed_span(self.source, text_start, text_end) {
                text_runs += 1;
                children.push(self.text_node(span));
            }
            self.pos = text_end;

            if self.rest().starts_with("</") {
                let close_start = self.pos;
                self.expect(&Token::CloseTagOpen, "'</'")?;
                let (token, span) = self.next("closing tag name")?;
                match token {
                    Token::Ident(found) if found == tag => {}
                    Token::Ident(found) => {
                        return Err(ParseError::MismatchedClosingTag {
                            span,
                            expected: tag.to_string(),
                            found: found.to_string(),
                        });
                    }
                    other => {
                        return Err(ParseError::unexpected_token(
                            span,
                            "closing tag name",
                            other.describe(),
                        ));
                    }
                }
                self.expect(&Token::RAngle, "'>'")?;
                break close_start;
            } else if self.rest().starts_with('{') {
                let span = self.scan_braced(self.pos)?;
                self.pos = span.end;
                children.push(self.expression_node(span));
            } else {
                children.push(self.parse_element()?);
            }
        };

        // A lone text run is the element's own text, not a child node
        if text_runs == 1 && children.len() == 1 {
            if let Some(text) = children.pop().and_then(|child| child.text_content) {
                node.text_content = Some(text);
            }
        } else {
            node.children = children;
        }

        Ok(Span::new(content_start, content_end))
    }

    fn text_node(&mut self, span: Span) -> ElementNode {
        let text = &self.source[span.start..span.end];
        let mut node = ElementNode::new(self.ids.new_id(), TEXT_TYPE).with_text(text);
        node.source = Some(leaf_origin(&node, span, text));
        node
    }

    fn expression_node(&mut self, span: Span) -> ElementNode {
        let raw = &self.source[span.start..span.end];
        let inner = &raw[1..raw.len() - 1];
        let mut node = ElementNode::new(self.ids.new_id(), EXPRESSION_TYPE).with_text(inner);
        node.source = Some(leaf_origin(&node, span, raw));
        node
    }

    fn parse_attribute_value(&mut self) -> ParseResult<AttrValue> {
        match self.peek() {
            Some((Token::DoubleString(s), _)) | Some((Token::SingleString(s), _)) => {
                self.next("attribute value")?;
                Ok(AttrValue::Literal(unquote(s)))
            }
            Some((Token::LBrace, span)) => {
                let braced = self.scan_braced(span.start)?;
                self.pos = braced.end;
                Ok(AttrValue::Expression(
                    self.source[braced.start..braced.end].to_string(),
                ))
            }
            Some((other, span)) => Err(ParseError::unexpected_token(
                span,
                "attribute value",
                other.describe(),
            )),
            None => Err(ParseError::unexpected_eof("attribute value")),
        }
    }

    /// Find the balanced `{...}` starting at `start`, skipping over string literals
    fn scan_braced(&self, start: usize) -> ParseResult<Span> {
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for (offset, c) in self.source[start..].char_indices() {
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }

            match c {
                '"' | '\'' | '`' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(Span::new(start, start + offset + 1));
                    }
                }
                _ => {}
            }
        }

        Err(ParseError::unexpected_eof("'}'"))
    }

    fn component_info_for(&self, tag: &str) -> Option<ComponentInfo> {
        let first = tag.chars().next()?;
        let (base, member) = match tag.split_once('.') {
            Some((base, member)) => (base, Some(member)),
            None => (tag, None),
        };
        if !first.is_ascii_uppercase() && member.is_none() {
            return None;
        }

        let info = match resolve_local(&self.imports, base) {
            Some((package, binding)) => {
                let import_name = match (binding.import_type, member) {
                    (ImportType::Namespace, Some(member)) => member.to_string(),
                    (ImportType::Namespace, None) => binding.local.clone(),
                    (ImportType::Default, Some(member)) => format!("{}.{}", binding.local, member),
                    (ImportType::Default, None) => binding.local.clone(),
                    (ImportType::Named, Some(member)) => format!("{}.{}", binding.imported, member),
                    (ImportType::Named, None) => binding.imported.clone(),
                };
                ComponentInfo {
                    is_component: true,
                    package_name: package.to_string(),
                    import_name,
                    import_type: binding.import_type,
                }
            }
            None => ComponentInfo {
                is_component: true,
                package_name: String::new(),
                import_name: tag.to_string(),
                import_type: ImportType::Named,
            },
        };
        Some(info)
    }

    // Token helpers

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Skip whitespace and `//` / `/* */` comments between top-level items
    fn skip_trivia(&mut self) {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                let skip = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += skip;
            } else if trimmed.starts_with("/*") {
                let skip = trimmed.find("*/").map(|i| i + 2).unwrap_or(trimmed.len());
                self.pos += skip;
            } else {
                return;
            }
        }
    }

    fn peek(&self) -> Option<(Token<'src>, Span)> {
        match lex_at(self.source, self.pos) {
            Lexed::Token(token, span) => Some((token, span)),
            _ => None,
        }
    }

    fn peek_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some((token, _)) if token.is_keyword(word))
    }

    fn next(&mut self, expected: &str) -> ParseResult<(Token<'src>, Span)> {
        match lex_at(self.source, self.pos) {
            Lexed::Token(token, span) => {
                self.pos = span.end;
                Ok((token, span))
            }
            Lexed::Invalid(span) => Err(ParseError::LexError { span }),
            Lexed::End => Err(ParseError::unexpected_eof(expected)),
        }
    }

    fn eat(&mut self, want: &Token<'_>) -> bool {
        match self.peek() {
            Some((token, span)) if token == *want => {
                self.pos = span.end;
                true
            }
            _ => false,
        }
    }

    fn expect(&mut self, want: &Token<'_>, expected: &str) -> ParseResult<(Token<'src>, Span)> {
        let (token, span) = self.next(expected)?;
        if token == *want {
            Ok((token, span))
        } else {
            Err(ParseError::unexpected_token(span, expected, token.describe()))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> ParseResult<String> {
        match self.next(expected)? {
            (Token::Ident(name), _) => Ok(name.to_string()),
            (other, span) => Err(ParseError::unexpected_token(span, expected, other.describe())),
        }
    }

    fn expect_keyword(&mut self, word: &str) -> ParseResult<()> {
        let (token, span) = self.next(word)?;
        if token.is_keyword(word) {
            Ok(())
        } else {
            Err(ParseError::unexpected_token(span, format!("'{}'", word), token.describe()))
        }
    }
}

fn leaf_origin(node: &ElementNode, span: Span, fragment: &str) -> SourceOrigin {
    SourceOrigin {
        span,
        open_tag: span,
        content: None,
        fragment: fragment.to_string(),
        snapshot: node.snapshot(),
    }
}

/// Span of `source[start..end]` without surrounding whitespace, if anything remains
fn trimmed_span(source: &str, start: usize, end: usize) -> Option<Span> {
    let raw = &source[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = raw.len() - raw.trim_start().len();
    Some(Span::new(start + lead, start + lead + trimmed.len()))
}

fn apply_attribute(node: &mut ElementNode, name: &str, value: AttrValue) {
    match (name, value) {
        ("className" | "class", AttrValue::Literal(class_name)) => {
            node.class_name = class_name;
        }
        ("style", AttrValue::Expression(raw)) => match parse_style_object(&raw) {
            Some(style) => node.style = style,
            None => {
                debug!(node_id = %node.id, "Keeping unrecognized style expression verbatim");
                node.attributes.insert(name.to_string(), raw);
            }
        },
        (ANIMATION_ATTRIBUTE, AttrValue::Literal(json)) => {
            match serde_json::from_str::<AnimationConfig>(&json) {
                Ok(config) => node.animations = Some(config),
                Err(err) => {
                    debug!(node_id = %node.id, error = %err, "Animation attribute is not a config");
                    node.attributes.insert(name.to_string(), json);
                }
            }
        }
        (_, AttrValue::Literal(literal)) => {
            node.attributes.insert(name.to_string(), encode_literal(&literal));
        }
        (_, AttrValue::Expression(raw)) => {
            node.attributes.insert(name.to_string(), raw);
        }
        (_, AttrValue::Flag) => {
            node.attributes.insert(name.to_string(), "{true}".to_string());
        }
    }
}

/// Literals that look like expressions are re-encoded as string expressions
fn encode_literal(literal: &str) -> String {
    if is_expression_value(literal) {
        let quoted = serde_json::to_string(literal).unwrap_or_else(|_| format!("\"{}\"", literal));
        format!("{{{}}}", quoted)
    } else {
        literal.to_string()
    }
}

/// Whether an attribute value is stored as a braced expression
pub fn is_expression_value(value: &str) -> bool {
    value.len() >= 2 && value.starts_with('{') && value.ends_with('}')
}

/// A string that would print back as a bare number keeps its quotes as `{"100"}`
fn style_string(value: String) -> String {
    if value.trim().parse::<f64>().is_ok() {
        let quoted = serde_json::to_string(&value).unwrap_or_else(|_| format!("\"{}\"", value));
        format!("{{{}}}", quoted)
    } else {
        value
    }
}

/// Parse the inside of `style={{ ... }}`; `None` if it is not a plain object literal
fn parse_style_object(raw: &str) -> Option<IndexMap<String, String>> {
    if !(raw.starts_with("{{") && raw.ends_with("}}")) {
        return None;
    }
    let inner = &raw[1..raw.len() - 1];
    let mut style = IndexMap::new();
    let mut pos = 0;

    let next = |pos: &mut usize| match lex_at(inner, *pos) {
        Lexed::Token(token, span) => {
            *pos = span.end;
            Some(token)
        }
        _ => None,
    };

    if next(&mut pos)? != Token::LBrace {
        return None;
    }

    loop {
        let key = match next(&mut pos)? {
            Token::RBrace => break,
            Token::Ident(key) => key.to_string(),
            Token::DoubleString(s) | Token::SingleString(s) => unquote(s),
            _ => return None,
        };
        if next(&mut pos)? != Token::Colon {
            return None;
        }
        let value = match next(&mut pos)? {
            Token::DoubleString(s) | Token::SingleString(s) => style_string(unquote(s)),
            Token::Number(n) => n.to_string(),
            Token::Ident(ident) => format!("{{{}}}", ident),
            _ => return None,
        };
        style.insert(key, value);

        match next(&mut pos)? {
            Token::Comma => {}
            Token::RBrace => break,
            _ => return None,
        }
    }

    if inner[pos..].trim().is_empty() {
        Some(style)
    } else {
        None
    }
}
