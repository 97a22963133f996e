use logos::Logos;
use trellis_tree::Span;

/// Tokens found inside tags, style objects and import statements.
///
/// Text between tags is not tokenized; the parser scans it raw so whitespace
/// and punctuation survive exactly as written.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token<'src> {
    #[token("</")]
    CloseTagOpen,

    #[token("<")]
    LAngle,

    #[token("/>")]
    SelfClose,

    #[token(">")]
    RAngle,

    #[token("=")]
    Equals,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,

    #[token("*")]
    Star,

    // Tag names (`Icons.Home`), attribute names (`aria-label`), keywords
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$.\-]*", |lex| lex.slice())]
    Ident(&'src str),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| lex.slice())]
    DoubleString(&'src str),

    #[regex(r"'([^'\\]|\\.)*'", |lex| lex.slice())]
    SingleString(&'src str),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'src str),
}

impl<'src> Token<'src> {
    pub fn describe(&self) -> String {
        match self {
            Token::CloseTagOpen => "'</'".to_string(),
            Token::LAngle => "'<'".to_string(),
            Token::SelfClose => "'/>'".to_string(),
            Token::RAngle => "'>'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::LBrace => "'{'".to_string(),
            Token::RBrace => "'}'".to_string(),
            Token::Colon => "':'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::DoubleString(s) | Token::SingleString(s) => format!("string {}", s),
            Token::Number(n) => format!("number {}", n),
        }
    }

    /// Whether this token is the keyword `word`
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Token::Ident(name) if *name == word)
    }
}

/// Outcome of lexing one token at a byte offset
#[derive(Debug, Clone, PartialEq)]
pub enum Lexed<'src> {
    Token(Token<'src>, Span),
    Invalid(Span),
    End,
}

/// Lex a single token starting at `offset`, skipping leading whitespace.
/// Spans are absolute offsets into `source`.
pub fn lex_at(source: &str, offset: usize) -> Lexed<'_> {
    let rest = &source[offset..];
    let mut lexer = Token::lexer(rest);
    match lexer.next() {
        Some(Ok(token)) => {
            let range = lexer.span();
            Lexed::Token(token, Span::new(offset + range.start, offset + range.end))
        }
        Some(Err(())) => {
            let range = lexer.span();
            Lexed::Invalid(Span::new(offset + range.start, offset + range.end))
        }
        None => Lexed::End,
    }
}

/// Tokenize a whole string (used by tests and diagnostics)
pub fn tokenize(source: &str) -> Vec<(Token<'_>, std::ops::Range<usize>)> {
    Token::lexer(source)
        .spanned()
        .filter_map(|(token, span)| token.ok().map(|t| (t, span)))
        .collect()
}

/// Strip the quotes from a string literal. Markup attribute strings have no
/// escape sequences, so the inside is kept as written.
pub fn unquote(literal: &str) -> String {
    let quoted = literal.len() >= 2
        && (literal.starts_with('"') && literal.ends_with('"')
            || literal.starts_with('\'') && literal.ends_with('\''));
    if quoted {
        literal[1..literal.len() - 1].to_string()
    } else {
        literal.to_string()
    }
}
