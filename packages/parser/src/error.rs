//! Error types for the markup parser

use thiserror::Error;
use trellis_tree::Span;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {span:?}: expected {expected}, found {found}")]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Mismatched closing tag at {span:?}: expected </{expected}>, found </{found}>")]
    MismatchedClosingTag {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Invalid syntax at {span:?}: {message}")]
    InvalidSyntax { span: Span, message: String },

    #[error("Lexer error at {span:?}")]
    LexError { span: Span },
}

impl ParseError {
    pub fn unexpected_token(span: Span, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
        }
    }

    pub fn invalid_syntax(span: Span, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::MismatchedClosingTag { span, .. }
            | ParseError::InvalidSyntax { span, .. }
            | ParseError::LexError { span } => Some(*span),
            ParseError::UnexpectedEof { .. } => None,
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
            ParseError::UnexpectedEof { expected } => format!("expected {}", expected),
            ParseError::MismatchedClosingTag { expected, .. } => format!("expected </{}>", expected),
            ParseError::InvalidSyntax { message, .. } => message.clone(),
            ParseError::LexError { .. } => "unrecognized input".to_string(),
        }
    }
}

/// Pretty-print an error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error.span().unwrap_or(Span {
        start: source.len().saturating_sub(1),
        end: source.len(),
    });

    let mut output = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span.start..span.end))
                .with_color(Color::Red)
                .with_message(error.label()),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output);

    match written {
        Ok(()) => String::from_utf8(output).unwrap_or_else(|_| error.to_string()),
        Err(_) => error.to_string(),
    }
}

/// Plain rendering used when ariadne is compiled out
#[cfg(not(feature = "pretty-errors"))]
pub fn format_error(_source: &str, filename: &str, error: &ParseError) -> String {
    format!("{}: {} ({})", filename, error, error.label())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_accessor() {
        let err = ParseError::invalid_syntax(Span::new(3, 5), "bad");
        assert_eq!(err.span(), Some(Span::new(3, 5)));
        assert_eq!(ParseError::unexpected_eof("'>'").span(), None);
    }

    #[test]
    fn test_format_mentions_message() {
        let source = "<div></span>";
        let err = ParseError::MismatchedClosingTag {
            span: Span::new(5, 12),
            expected: "div".to_string(),
            found: "span".to_string(),
        };
        let formatted = format_error(source, "page.tsx", &err);
        assert!(formatted.contains("Mismatched closing tag"));
    }
}
