//! Error types for substitution expressions

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::expr::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("syntax error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("unclosed action starting at offset {}", span.start)]
    Unclosed { span: Span },

    #[error("unexpected character {text:?} at offset {}", span.start)]
    InvalidToken { span: Span, text: String },
}

impl ExpressionError {
    pub fn span(&self) -> Span {
        match self {
            ExpressionError::Syntax { span, .. }
            | ExpressionError::Unclosed { span }
            | ExpressionError::InvalidToken { span, .. } => span.clone(),
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span();
        let (message, note) = match self {
            ExpressionError::Syntax {
                message, expected, ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (message.clone(), format!("{}{}", message, expected_str))
            }
            ExpressionError::Unclosed { .. } => (
                "unclosed action".to_string(),
                "this `{{` has no matching `}}`".to_string(),
            ),
            ExpressionError::InvalidToken { text, .. } => (
                format!("unexpected character {:?}", text),
                "not valid inside an action".to_string(),
            ),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(note)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ExpressionError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ExpressionError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Text(s) => format!("text {:?}", s),
        Token::Open => "'{{'".to_string(),
        Token::Close => "'}}'".to_string(),
        Token::If => "keyword 'if'".to_string(),
        Token::Else => "keyword 'else'".to_string(),
        Token::End => "keyword 'end'".to_string(),
        Token::Eq => "function 'eq'".to_string(),
        Token::Ne => "function 'ne'".to_string(),
        Token::And => "function 'and'".to_string(),
        Token::Or => "function 'or'".to_string(),
        Token::Not => "function 'not'".to_string(),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Field(name) => format!("variable '.{}'", name),
        Token::Ident(name) => format!("unknown function '{}'", name),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse;

    #[test]
    fn test_token_descriptions() {
        assert_eq!(
            format_token(&Token::Ident("printf".into())),
            "unknown function 'printf'"
        );
        assert_eq!(format_token(&Token::Field("name".into())), "variable '.name'");
    }

    #[test]
    fn test_format_includes_source_and_filename() {
        let source = "{{ .name";
        let err = parse(source).unwrap_err().remove(0);
        let report = err.format(source, "label");
        assert!(report.contains("unclosed action"));
        assert!(report.contains("label"));
    }
}
