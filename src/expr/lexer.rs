//! Lexer for substitution strings
//!
//! Literal text outside `{{ ... }}` becomes a single [`Token::Text`]; the
//! inside of each action is tokenized with logos.

use logos::Logos;

use crate::error::ExpressionError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Tokens of a substitution string
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal text between actions
    Text(String),
    /// `{{`
    Open,
    /// `}}`
    Close,
    If,
    Else,
    End,
    Eq,
    Ne,
    And,
    Or,
    Not,
    True,
    False,
    ParenOpen,
    ParenClose,
    /// `.name`, stored without the dot
    Field(String),
    Ident(String),
    Str(String),
    Number(f64),
}

/// Tokens that can appear inside `{{ ... }}`
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum ActionToken {
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("end")]
    End,

    #[token("eq")]
    Eq,
    #[token("ne")]
    Ne,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,

    #[regex(r"\.[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice()[1..].to_string())]
    Field(String),

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

impl From<ActionToken> for Token {
    fn from(tok: ActionToken) -> Self {
        match tok {
            ActionToken::If => Token::If,
            ActionToken::Else => Token::Else,
            ActionToken::End => Token::End,
            ActionToken::Eq => Token::Eq,
            ActionToken::Ne => Token::Ne,
            ActionToken::And => Token::And,
            ActionToken::Or => Token::Or,
            ActionToken::Not => Token::Not,
            ActionToken::True => Token::True,
            ActionToken::False => Token::False,
            ActionToken::ParenOpen => Token::ParenOpen,
            ActionToken::ParenClose => Token::ParenClose,
            ActionToken::Field(name) => Token::Field(name),
            ActionToken::Ident(name) => Token::Ident(name),
            ActionToken::Str(s) => Token::Str(s),
            ActionToken::Number(n) => Token::Number(n),
        }
    }
}

fn unescape(quoted: &str) -> String {
    let inner = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Tokenize a substitution string.
///
/// Spans are byte offsets into `input`, including those of tokens inside
/// actions.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(found) = input[pos..].find("{{") {
        let open = pos + found;
        if open > pos {
            tokens.push((Token::Text(input[pos..open].to_string()), pos..open));
        }

        let inner_start = open + 2;
        let Some(close) = input[inner_start..].find("}}") else {
            return Err(ExpressionError::Unclosed {
                span: open..input.len(),
            });
        };
        let inner_end = inner_start + close;

        tokens.push((Token::Open, open..inner_start));
        for (tok, span) in ActionToken::lexer(&input[inner_start..inner_end]).spanned() {
            let span = span.start + inner_start..span.end + inner_start;
            match tok {
                Ok(tok) => tokens.push((tok.into(), span)),
                Err(()) => {
                    return Err(ExpressionError::InvalidToken {
                        text: input[span.clone()].to_string(),
                        span,
                    })
                }
            }
        }
        tokens.push((Token::Close, inner_end..inner_end + 2));

        pos = inner_end + 2;
    }

    if pos < input.len() {
        tokens.push((Token::Text(input[pos..].to_string()), pos..input.len()));
    }

    Ok(tokens)
}
