//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ExpressionError;
use crate::expr::ast::*;
use crate::expr::lexer::{lex, Token};
use crate::model::Value;

/// Parse a substitution string into its syntax tree
pub fn parse(input: &str) -> Result<Substitution, Vec<ExpressionError>> {
    let len = input.len();

    let token_iter = lex(input)
        .map_err(|e| vec![e])?
        .into_iter()
        .map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    substitution_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let literal = select! {
            Token::Field(name) => Expr::Variable(name),
            Token::Str(s) => Expr::Literal(Value::String(s)),
            Token::Number(n) => Expr::Literal(Value::Number(n)),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
        };

        let term = literal.or(expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)));

        // Functions take their operands prefix-style: `eq .a .b`
        let operator = select! {
            Token::Eq => BinaryOp::Eq,
            Token::Ne => BinaryOp::Ne,
            Token::And => BinaryOp::And,
            Token::Or => BinaryOp::Or,
        };

        let binary = operator
            .then(term.clone())
            .then(term.clone())
            .map(|((op, lhs), rhs)| Expr::binary(op, lhs, rhs));

        let not = just(Token::Not)
            .ignore_then(term.clone())
            .map(|e| Expr::Not(Box::new(e)));

        choice((binary, not, term)).boxed()
    })
}

/// `{{ keyword }}` with nothing else inside
fn keyword_action<'a, I>(keyword: Token) -> impl Parser<'a, I, (), extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    just(Token::Open)
        .then(just(keyword))
        .then(just(Token::Close))
        .ignored()
}

fn substitution_parser<'a, I>(
) -> impl Parser<'a, I, Substitution, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let expr = expr_parser();

    let nodes = recursive(|nodes| {
        let text = select! {
            Token::Text(s) => Node::Text(s),
        };

        let else_branch = keyword_action(Token::Else).ignore_then(nodes.clone());

        let if_block = just(Token::Open)
            .ignore_then(just(Token::If))
            .ignore_then(expr.clone())
            .then_ignore(just(Token::Close))
            .then(nodes.clone())
            .then(else_branch.or_not())
            .then_ignore(keyword_action(Token::End))
            .map(|((condition, then_branch), else_branch)| Node::If {
                condition,
                then_branch,
                else_branch: else_branch.unwrap_or_default(),
            });

        let output = expr
            .clone()
            .delimited_by(just(Token::Open), just(Token::Close))
            .map(Node::Output);

        choice((text, if_block, output))
            .repeated()
            .collect::<Vec<Node>>()
            .boxed()
    });

    nodes.then_ignore(end()).map(|nodes| Substitution { nodes })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only() {
        let parsed = parse("plain").unwrap();
        assert_eq!(parsed.nodes, vec![Node::Text("plain".into())]);
    }

    #[test]
    fn test_variable_output() {
        let parsed = parse("{{ .name }}-box").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![
                Node::Output(Expr::variable("name")),
                Node::Text("-box".into()),
            ]
        );
    }

    #[test]
    fn test_nested_functions() {
        let parsed = parse(r#"{{ and (eq .tier "db") (not .public) }}"#).unwrap();
        assert_eq!(
            parsed.nodes,
            vec![Node::Output(Expr::binary(
                BinaryOp::And,
                Expr::binary(
                    BinaryOp::Eq,
                    Expr::variable("tier"),
                    Expr::Literal(Value::from("db"))
                ),
                Expr::Not(Box::new(Expr::variable("public"))),
            ))]
        );
    }

    #[test]
    fn test_if_else_block() {
        let parsed = parse("{{ if .x }}yes{{ else }}no{{ end }}").unwrap();
        assert_eq!(
            parsed.nodes,
            vec![Node::If {
                condition: Expr::variable("x"),
                then_branch: vec![Node::Text("yes".into())],
                else_branch: vec![Node::Text("no".into())],
            }]
        );
    }

    #[test]
    fn test_nested_if_without_else() {
        let parsed = parse("{{if .a}}{{if .b}}ab{{end}}{{end}}").unwrap();
        let [Node::If { then_branch, else_branch, .. }] = parsed.nodes.as_slice() else {
            panic!("expected one if block, got {:?}", parsed.nodes);
        };
        assert!(else_branch.is_empty());
        assert!(matches!(then_branch.as_slice(), [Node::If { .. }]));
    }

    #[test]
    fn test_missing_end_is_an_error() {
        assert!(parse("{{ if .a }}x").is_err());
    }

    #[test]
    fn test_stray_end_is_an_error() {
        assert!(parse("x{{ end }}").is_err());
    }

    #[test]
    fn test_unknown_function_is_an_error() {
        let errs = parse("{{ printf .a }}").unwrap_err();
        assert!(matches!(errs[0], ExpressionError::Syntax { .. }));
    }

    #[test]
    fn test_lex_errors_surface() {
        let errs = parse("{{ .a").unwrap_err();
        assert!(matches!(errs[0], ExpressionError::Unclosed { .. }));
    }
}
