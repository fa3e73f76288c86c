//! Evaluation of parsed substitutions against a variable set

use indexmap::IndexMap;

use crate::error::ExpressionError;
use crate::expr::ast::{BinaryOp, Expr, Node, Substitution};
use crate::expr::grammar::parse;
use crate::model::Value;

/// Variables visible to a substitution, keyed without the leading dot
pub type Variables = IndexMap<String, Value>;

impl Substitution {
    /// Render against `vars`. Unset variables print nothing.
    pub fn render(&self, vars: &Variables) -> String {
        let mut out = String::new();
        render_nodes(&self.nodes, vars, &mut out);
        out
    }
}

fn render_nodes(nodes: &[Node], vars: &Variables, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Output(expr) => out.push_str(&evaluate(expr, vars).to_string()),
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if evaluate(condition, vars).is_truthy() {
                    render_nodes(then_branch, vars, out);
                } else {
                    render_nodes(else_branch, vars, out);
                }
            }
        }
    }
}

/// Evaluate a single expression.
///
/// `and`/`or` short-circuit and yield one of their operands, so
/// `{{ or .label "untitled" }}` doubles as a fallback.
pub fn evaluate(expr: &Expr, vars: &Variables) -> Value {
    match expr {
        Expr::Variable(name) => vars.get(name).cloned().unwrap_or_default(),
        Expr::Literal(value) => value.clone(),
        Expr::Not(inner) => Value::Bool(!evaluate(inner, vars).is_truthy()),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = evaluate(lhs, vars);
            match op {
                BinaryOp::And if !lhs.is_truthy() => lhs,
                BinaryOp::Or if lhs.is_truthy() => lhs,
                BinaryOp::And | BinaryOp::Or => evaluate(rhs, vars),
                BinaryOp::Eq => Value::Bool(loosely_equal(&lhs, &evaluate(rhs, vars))),
                BinaryOp::Ne => Value::Bool(!loosely_equal(&lhs, &evaluate(rhs, vars))),
            }
        }
    }
}

/// Same-kind values compare structurally; mixed kinds compare by their
/// printed form, so `eq .width "120"` holds for a numeric width.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if a.kind() == b.kind() {
        a == b
    } else {
        a.to_string() == b.to_string()
    }
}

/// Parse and render `source` in one step.
///
/// Strings without `{{` are returned as-is without parsing.
pub fn render(source: &str, vars: &Variables) -> Result<String, ExpressionError> {
    if !source.contains("{{") {
        return Ok(source.to_string());
    }
    match parse(source) {
        Ok(substitution) => Ok(substitution.render(vars)),
        Err(errors) => Err(errors
            .into_iter()
            .next()
            .unwrap_or_else(|| ExpressionError::Syntax {
                span: 0..source.len(),
                message: "invalid substitution".to_string(),
                expected: Vec::new(),
            })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, Value)]) -> Variables {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_variables_and_literal_text() {
        let v = vars(&[("name", "web".into()), ("width", 120.0.into())]);
        assert_eq!(render("{{ .name }}-{{.width}}px", &v).unwrap(), "web-120px");
    }

    #[test]
    fn test_unset_variable_prints_nothing() {
        assert_eq!(render("[{{ .missing }}]", &Variables::new()).unwrap(), "[]");
    }

    #[test]
    fn test_no_actions_is_identity() {
        assert_eq!(render("#E3F2FD", &Variables::new()).unwrap(), "#E3F2FD");
    }

    #[test]
    fn test_conditionals() {
        let template = r#"{{ if eq .tier "db" }}cylinder{{ else }}rectangle{{ end }}"#;
        assert_eq!(
            render(template, &vars(&[("tier", "db".into())])).unwrap(),
            "cylinder"
        );
        assert_eq!(
            render(template, &vars(&[("tier", "web".into())])).unwrap(),
            "rectangle"
        );
        assert_eq!(render(template, &Variables::new()).unwrap(), "rectangle");
    }

    #[test]
    fn test_boolean_connectives() {
        let v = vars(&[("a", true.into()), ("b", false.into()), ("n", 0.0.into())]);
        assert_eq!(render("{{ and .a .b }}", &v).unwrap(), "false");
        assert_eq!(render("{{ or .b .a }}", &v).unwrap(), "true");
        assert_eq!(render("{{ not .n }}", &v).unwrap(), "true");
        assert_eq!(render("{{ ne .a .b }}", &v).unwrap(), "true");
        assert_eq!(render(r#"{{ or .label "untitled" }}"#, &v).unwrap(), "untitled");
    }

    #[test]
    fn test_mixed_kind_equality() {
        let v = vars(&[("width", 120.0.into())]);
        assert_eq!(render(r#"{{ eq .width "120" }}"#, &v).unwrap(), "true");
        assert_eq!(render("{{ eq .width 120 }}", &v).unwrap(), "true");
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let err = render("{{ if .a }}", &Variables::new()).unwrap_err();
        assert!(matches!(err, ExpressionError::Syntax { .. }));
    }
}
