// ABOUTME: Pretty printer turning expression trees back into surface text

use crate::expr::{is_integer_literal, Expr};

/// Render an expression as surface syntax. Parsing the result yields a tree
/// structurally equal to the input.
pub fn print_expr(expr: &Expr) -> String {
    match expr {
        Expr::Variable(name) => name.clone(),
        Expr::Literal(text) => {
            if is_integer_literal(text) {
                text.clone()
            } else {
                format!("\"{text}\"")
            }
        }
        Expr::Abstraction { param, body } => {
            format!("(lambda {param} . {})", print_expr(body))
        }
        Expr::Application { func, args } => {
            let mut parts = vec![print_expr(func)];
            parts.extend(args.iter().map(print_expr));
            format!("({})", parts.join(" "))
        }
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => format!(
            "(if {} {} {})",
            print_expr(cond),
            print_expr(then_branch),
            print_expr(else_branch)
        ),
        Expr::Define { name, value } => format!("(define {name} {})", print_expr(value)),
        Expr::LetRec { bindings, body } => {
            let bound = bindings
                .iter()
                .map(|(name, value)| format!("({name} {})", print_expr(value)))
                .collect::<Vec<_>>()
                .join(" ");
            let exprs = body.iter().map(print_expr).collect::<Vec<_>>().join(" ");
            format!("(letrec ({bound}) {exprs})")
        }
        Expr::DefMacro { name, params, body } => {
            format!("(defmacro {name} ({}) {})", params.join(" "), print_expr(body))
        }
        Expr::Quote(inner) => format!("'{}", print_expr(inner)),
        Expr::Quasiquote(inner) => format!("`{}", print_expr(inner)),
        Expr::Unquote(inner) => format!(",{}", print_expr(inner)),
        Expr::Embedded(value) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::tokenizer::tokenize;

    fn roundtrip(source: &str) {
        let tokens = tokenize(source, "<test>").unwrap();
        let expr = parse(&tokens).unwrap();
        let printed = print_expr(&expr);
        let reparsed = parse(&tokenize(&printed, "<test>").unwrap()).unwrap();
        assert_eq!(expr, reparsed, "round trip changed {source:?} -> {printed:?}");
    }

    #[test]
    fn test_print_atoms() {
        roundtrip("x");
        roundtrip("42");
        roundtrip("\"hello\"");
    }

    #[test]
    fn test_print_lambda() {
        let tokens = tokenize("(lambda x . x)", "<test>").unwrap();
        let expr = parse(&tokens).unwrap();
        assert_eq!(print_expr(&expr), "(lambda x . x)");
    }

    #[test]
    fn test_print_application() {
        let tokens = tokenize("(+ 1 2)", "<test>").unwrap();
        let expr = parse(&tokens).unwrap();
        assert_eq!(print_expr(&expr), "(+ 1 2)");
    }

    #[test]
    fn test_roundtrip_core_forms() {
        roundtrip("(lambda x . (+ x 1))");
        roundtrip("(if (= n 0) 1 (* n 2))");
        roundtrip("(define sq (lambda x . (* x x)))");
        roundtrip("(letrec ((a 1) (b 2)) (+ a b) b)");
        roundtrip("(defmacro when (c b) (if c b nil))");
        roundtrip("(f)");
        roundtrip("((f g) h)");
    }

    #[test]
    fn test_roundtrip_quoting_forms() {
        roundtrip("'x");
        roundtrip("'(1 2 3)");
        roundtrip("`(+ 1 ,x)");
        roundtrip("(quote (quote x))");
    }

    #[test]
    fn test_string_literals_keep_quotes() {
        let tokens = tokenize("\"abc\"", "<test>").unwrap();
        let expr = parse(&tokens).unwrap();
        assert_eq!(print_expr(&expr), "\"abc\"");
    }
}
