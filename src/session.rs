// ABOUTME: Interpreter session tying tokenizer, parser, macros and evaluator together

use crate::builtins;
use crate::env::Environment;
use crate::error::LambError;
use crate::eval;
use crate::expr::Expr;
use crate::macros;
use crate::parser;
use crate::tokenizer;
use crate::value::Value;
use std::rc::Rc;

const PRELUDE: &str = include_str!("stdlib/std.lamb");

/// One interpreter session: a top-level environment populated with the
/// builtins and, usually, the prelude. Embedders hold a `Session` instead of
/// reaching for any global state.
pub struct Session {
    env: Rc<Environment>,
}

impl Session {
    /// Fresh session with builtins and the standard prelude.
    pub fn new() -> Result<Self, LambError> {
        let session = Session::bare();
        session.load_prelude()?;
        Ok(session)
    }

    /// Builtins only; used by `--no-prelude` and by tests that want a
    /// minimal environment.
    pub fn bare() -> Self {
        Session {
            env: builtins::top_env(),
        }
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    pub fn load_prelude(&self) -> Result<(), LambError> {
        self.run_source(PRELUDE, "<prelude>", |_| {})
    }

    /// Read one expression, expand macros, evaluate, drain thunks.
    pub fn run_expr(&self, source: &str, file: &str) -> Result<Value, LambError> {
        let tokens = tokenizer::tokenize(source, file)?;
        let expr = parser::parse(&tokens)?;
        self.eval_top(&expr)
    }

    /// Run a whole program, handing each top-level result to `emit` as it is
    /// produced so printing interleaves correctly with `print` side effects.
    pub fn run_source(
        &self,
        source: &str,
        file: &str,
        mut emit: impl FnMut(&Value),
    ) -> Result<(), LambError> {
        let tokens = tokenizer::tokenize(source, file)?;
        for expr in parser::parse_all(&tokens)? {
            let value = self.eval_top(&expr)?;
            emit(&value);
        }
        Ok(())
    }

    fn eval_top(&self, expr: &Expr) -> Result<Value, LambError> {
        // A top-level quasiquote yields the rewritten tree as data, before
        // macro expansion gets a look at it
        if let Expr::Quasiquote(inner) = expr {
            return Ok(match eval::eval_quasiquote(inner, 0, &self.env)? {
                Expr::Embedded(value) => value,
                rewritten => Value::Expr(Rc::new(rewritten)),
            });
        }

        match macros::expand(expr, &self.env)? {
            None => Ok(Value::Str("<macro defined>".to_string())),
            Some(expanded) => eval::trampoline(eval::eval(&expanded, &self.env, true)?),
        }
    }
}

/// True for results the drivers keep quiet about: nil and the definition
/// markers.
pub fn is_silent(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::Str(s) => s.starts_with("<defined ") && s.ends_with('>'),
        _ => false,
    }
}
