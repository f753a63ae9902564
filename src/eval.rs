// ABOUTME: Evaluator with tail-call trampolining and runtime quasiquote

use crate::env::Environment;
use crate::error::LambError;
use crate::expr::{is_integer_literal, Expr};
use crate::value::{Closure, MacroDef, Thunk, Value};
use num_bigint::BigInt;
use std::rc::Rc;

/// Evaluate `expr` in `env`.
///
/// When `tail` is true the expression sits in tail position: applications
/// come back as a [`Thunk`] instead of recursing, and the driver's
/// [`trampoline`] drains them without growing the host stack.
pub fn eval(expr: &Expr, env: &Rc<Environment>, tail: bool) -> Result<Value, LambError> {
    match expr {
        Expr::Variable(name) => match env.get(name) {
            Some(Value::RecursionPlaceholder) => Err(LambError::RecursionInit(name.clone())),
            Some(value) => Ok(value),
            None => Err(LambError::unbound(name)),
        },

        Expr::Literal(text) => {
            if is_integer_literal(text) {
                let n = text
                    .parse::<BigInt>()
                    .map_err(|_| LambError::eval(format!("invalid integer literal: {text}")))?;
                Ok(Value::Int(n))
            } else {
                Ok(Value::Str(text.clone()))
            }
        }

        Expr::Abstraction { param, body } => Ok(Value::Closure(Rc::new(Closure {
            param: param.clone(),
            body: Rc::clone(body),
            env: env.snapshot(),
        }))),

        Expr::Application { func, args } => {
            if tail {
                // Defer the whole call so the trampoline can unwind it
                let func = Rc::clone(func);
                let args = args.clone();
                let env = Rc::clone(env);
                Ok(Value::Thunk(Thunk::new(move || {
                    let func_val = eval(&func, &env, false)?;
                    let mut values = Vec::with_capacity(args.len());
                    for arg in &args {
                        values.push(eval(arg, &env, false)?);
                    }
                    apply(func_val, values, true)
                })))
            } else {
                let func_val = eval(func, env, false)?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(eval(arg, env, false)?);
                }
                apply(func_val, values, false)
            }
        }

        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let cond = eval(cond, env, false)?;
            match cond {
                Value::Bool(true) => eval(then_branch, env, tail),
                Value::Bool(false) => eval(else_branch, env, tail),
                other => Err(LambError::eval(format!(
                    "condition in 'if' must be a boolean, got {}",
                    other.type_name()
                ))),
            }
        }

        Expr::Define { name, value } => {
            // Pre-bind so the right-hand side may mention itself textually
            env.define(name.clone(), Value::RecursionPlaceholder);
            let value = eval(value, env, false)?;
            if let Value::Closure(closure) = &value {
                // Patch the captured environment so the closure can call
                // itself through its own name
                closure.env.define(name.clone(), value.clone());
            }
            env.define(name.clone(), value);
            Ok(Value::Str(format!("<defined {name}>")))
        }

        Expr::LetRec { bindings, body } => {
            let local = env.snapshot();
            for (name, _) in bindings {
                local.define(name.clone(), Value::RecursionPlaceholder);
            }

            for (name, rhs) in bindings {
                let value = eval(rhs, &local, false)?;
                if let Value::Closure(closure) = &value {
                    closure.env.define(name.clone(), value.clone());
                }
                local.define(name.clone(), value);
            }

            // Closures created while earlier bindings evaluated still hold
            // placeholders for the later names; patch them all
            for value in local.values() {
                if let Value::Closure(closure) = value {
                    for (name, _) in bindings {
                        if let Some(bound) = local.get(name) {
                            closure.env.define(name.clone(), bound);
                        }
                    }
                }
            }

            let mut result = Value::Nil;
            for (index, item) in body.iter().enumerate() {
                let last = index + 1 == body.len();
                result = eval(item, &local, tail && last)?;
            }
            Ok(result)
        }

        Expr::DefMacro { name, params, body } => {
            // Normally consumed by the macro pass; registering here keeps
            // direct eval callers working
            env.define(
                name.clone(),
                Value::Macro(Rc::new(MacroDef {
                    params: params.clone(),
                    body: (**body).clone(),
                })),
            );
            Ok(Value::Str("<macro defined>".to_string()))
        }

        Expr::Quote(inner) => Ok(Value::Expr(Rc::clone(inner))),

        Expr::Quasiquote(inner) => match eval_quasiquote(inner, 0, env)? {
            Expr::Embedded(value) => Ok(value),
            rewritten => eval(&rewritten, env, tail),
        },

        Expr::Unquote(_) => Err(LambError::eval("unquote only inside quasiquote")),

        Expr::Embedded(value) => Ok(value.clone()),
    }
}

/// Apply a function value to already-evaluated arguments.
///
/// Closures and primitives both consume arguments one at a time; an
/// intermediate result that can take no more arguments short-circuits out.
pub fn apply(func: Value, args: Vec<Value>, tail: bool) -> Result<Value, LambError> {
    match func {
        Value::Closure(_) => {
            let mut result = func;
            let count = args.len();
            for (index, arg) in args.into_iter().enumerate() {
                result = match result {
                    Value::Closure(closure) => {
                        let call_env = closure.env.snapshot();
                        call_env.define(closure.param.clone(), arg);
                        let last = index + 1 == count;
                        eval(&closure.body, &call_env, tail && last)?
                    }
                    other => return Ok(other),
                };
            }
            Ok(result)
        }

        Value::Primitive(first) => {
            if args.is_empty() {
                // Zero-argument application passes nil as a dummy
                return first.call(Value::Nil);
            }
            let mut result = Value::Primitive(first);
            for arg in args {
                result = match result {
                    Value::Primitive(primitive) => primitive.call(arg)?,
                    other => return Ok(other),
                };
            }
            Ok(result)
        }

        Value::Macro(_) => Err(LambError::eval("macro was not expanded before evaluation")),

        _ => Err(LambError::eval("tried to apply a non-function value")),
    }
}

/// Drain thunks until a concrete value appears. Every evaluation boundary
/// that must hand a real value to user code goes through here.
pub fn trampoline(mut value: Value) -> Result<Value, LambError> {
    while let Value::Thunk(thunk) = value {
        value = thunk.force()?;
    }
    Ok(value)
}

/// Runtime quasiquote: reproduce the template, replacing each unquote at
/// depth 0 with the *value* of its inner expression, embedded in the tree
/// slot. Nested quasiquotes raise the depth; their unquotes count back down
/// without being evaluated.
pub fn eval_quasiquote(
    expr: &Expr,
    depth: usize,
    env: &Rc<Environment>,
) -> Result<Expr, LambError> {
    match expr {
        Expr::Unquote(inner) => {
            if depth == 0 {
                let value = eval(inner, env, false)?;
                Ok(Expr::Embedded(value))
            } else {
                Ok(Expr::Unquote(Rc::new(eval_quasiquote(
                    inner,
                    depth - 1,
                    env,
                )?)))
            }
        }
        Expr::Quasiquote(inner) => Ok(Expr::Quasiquote(Rc::new(eval_quasiquote(
            inner,
            depth + 1,
            env,
        )?))),
        Expr::Application { func, args } => Ok(Expr::Application {
            func: Rc::new(eval_quasiquote(func, depth, env)?),
            args: args
                .iter()
                .map(|arg| eval_quasiquote(arg, depth, env))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        Expr::Abstraction { param, body } => Ok(Expr::Abstraction {
            param: param.clone(),
            body: Rc::new(eval_quasiquote(body, depth, env)?),
        }),
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => Ok(Expr::If {
            cond: Rc::new(eval_quasiquote(cond, depth, env)?),
            then_branch: Rc::new(eval_quasiquote(then_branch, depth, env)?),
            else_branch: Rc::new(eval_quasiquote(else_branch, depth, env)?),
        }),
        Expr::Define { name, value } => Ok(Expr::Define {
            name: name.clone(),
            value: Rc::new(eval_quasiquote(value, depth, env)?),
        }),
        Expr::DefMacro { name, params, body } => Ok(Expr::DefMacro {
            name: name.clone(),
            params: params.clone(),
            body: Rc::new(eval_quasiquote(body, depth, env)?),
        }),
        Expr::LetRec { bindings, body } => Ok(Expr::LetRec {
            bindings: bindings
                .iter()
                .map(|(name, value)| Ok((name.clone(), eval_quasiquote(value, depth, env)?)))
                .collect::<Result<Vec<_>, LambError>>()?,
            body: body
                .iter()
                .map(|item| eval_quasiquote(item, depth, env))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        Expr::Variable(_) | Expr::Literal(_) | Expr::Quote(_) | Expr::Embedded(_) => {
            Ok(expr.clone())
        }
    }
}
