// ABOUTME: Macro expansion pass rewriting trees before evaluation

use crate::env::Environment;
use crate::error::LambError;
use crate::expr::Expr;
use crate::value::{MacroDef, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Expand macros in `expr` against the macros registered in `env`.
///
/// Returns `None` when the input was a macro definition: it is registered
/// into `env` and consumed by the pass. Everything else comes back `Some`,
/// with macro call sites rewritten.
pub fn expand(expr: &Expr, env: &Rc<Environment>) -> Result<Option<Expr>, LambError> {
    match expr {
        Expr::DefMacro { name, params, body } => {
            env.define(
                name.clone(),
                Value::Macro(Rc::new(MacroDef {
                    params: params.clone(),
                    body: (**body).clone(),
                })),
            );
            Ok(None)
        }

        Expr::Application { func, args } => {
            // A macro call site: the head names a registered macro
            if let Expr::Variable(name) = &**func {
                if let Some(Value::Macro(def)) = env.get(name) {
                    if def.params.len() != args.len() {
                        return Err(LambError::MacroExpansion {
                            name: name.clone(),
                            expected: def.params.len(),
                            actual: args.len(),
                        });
                    }
                    let mapping: HashMap<&str, &Expr> = def
                        .params
                        .iter()
                        .map(String::as_str)
                        .zip(args.iter())
                        .collect();
                    let substituted = substitute(&def.body, &mapping);
                    // The expansion may itself contain macro calls
                    return expand(&substituted, env);
                }
            }

            let func = expand(func, env)?.unwrap_or_else(|| (**func).clone());
            let mut expanded_args = Vec::with_capacity(args.len());
            for arg in args {
                expanded_args.push(expand(arg, env)?.unwrap_or_else(|| arg.clone()));
            }
            Ok(Some(Expr::Application {
                func: Rc::new(func),
                args: expanded_args,
            }))
        }

        Expr::Abstraction { param, body } => {
            let body = expand(body, env)?.unwrap_or_else(|| (**body).clone());
            Ok(Some(Expr::Abstraction {
                param: param.clone(),
                body: Rc::new(body),
            }))
        }

        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let cond = expand(cond, env)?.unwrap_or_else(|| (**cond).clone());
            let then_branch = expand(then_branch, env)?.unwrap_or_else(|| (**then_branch).clone());
            let else_branch = expand(else_branch, env)?.unwrap_or_else(|| (**else_branch).clone());
            Ok(Some(Expr::If {
                cond: Rc::new(cond),
                then_branch: Rc::new(then_branch),
                else_branch: Rc::new(else_branch),
            }))
        }

        Expr::Define { name, value } => {
            let value = expand(value, env)?.unwrap_or_else(|| (**value).clone());
            Ok(Some(Expr::Define {
                name: name.clone(),
                value: Rc::new(value),
            }))
        }

        Expr::LetRec { bindings, body } => {
            let mut expanded_bindings = Vec::with_capacity(bindings.len());
            for (name, value) in bindings {
                let value = expand(value, env)?.unwrap_or_else(|| value.clone());
                expanded_bindings.push((name.clone(), value));
            }
            let mut expanded_body = Vec::with_capacity(body.len());
            for item in body {
                expanded_body.push(expand(item, env)?.unwrap_or_else(|| item.clone()));
            }
            Ok(Some(Expr::LetRec {
                bindings: expanded_bindings,
                body: expanded_body,
            }))
        }

        Expr::Quasiquote(inner) => Ok(Some(Expr::Quasiquote(Rc::new(expand_quasiquote(
            inner, 0, env,
        )?)))),

        // Checked by the evaluator when it shows up outside a quasiquote
        Expr::Unquote(_) => Ok(Some(expr.clone())),

        Expr::Variable(_) | Expr::Literal(_) | Expr::Quote(_) | Expr::Embedded(_) => {
            Ok(Some(expr.clone()))
        }
    }
}

/// Capture-unaware substitution: every `Variable(p)` in the body is replaced
/// by the corresponding argument tree. Hygiene is the programmer's business,
/// via `gensym`.
fn substitute(expr: &Expr, mapping: &HashMap<&str, &Expr>) -> Expr {
    match expr {
        Expr::Variable(name) => match mapping.get(name.as_str()) {
            Some(replacement) => (*replacement).clone(),
            None => expr.clone(),
        },
        Expr::Application { func, args } => Expr::Application {
            func: Rc::new(substitute(func, mapping)),
            args: args.iter().map(|arg| substitute(arg, mapping)).collect(),
        },
        Expr::Abstraction { param, body } => Expr::Abstraction {
            param: param.clone(),
            body: Rc::new(substitute(body, mapping)),
        },
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => Expr::If {
            cond: Rc::new(substitute(cond, mapping)),
            then_branch: Rc::new(substitute(then_branch, mapping)),
            else_branch: Rc::new(substitute(else_branch, mapping)),
        },
        Expr::Define { name, value } => Expr::Define {
            name: name.clone(),
            value: Rc::new(substitute(value, mapping)),
        },
        Expr::LetRec { bindings, body } => Expr::LetRec {
            bindings: bindings
                .iter()
                .map(|(name, value)| (name.clone(), substitute(value, mapping)))
                .collect(),
            body: body.iter().map(|item| substitute(item, mapping)).collect(),
        },
        Expr::DefMacro { name, params, body } => Expr::DefMacro {
            name: name.clone(),
            params: params.clone(),
            body: Rc::new(substitute(body, mapping)),
        },
        Expr::Quasiquote(inner) => Expr::Quasiquote(Rc::new(substitute(inner, mapping))),
        Expr::Unquote(inner) => Expr::Unquote(Rc::new(substitute(inner, mapping))),
        // Quoted data stays data
        Expr::Literal(_) | Expr::Quote(_) | Expr::Embedded(_) => expr.clone(),
    }
}

/// Reproduce a quasiquote template, macro-expanding unquoted holes.
///
/// Depth 0 means "directly under the quasiquote being expanded": an unquote
/// there is a macro call site. Nested quasiquotes push the depth up; their
/// unquotes only count back down.
fn expand_quasiquote(expr: &Expr, depth: usize, env: &Rc<Environment>) -> Result<Expr, LambError> {
    match expr {
        Expr::Unquote(inner) => {
            if depth == 0 {
                let expanded = expand(inner, env)?.unwrap_or_else(|| (**inner).clone());
                Ok(Expr::Unquote(Rc::new(expanded)))
            } else {
                Ok(Expr::Unquote(Rc::new(expand_quasiquote(
                    inner,
                    depth - 1,
                    env,
                )?)))
            }
        }
        Expr::Quasiquote(inner) => Ok(Expr::Quasiquote(Rc::new(expand_quasiquote(
            inner,
            depth + 1,
            env,
        )?))),
        Expr::Application { func, args } => {
            let func = expand_quasiquote(func, depth, env)?;
            let args = args
                .iter()
                .map(|arg| expand_quasiquote(arg, depth, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::Application {
                func: Rc::new(func),
                args,
            })
        }
        Expr::Abstraction { param, body } => Ok(Expr::Abstraction {
            param: param.clone(),
            body: Rc::new(expand_quasiquote(body, depth, env)?),
        }),
        Expr::If {
            cond,
            then_branch,
            else_branch,
        } => Ok(Expr::If {
            cond: Rc::new(expand_quasiquote(cond, depth, env)?),
            then_branch: Rc::new(expand_quasiquote(then_branch, depth, env)?),
            else_branch: Rc::new(expand_quasiquote(else_branch, depth, env)?),
        }),
        Expr::Define { name, value } => Ok(Expr::Define {
            name: name.clone(),
            value: Rc::new(expand_quasiquote(value, depth, env)?),
        }),
        Expr::DefMacro { name, params, body } => Ok(Expr::DefMacro {
            name: name.clone(),
            params: params.clone(),
            body: Rc::new(expand_quasiquote(body, depth, env)?),
        }),
        Expr::LetRec { bindings, body } => Ok(Expr::LetRec {
            bindings: bindings
                .iter()
                .map(|(name, value)| Ok((name.clone(), expand_quasiquote(value, depth, env)?)))
                .collect::<Result<Vec<_>, LambError>>()?,
            body: body
                .iter()
                .map(|item| expand_quasiquote(item, depth, env))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        Expr::Variable(_) | Expr::Literal(_) | Expr::Quote(_) | Expr::Embedded(_) => {
            Ok(expr.clone())
        }
    }
}
