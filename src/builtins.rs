// ABOUTME: Built-in primitives and construction of the top-level environment

use crate::env::Environment;
use crate::error::LambError;
use crate::value::{Primitive, Value};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;
use std::cell::Cell;
use std::rc::Rc;

thread_local! {
    /// Session-wide gensym counter; names are never handed out twice.
    static GENSYM_COUNTER: Cell<u64> = const { Cell::new(0) };
}

fn expect_int(primitive: &'static str, value: &Value) -> Result<BigInt, LambError> {
    match value {
        Value::Int(n) => Ok(n.clone()),
        other => Err(LambError::builtin(
            primitive,
            format!("expected an integer, got {}", other.type_name()),
        )),
    }
}

fn expect_bool(primitive: &'static str, value: &Value) -> Result<bool, LambError> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(LambError::builtin(
            primitive,
            format!("expected a boolean, got {}", other.type_name()),
        )),
    }
}

// ============================================================================
// Curried Primitive Macros
// ============================================================================
//
// Binary primitives consume one argument and return a new primitive awaiting
// the second. The macros below generate the constructor plus a register_*
// helper, in the shape:
//
//   int_binop! { add, name: "+", |x, y| Ok(Value::Int(&x + &y)) }
//
// producing primitive_add() and register_add(env).

macro_rules! int_binop {
    ($ident:ident, name: $name:literal, |$x:ident, $y:ident| $body:expr) => {
        paste::paste! {
            pub fn [<primitive_ $ident>]() -> Primitive {
                Primitive::new($name, |first| {
                    let $x = expect_int($name, &first)?;
                    Ok(Value::Primitive(Primitive::new($name, move |second| {
                        let $y = expect_int($name, &second)?;
                        $body
                    })))
                })
            }

            pub fn [<register_ $ident>](env: &Rc<Environment>) {
                env.define($name, Value::Primitive([<primitive_ $ident>]()));
            }
        }
    };
}

macro_rules! bool_binop {
    ($ident:ident, name: $name:literal, |$x:ident, $y:ident| $body:expr) => {
        paste::paste! {
            pub fn [<primitive_ $ident>]() -> Primitive {
                Primitive::new($name, |first| {
                    let $x = expect_bool($name, &first)?;
                    Ok(Value::Primitive(Primitive::new($name, move |second| {
                        let $y = expect_bool($name, &second)?;
                        $body
                    })))
                })
            }

            pub fn [<register_ $ident>](env: &Rc<Environment>) {
                env.define($name, Value::Primitive([<primitive_ $ident>]()));
            }
        }
    };
}

// ============================================================================
// Arithmetic
// ============================================================================

int_binop! { add, name: "+", |x, y| Ok(Value::Int(&x + &y)) }
int_binop! { sub, name: "-", |x, y| Ok(Value::Int(&x - &y)) }
int_binop! { mul, name: "*", |x, y| Ok(Value::Int(&x * &y)) }

// Floor division, like the rest of the arithmetic on arbitrary precision
int_binop! { div, name: "/", |x, y| {
    if y.is_zero() {
        return Err(LambError::builtin("/", "division by zero"));
    }
    Ok(Value::Int(x.div_floor(&y)))
} }

int_binop! { rem, name: "%", |x, y| {
    if y.is_zero() {
        return Err(LambError::builtin("%", "modulo by zero"));
    }
    Ok(Value::Int(x.mod_floor(&y)))
} }

// ============================================================================
// Comparison
// ============================================================================

int_binop! { eq, name: "=", |x, y| Ok(Value::Bool(x == y)) }
int_binop! { lt, name: "<", |x, y| Ok(Value::Bool(x < y)) }

// ============================================================================
// Logic. No short-circuit here; that is what the and2/or2 macros are for
// ============================================================================

bool_binop! { and, name: "and", |x, y| Ok(Value::Bool(x && y)) }
bool_binop! { or, name: "or", |x, y| Ok(Value::Bool(x || y)) }

pub fn primitive_not() -> Primitive {
    Primitive::new("not", |value| {
        let b = expect_bool("not", &value)?;
        Ok(Value::Bool(!b))
    })
}

// ============================================================================
// Lists
// ============================================================================

pub fn primitive_cons() -> Primitive {
    Primitive::new("cons", |head| {
        Ok(Value::Primitive(Primitive::new("cons", move |tail| {
            Ok(Value::Pair(Rc::new(head.clone()), Rc::new(tail)))
        })))
    })
}

pub fn primitive_head() -> Primitive {
    Primitive::new("head", |value| match value {
        Value::Pair(head, _) => Ok((*head).clone()),
        other => Err(LambError::builtin(
            "head",
            format!("expected a pair, got {}", other.type_name()),
        )),
    })
}

pub fn primitive_tail() -> Primitive {
    Primitive::new("tail", |value| match value {
        Value::Pair(_, tail) => Ok((*tail).clone()),
        other => Err(LambError::builtin(
            "tail",
            format!("expected a pair, got {}", other.type_name()),
        )),
    })
}

pub fn primitive_is_nil() -> Primitive {
    Primitive::new("isNil", |value| Ok(Value::Bool(matches!(value, Value::Nil))))
}

// ============================================================================
// Console and hygiene
// ============================================================================

pub fn primitive_print() -> Primitive {
    Primitive::new("print", |value| {
        println!("{value}");
        Ok(Value::Nil)
    })
}

/// Fresh identifier, never returned before in this session. The argument is
/// ignored; a dummy nil arrives from zero-argument applications.
pub fn primitive_gensym() -> Primitive {
    Primitive::new("gensym", |_| {
        let n = GENSYM_COUNTER.with(|counter| {
            let n = counter.get();
            counter.set(n + 1);
            n
        });
        Ok(Value::Str(format!("__gensym_{n}")))
    })
}

// ============================================================================
// Registration
// ============================================================================

pub fn register_primitives(env: &Rc<Environment>) {
    register_add(env);
    register_sub(env);
    register_mul(env);
    register_div(env);
    register_rem(env);
    register_eq(env);
    register_lt(env);
    register_and(env);
    register_or(env);
    env.define("not", Value::Primitive(primitive_not()));
    env.define("cons", Value::Primitive(primitive_cons()));
    env.define("head", Value::Primitive(primitive_head()));
    env.define("tail", Value::Primitive(primitive_tail()));
    env.define("isNil", Value::Primitive(primitive_is_nil()));
    env.define("print", Value::Primitive(primitive_print()));
    env.define("gensym", Value::Primitive(primitive_gensym()));

    // Constants
    env.define("true", Value::Bool(true));
    env.define("false", Value::Bool(false));
    env.define("nil", Value::Nil);
}

/// Fresh top-level environment holding every builtin.
pub fn top_env() -> Rc<Environment> {
    let env = Environment::new();
    register_primitives(&env);
    env
}
