// ABOUTME: Value types representing Lambdora runtime data

use crate::env::Environment;
use crate::error::LambError;
use crate::expr::Expr;
use crate::printer;
use num_bigint::BigInt;
use std::fmt;
use std::rc::Rc;

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Int(BigInt),
    Bool(bool),
    Str(String),
    /// Singly linked cons cell; lists terminate in `Nil`.
    Pair(Rc<Value>, Rc<Value>),
    /// Unique sentinel, distinct from `false`.
    Nil,
    Closure(Rc<Closure>),
    Primitive(Primitive),
    Macro(Rc<MacroDef>),
    /// Unevaluated continuation used by the tail-call trampoline; drained
    /// before any value is returned to user code.
    Thunk(Thunk),
    /// Expression trees are first-class values.
    Expr(Rc<Expr>),
    /// Sentinel installed while a `define`/`letrec` initializer runs.
    /// Reading it from the environment is always an error.
    RecursionPlaceholder,
}

/// A function value carrying its defining environment.
///
/// The captured environment is a shared reference so that the define-time
/// self-reference patch is visible to every copy of the closure.
#[derive(Clone)]
pub struct Closure {
    pub param: String,
    pub body: Rc<Expr>,
    pub env: Rc<Environment>,
}

impl fmt::Debug for Closure {
    // The captured environment may contain this closure itself; leaving it
    // out keeps Debug from recursing forever.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("param", &self.param)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// A macro: parameter names plus an unevaluated body template.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroDef {
    pub params: Vec<String>,
    pub body: Expr,
}

/// A built-in function taking exactly one value. Binary builtins consume one
/// argument and return a new primitive awaiting the second.
#[derive(Clone)]
pub struct Primitive {
    name: &'static str,
    func: Rc<dyn Fn(Value) -> Result<Value, LambError>>,
}

impl Primitive {
    pub fn new<F>(name: &'static str, func: F) -> Self
    where
        F: Fn(Value) -> Result<Value, LambError> + 'static,
    {
        Primitive {
            name,
            func: Rc::new(func),
        }
    }

    pub fn call(&self, arg: Value) -> Result<Value, LambError> {
        (self.func)(arg)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ptr_eq(&self, other: &Primitive) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

/// A zero-argument callable returning the next evaluation step.
#[derive(Clone)]
pub struct Thunk {
    func: Rc<dyn Fn() -> Result<Value, LambError>>,
}

impl Thunk {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() -> Result<Value, LambError> + 'static,
    {
        Thunk {
            func: Rc::new(func),
        }
    }

    pub fn force(&self) -> Result<Value, LambError> {
        (self.func)()
    }

    pub fn ptr_eq(&self, other: &Thunk) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Thunk")
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::Str(_) => "string",
            Value::Pair(_, _) => "pair",
            Value::Nil => "nil",
            Value::Closure(_) => "closure",
            Value::Primitive(_) => "builtin",
            Value::Macro(_) => "macro",
            Value::Thunk(_) => "thunk",
            Value::Expr(_) => "expression",
            Value::RecursionPlaceholder => "uninitialised binding",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Pair(h1, t1), Value::Pair(h2, t2)) => h1 == h2 && t1 == t2,
            (Value::Nil, Value::Nil) => true,
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => a.ptr_eq(b),
            (Value::Macro(a), Value::Macro(b)) => a == b,
            (Value::Thunk(a), Value::Thunk(b)) => a.ptr_eq(b),
            (Value::Expr(a), Value::Expr(b)) => a == b,
            (Value::RecursionPlaceholder, Value::RecursionPlaceholder) => true,
            _ => false,
        }
    }
}

/// Church-encoded true: `λa. λb. a`.
fn is_church_true(closure: &Closure) -> bool {
    matches!(
        &*closure.body,
        Expr::Abstraction { body, .. } if matches!(&**body, Expr::Variable(v) if *v == closure.param)
    )
}

/// Church-encoded false: `λa. λb. b`.
fn is_church_false(closure: &Closure) -> bool {
    matches!(
        &*closure.body,
        Expr::Abstraction { param, body } if matches!(&**body, Expr::Variable(v) if v == param)
    )
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{}", if *b { "true" } else { "false" }),
            Value::Str(s) => write!(f, "{s}"),
            Value::Pair(_, _) => {
                // Print as (a b c), with a dotted tail when the list does
                // not end in nil.
                write!(f, "(")?;
                let mut current = self;
                let mut first = true;
                loop {
                    match current {
                        Value::Pair(head, tail) => {
                            if !first {
                                write!(f, " ")?;
                            }
                            write!(f, "{head}")?;
                            first = false;
                            current = tail.as_ref();
                        }
                        Value::Nil => break,
                        other => {
                            write!(f, " . {other}")?;
                            break;
                        }
                    }
                }
                write!(f, ")")
            }
            Value::Nil => write!(f, "nil"),
            Value::Closure(c) => {
                if is_church_true(c) {
                    write!(f, "true")
                } else if is_church_false(c) {
                    write!(f, "false")
                } else {
                    write!(f, "<closure λ{}. …>", c.param)
                }
            }
            Value::Primitive(_) => write!(f, "<builtin fn>"),
            Value::Macro(_) => write!(f, "<macro>"),
            Value::Thunk(_) => write!(f, "<thunk>"),
            Value::Expr(e) => write!(f, "{}", printer::print_expr(e)),
            Value::RecursionPlaceholder => write!(f, "<uninitialised binding>"),
        }
    }
}

/// Build a proper list value from a vector, terminated by `Nil`.
pub fn list(items: Vec<Value>) -> Value {
    let mut result = Value::Nil;
    for item in items.into_iter().rev() {
        result = Value::Pair(Rc::new(item), Rc::new(result));
    }
    result
}
