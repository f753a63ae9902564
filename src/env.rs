// ABOUTME: Environment module for managing variable bindings

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A flat name-to-value map with interior mutability.
///
/// Lexical scoping works by copy-on-capture: evaluating an abstraction
/// snapshots the current bindings into the closure, and every application
/// extends a fresh snapshot of the closure's map. `define` mutates the
/// current map in place, which is what makes the define-time self-reference
/// patch visible through the closure's shared reference.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
}

impl Environment {
    /// Creates a new empty environment.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment::default())
    }

    /// Shallow copy: a new environment holding clones of the current
    /// bindings. Values are cheap to clone (shared `Rc` payloads).
    pub fn snapshot(&self) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(self.bindings.borrow().clone()),
        })
    }

    /// Defines or overwrites a binding in this environment.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Looks up a name.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    /// Clones out every bound value (used by letrec to patch closures).
    pub fn values(&self) -> Vec<Value> {
        self.bindings.borrow().values().cloned().collect()
    }
}
