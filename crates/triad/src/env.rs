//! Chained name-to-value environments.
//!
//! An [`Env`] is a cheap-clone handle (`Rc<RefCell<..>>`) to a frame holding
//! an insertion-ordered map from interned names to values plus a parent
//! link. Lookup walks parents; `bind` always writes the local frame;
//! `assign` walks up and writes the nearest frame holding the name, or the
//! local frame if none does.
//!
//! Environments are the only mutable values in the interpreter: `OBJECT`
//! values wrap an `Env` used as a dispatch module, and closures keep their
//! defining environment alive through the handle.

use std::{cell::RefCell, fmt, rc::Rc};

use indexmap::IndexMap;

use crate::{intern::NameId, value::Value};

struct EnvFrame {
    bindings: IndexMap<NameId, Value>,
    parent: Option<Env>,
}

/// Handle to an environment frame.
#[derive(Clone)]
pub(crate) struct Env(Rc<RefCell<EnvFrame>>);

impl Env {
    /// Creates a parentless root environment.
    pub fn root() -> Self {
        Self(Rc::new(RefCell::new(EnvFrame {
            bindings: IndexMap::new(),
            parent: None,
        })))
    }

    /// Creates an empty child frame of `parent`.
    pub fn child(parent: &Self) -> Self {
        Self(Rc::new(RefCell::new(EnvFrame {
            bindings: IndexMap::new(),
            parent: Some(parent.clone()),
        })))
    }

    /// Looks `name` up, walking parent frames.
    pub fn lookup(&self, name: NameId) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let next = {
                let frame = current.0.borrow();
                if let Some(value) = frame.bindings.get(&name) {
                    return Some(value.clone());
                }
                frame.parent.clone()
            };
            current = next?;
        }
    }

    /// Binds `name` in this frame, shadowing any outer binding.
    pub fn bind(&self, name: NameId, value: Value) {
        self.0.borrow_mut().bindings.insert(name, value);
    }

    /// Assigns `name` in the nearest frame that already holds it, or binds
    /// locally when no frame does.
    pub fn assign(&self, name: NameId, value: Value) {
        let mut current = self.clone();
        loop {
            let next = {
                let mut frame = current.0.borrow_mut();
                if frame.bindings.contains_key(&name) {
                    frame.bindings.insert(name, value);
                    return;
                }
                frame.parent.clone()
            };
            match next {
                Some(parent) => current = parent,
                None => {
                    self.0.borrow_mut().bindings.insert(name, value);
                    return;
                }
            }
        }
    }

    /// The names bound in this frame, in insertion order.
    pub fn local_names(&self) -> Vec<NameId> {
        self.0.borrow().bindings.keys().copied().collect()
    }

    /// Handle identity.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let frame = self.0.borrow();
        write!(
            f,
            "Env({} bindings{})",
            frame.bindings.len(),
            if frame.parent.is_some() { ", has parent" } else { "" }
        )
    }
}
