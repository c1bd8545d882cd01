//! The built-in registry: per-type operation tables materialized as
//! dispatch modules.
//!
//! Natives are registered against a type label, optionally specialized on
//! the right operand's label (`register(tag, op, Some(rtag), f)` binds the
//! combined `op:RT` key). `install` binds each table into the global
//! environment as an `OBJECT` under its type label, which is exactly the
//! shape dispatch looks for — user code can shadow or extend the modules
//! with ordinary bindings.

use indexmap::IndexMap;

use crate::{
    env::Env,
    intern::{Interner, NameId},
    value::{Builtin, BuiltinFn, Payload, Special, SpecialFn, Tag, Value},
};

/// Builder for the per-type operation tables.
pub(crate) struct Registry {
    modules: IndexMap<NameId, Env>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            modules: IndexMap::new(),
        }
    }

    /// The module environment for `tag`, created on first use.
    pub fn module(&mut self, tag: Tag) -> Env {
        self.modules.entry(tag.name_id()).or_insert_with(Env::root).clone()
    }

    /// Registers a native operation on `tag`, keyed by `op` or, when
    /// `operand` is given, by the combined `op:RT` dispatch key.
    pub fn register(&mut self, interner: &mut Interner, tag: Tag, op: &str, operand: Option<Tag>, f: BuiltinFn) {
        let op_name = interner.intern(op);
        let key = match operand {
            Some(rtag) => interner.dispatch_key(op_name, rtag.name_id()),
            None => op_name,
        };
        self.module(tag)
            .bind(key, Value::leaf(Payload::Builtin(Builtin { name: op_name, f }), None));
    }

    /// Binds every module into `env` under its type label.
    pub fn install(self, env: &Env) {
        for (label, module) in self.modules {
            env.bind(label, Value::object(module));
        }
    }
}

/// Binds an ambient builtin directly into `env`.
pub(crate) fn bind_builtin(env: &Env, interner: &mut Interner, name: &str, f: BuiltinFn) {
    let id = interner.intern(name);
    env.bind(id, Value::leaf(Payload::Builtin(Builtin { name: id, f }), None));
}

/// Binds an ambient special directly into `env`.
pub(crate) fn bind_special(env: &Env, interner: &mut Interner, name: &str, f: SpecialFn) {
    let id = interner.intern(name);
    env.bind(id, Value::leaf(Payload::Special(Special { name: id, f }), None));
}

/// Populates a fresh global environment with every type module, the user
/// functors, and the ambient operation set.
pub(crate) fn install_prelude(interner: &mut Interner, env: &Env) {
    let mut registry = Registry::new();
    crate::types::register_all(interner, &mut registry);
    registry.install(env);
    crate::builtins::install_ambient(interner, env);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::RunResult, eval::Interp, intern::StaticNames};

    fn noop(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
        Ok(a.clone())
    }

    #[test]
    fn register_binds_plain_and_combined_keys() {
        let mut interner = Interner::new();
        let mut registry = Registry::new();
        registry.register(&mut interner, Tag::NUM, "+", None, noop);
        registry.register(&mut interner, Tag::MATRIX, "+", Some(Tag::NUM), noop);

        let env = Env::root();
        registry.install(&env);

        let num_module = env.lookup(StaticNames::Num.id()).unwrap();
        assert_eq!(num_module.tag(), Tag::OBJECT);

        let matrix_module = env.lookup(StaticNames::Matrix.id()).unwrap();
        let Some(Payload::Object(module_env)) = matrix_module.payload() else {
            panic!("matrix module should install as an OBJECT");
        };
        let key = interner.intern("+:NUM");
        assert!(module_env.lookup(key).is_some());
    }
}
