//! Type definitions and per-type operation modules.
//!
//! Each file holds one type's data representation (when it has one beyond
//! the `Value` payload) and a `register` function contributing its
//! operation table to the [`Registry`](crate::registry::Registry).

pub mod functors;
pub mod matrix;
pub mod num;
pub mod num_set;
pub mod num_vec;
pub mod object;
pub mod pointer;
pub mod range;
pub mod str;
pub mod thunk;
pub mod tree;
pub mod vec;

use crate::{intern::Interner, registry::Registry};

/// Registers every built-in type module.
pub(crate) fn register_all(interner: &mut Interner, registry: &mut Registry) {
    num::register(interner, registry);
    str::register(interner, registry);
    vec::register(interner, registry);
    num_vec::register(interner, registry);
    num_set::register(interner, registry);
    range::register(interner, registry);
    matrix::register(interner, registry);
    tree::register(interner, registry);
    object::register(interner, registry);
    pointer::register(interner, registry);
    thunk::register(interner, registry);
    functors::register(interner, registry);
}
