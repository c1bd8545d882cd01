//! The public, owned value type.
//!
//! [`Object`] is what embedders get back from [`crate::ReplSession`] and
//! [`crate::Runner`]. It owns all its data, clones freely, and serializes
//! with natural JSON mappings. Values without a direct mapping (functions,
//! objects, continuations, trees, ...) come back as [`Object::Repr`]
//! carrying their rendered form.

use std::fmt;

use num_bigint::BigInt;

use crate::{
    intern::Interner,
    types::num::Number,
    value::{Payload, Value},
};

/// A language value that can be returned from the interpreter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Object {
    /// The empty value `()`.
    Unit,
    /// An integer.
    Int(BigInt),
    /// Positive infinity (the literal `_`).
    Inf,
    /// Negative infinity (the literal `__`).
    NegInf,
    /// A string.
    String(String),
    /// A symbol, by name.
    Symbol(String),
    /// A `vec` value.
    Vec(Vec<Self>),
    /// An `ERROR` value (as produced by a caught native failure).
    Error {
        /// The error kind name.
        kind: String,
        /// The error message.
        message: String,
    },
    /// Rendered fallback for values with no direct `Object` mapping.
    Repr(String),
}

impl Object {
    /// Convenience constructor for small integers.
    #[must_use]
    pub fn int(n: i64) -> Self {
        Self::Int(BigInt::from(n))
    }

    pub(crate) fn from_value(value: &Value, interner: &Interner) -> Self {
        match value.payload() {
            Some(Payload::Unit) => Self::Unit,
            Some(Payload::Num(Number::Int(n))) => Self::Int(n.clone()),
            Some(Payload::Num(Number::Inf)) => Self::Inf,
            Some(Payload::Num(Number::NegInf)) => Self::NegInf,
            Some(Payload::Str(s)) => Self::String(s.to_string()),
            Some(Payload::Symbol(id)) => Self::Symbol(interner.resolve(*id).to_owned()),
            Some(Payload::Vec(items)) => Self::Vec(items.iter().map(|v| Self::from_value(v, interner)).collect()),
            Some(Payload::NumVec(items)) => Self::Vec(
                items
                    .iter()
                    .map(|n| match n {
                        Number::Int(i) => Self::Int(i.clone()),
                        Number::Inf => Self::Inf,
                        Number::NegInf => Self::NegInf,
                    })
                    .collect(),
            ),
            Some(Payload::Error(e)) => Self::Error {
                kind: e.kind.to_string(),
                message: e.message.clone(),
            },
            _ => Self::Repr(value.render(interner)),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => write!(f, "()"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Inf => write!(f, "inf"),
            Self::NegInf => write!(f, "-inf"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Symbol(s) => write!(f, "{s}"),
            Self::Vec(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Error { message, .. } => write!(f, "error: {message}"),
            Self::Repr(repr) => write!(f, "{repr}"),
        }
    }
}
