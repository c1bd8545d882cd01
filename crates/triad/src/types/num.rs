//! The `NUM` scalar: an arbitrary-precision integer extended with signed
//! infinities (the lexical forms `_` and `__`).
//!
//! All arithmetic is integer arithmetic; division is floor division. There
//! are no floats anywhere in the language, so `inf` only ever arises from
//! the literals and propagates through arithmetic with the usual absorbing
//! rules. Indeterminate combinations (`inf - inf`, `inf * 0`, `inf / inf`)
//! are value errors.

use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    ops::Neg,
};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::{
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::{Interp, bool_num},
    intern::Interner,
    registry::Registry,
    value::{Tag, Value},
};

/// An integer, or one of the two infinities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Number {
    Int(BigInt),
    Inf,
    NegInf,
}

impl Number {
    pub const INF: Self = Self::Inf;
    pub const NEG_INF: Self = Self::NegInf;

    pub fn from_i64(n: i64) -> Self {
        Self::Int(BigInt::from(n))
    }

    pub fn from_usize(n: usize) -> Self {
        Self::Int(BigInt::from(n))
    }

    /// Parses a plain decimal digit string (no sign, no separators).
    pub fn from_digits(digits: &str) -> Option<Self> {
        BigInt::parse_bytes(digits.as_bytes(), 10).map(Self::Int)
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Int(n) if n.is_zero())
    }

    /// Truthiness for conditionals: zero is false, everything else true.
    pub fn is_truthy(&self) -> bool {
        !self.is_zero()
    }

    /// Sign as -1, 0, or 1 (infinities are ±1).
    fn signum(&self) -> i8 {
        match self {
            Self::Int(n) => {
                if n.is_zero() {
                    0
                } else if n.is_negative() {
                    -1
                } else {
                    1
                }
            }
            Self::Inf => 1,
            Self::NegInf => -1,
        }
    }

    fn indeterminate(op: &str) -> RunError {
        RunError::value_error(format!("indeterminate arithmetic: {op}"))
    }

    pub fn add(&self, other: &Self) -> RunResult<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Self::Int(a + b)),
            (Self::Inf, Self::NegInf) | (Self::NegInf, Self::Inf) => Err(Self::indeterminate("inf + -inf")),
            (Self::Inf, _) | (_, Self::Inf) => Ok(Self::Inf),
            (Self::NegInf, _) | (_, Self::NegInf) => Ok(Self::NegInf),
        }
    }

    pub fn sub(&self, other: &Self) -> RunResult<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Self::Int(a - b)),
            (Self::Inf, Self::Inf) | (Self::NegInf, Self::NegInf) => Err(Self::indeterminate("inf - inf")),
            (Self::Inf, _) | (_, Self::NegInf) => Ok(Self::Inf),
            (Self::NegInf, _) | (_, Self::Inf) => Ok(Self::NegInf),
        }
    }

    pub fn mul(&self, other: &Self) -> RunResult<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Self::Int(a * b)),
            _ => match self.signum() * other.signum() {
                0 => Err(Self::indeterminate("inf * 0")),
                s if s > 0 => Ok(Self::Inf),
                _ => Ok(Self::NegInf),
            },
        }
    }

    /// Floor division. Division by zero is a `ZeroDivision` error.
    pub fn div(&self, other: &Self) -> RunResult<Self> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => {
                if b.is_zero() {
                    Err(RunError::new(ExcKind::ZeroDivision, "integer division by zero"))
                } else {
                    Ok(Self::Int(a.div_floor(b)))
                }
            }
            (Self::Int(_), Self::Inf | Self::NegInf) => Ok(Self::Int(BigInt::zero())),
            (Self::Inf | Self::NegInf, Self::Int(b)) => {
                if b.is_zero() {
                    Err(RunError::new(ExcKind::ZeroDivision, "integer division by zero"))
                } else if self.signum() * other.signum() > 0 {
                    Ok(Self::Inf)
                } else {
                    Ok(Self::NegInf)
                }
            }
            _ => Err(Self::indeterminate("inf / inf")),
        }
    }

    /// Converts to `usize` for use as an index or count.
    pub fn to_index(&self) -> RunResult<usize> {
        match self {
            Self::Int(n) => n
                .to_usize()
                .ok_or_else(|| RunError::new(ExcKind::IndexError, format!("{n} is not a valid index"))),
            _ => Err(RunError::new(ExcKind::IndexError, "infinity is not a valid index")),
        }
    }
}

impl Neg for Number {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            Self::Int(n) => Self::Int(-n),
            Self::Inf => Self::NegInf,
            Self::NegInf => Self::Inf,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Inf, Self::Inf) | (Self::NegInf, Self::NegInf) => Ordering::Equal,
            (Self::Inf, _) | (_, Self::NegInf) => Ordering::Greater,
            (Self::NegInf, _) | (_, Self::Inf) => Ordering::Less,
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Int(n) => {
                0u8.hash(state);
                n.hash(state);
            }
            Self::Inf => 1u8.hash(state),
            Self::NegInf => 2u8.hash(state),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Inf => write!(f, "inf"),
            Self::NegInf => write!(f, "-inf"),
        }
    }
}

/// Registers the `NUM` module: arithmetic and comparisons.
pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::NUM, "+", None, add);
    registry.register(interner, Tag::NUM, "-", None, sub);
    registry.register(interner, Tag::NUM, "*", None, mul);
    registry.register(interner, Tag::NUM, "/", None, div);
    registry.register(interner, Tag::NUM, "neg", None, negate);
    registry.register(interner, Tag::NUM, "<", None, less);
    registry.register(interner, Tag::NUM, "lt", None, less);
    registry.register(interner, Tag::NUM, "le", None, less_eq);
    registry.register(interner, Tag::NUM, ">", None, greater);
    registry.register(interner, Tag::NUM, "gt", None, greater);
    registry.register(interner, Tag::NUM, "ge", None, greater_eq);
    registry.register(interner, Tag::NUM, "min", None, min_op);
    registry.register(interner, Tag::NUM, "max", None, max_op);
    registry.register(interner, Tag::NUM, "tostr", None, to_str);
}

fn binary(a: &Value, b: &Value, op: &str) -> RunResult<(Number, Number)> {
    Ok((a.expect_num(op)?.clone(), b.expect_num(op)?.clone()))
}

fn add(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "+")?;
    Ok(Value::num(a.add(&b)?))
}

fn sub(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "-")?;
    Ok(Value::num(a.sub(&b)?))
}

fn mul(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "*")?;
    Ok(Value::num(a.mul(&b)?))
}

fn div(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "/")?;
    Ok(Value::num(a.div(&b)?))
}

fn negate(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(-a.expect_num("neg")?.clone()))
}

fn less(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "<")?;
    Ok(bool_num(a < b))
}

fn less_eq(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "le")?;
    Ok(bool_num(a <= b))
}

fn greater(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, ">")?;
    Ok(bool_num(a > b))
}

fn greater_eq(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "ge")?;
    Ok(bool_num(a >= b))
}

fn min_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "min")?;
    Ok(Value::num(a.min(b)))
}

fn max_op(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let (a, b) = binary(a, b, "max")?;
    Ok(Value::num(a.max(b)))
}

fn to_str(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::string(a.expect_num("tostr")?.to_string()))
}
