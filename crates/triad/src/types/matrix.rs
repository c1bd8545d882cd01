//! The `matrix` type: a shape vector over flat integer storage.
//!
//! Matrices come from `num_vec tomatrix` (rank 1) and are reshaped with a
//! `num_vec` of dimensions. Arithmetic against a `NUM` is elementwise and
//! shape-preserving.

use crate::{
    env::Env,
    error::{RunError, RunResult},
    eval::Interp,
    intern::Interner,
    registry::Registry,
    types::{num::Number, num_vec::expect_num_vec},
    value::{Payload, Tag, Value},
};

/// Flat storage plus a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Matrix {
    shape: Vec<usize>,
    data: Vec<Number>,
}

impl Matrix {
    pub fn new(shape: Vec<usize>, data: Vec<Number>) -> Self {
        Self { shape, data }
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn apply(&self, op: fn(&Number, &Number) -> RunResult<Number>, n: &Number) -> RunResult<Self> {
        let data = self.data.iter().map(|x| op(x, n)).collect::<RunResult<Vec<_>>>()?;
        Ok(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Renders one dimension recursively; the innermost dimension prints
    /// elements separated by spaces, each outer dimension adds a newline.
    fn render_dim(&self, shape: &[usize], start: usize, stride: usize, out: &mut String) {
        let Some((&current, rest)) = shape.split_first() else {
            out.push_str(&self.data[start].to_string());
            out.push(' ');
            return;
        };
        for i in 0..current {
            self.render_dim(rest, start + i * stride, stride * current, out);
        }
        out.push('\n');
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_dim(&self.shape, 0, 1, &mut out);
        out.trim_end_matches('\n').to_owned()
    }
}

pub(crate) fn register(interner: &mut Interner, registry: &mut Registry) {
    registry.register(interner, Tag::NUM_VEC, "tomatrix", None, to_matrix);

    registry.register(interner, Tag::MATRIX, "shape", None, shape);
    registry.register(interner, Tag::MATRIX, "rank", None, rank);
    registry.register(interner, Tag::MATRIX, "reshape", Some(Tag::NUM_VEC), reshape);
    registry.register(interner, Tag::MATRIX, "+", Some(Tag::NUM), add);
    registry.register(interner, Tag::MATRIX, "-", Some(Tag::NUM), sub);
    registry.register(interner, Tag::MATRIX, "*", Some(Tag::NUM), mul);
    registry.register(interner, Tag::MATRIX, "/", Some(Tag::NUM), div);
}

fn expect_matrix<'v>(value: &'v Value, context: &str) -> RunResult<&'v Matrix> {
    match value.payload() {
        Some(Payload::Matrix(matrix)) => Ok(matrix),
        _ => Err(RunError::type_error(format!("{context} expects a matrix operand")).with_span(value.span())),
    }
}

fn to_matrix(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let items = expect_num_vec(a, "tomatrix")?;
    let matrix = Matrix::new(vec![items.len()], items.to_vec());
    Ok(Value::leaf(Payload::Matrix(matrix.into()), a.span()))
}

fn shape(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    let matrix = expect_matrix(a, "shape")?;
    Ok(Value::num_vec(
        matrix.shape().iter().map(|&d| Number::from_usize(d)).collect(),
    ))
}

fn rank(_: &mut Interp, a: &Value, _: &Value, _: &Env) -> RunResult<Value> {
    Ok(Value::num(Number::from_usize(expect_matrix(a, "rank")?.rank())))
}

/// `m reshape dims`: same storage under a new shape; the element count
/// must be preserved.
fn reshape(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    let matrix = expect_matrix(a, "reshape")?;
    let dims = expect_num_vec(b, "reshape")?
        .iter()
        .map(Number::to_index)
        .collect::<RunResult<Vec<_>>>()?;
    let elements: usize = dims.iter().product();
    if elements != matrix.data.len() {
        return Err(RunError::value_error(format!(
            "can't reshape {} elements into shape {dims:?}",
            matrix.data.len()
        ))
        .with_span(b.span()));
    }
    let reshaped = Matrix::new(dims, matrix.data.clone());
    Ok(Value::leaf(Payload::Matrix(reshaped.into()), a.span()))
}

fn elementwise(
    a: &Value,
    b: &Value,
    context: &str,
    op: fn(&Number, &Number) -> RunResult<Number>,
) -> RunResult<Value> {
    let matrix = expect_matrix(a, context)?;
    let n = b.expect_num(context)?;
    Ok(Value::leaf(Payload::Matrix(matrix.apply(op, n)?.into()), a.span()))
}

fn add(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "+", Number::add)
}

fn sub(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "-", Number::sub)
}

fn mul(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "*", Number::mul)
}

fn div(_: &mut Interp, a: &Value, b: &Value, _: &Env) -> RunResult<Value> {
    elementwise(a, b, "/", Number::div)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(ns: &[i64]) -> Vec<Number> {
        ns.iter().map(|&n| Number::from_i64(n)).collect()
    }

    #[test]
    fn rank_one_renders_on_one_line() {
        let m = Matrix::new(vec![3], numbers(&[1, 2, 3]));
        assert_eq!(m.render(), "1 2 3 ");
    }

    #[test]
    fn elementwise_preserves_shape() {
        let m = Matrix::new(vec![2, 2], numbers(&[1, 2, 3, 4]));
        let out = m.apply(Number::add, &Number::from_i64(10)).unwrap();
        assert_eq!(out.shape(), &[2, 2]);
        assert_eq!(out.data, numbers(&[11, 12, 13, 14]));
    }
}
