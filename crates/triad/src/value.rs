//! The ternary IR: runtime values and tree nodes.
//!
//! A [`Value`] has exactly two shapes: an atomic [`Leaf`] carrying a tagged
//! payload, or a composite [`TreeNode`] with three `Value` children. Both
//! are shared behind `Rc`, so cloning a value is a pointer copy and reduced
//! subtrees can be slotted into continuation frames freely.
//!
//! Leaves are immutable once produced. The only mutable values are `OBJECT`
//! environments and `pointer` cells, both of which share interior-mutable
//! state through their handles.

use std::{cell::RefCell, rc::Rc};

use indexmap::IndexSet;

use crate::{
    cactus::{Cactus, Segment},
    env::Env,
    error::{ExcKind, RunError, RunResult},
    eval::Interp,
    intern::{Interner, NameId, StaticNames},
    lex::Span,
    types::{matrix::Matrix, num::Number, range::RangeValue},
};

/// JSON object payload for `NATIVE_OBJECT` values.
pub(crate) type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Native operation: pure apart from reads through the environment handle.
pub(crate) type BuiltinFn = fn(&mut Interp, &Value, &Value, &Env) -> RunResult<Value>;

/// Native operation that may replace the environment and manipulate the
/// cactus stack (`reset` / `shift`).
pub(crate) type SpecialFn = fn(&mut Interp, &Value, &Value, &mut Env, &mut Cactus) -> RunResult<Value>;

/// Sub-instruction pointer of the reducer.
///
/// The ordering is load-bearing: the reduction loop compares `ins` against
/// `Left`/`Head`/`Right` to know which children of the current triple are
/// already reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Ins {
    Leaf,
    Tree,
    Left,
    Head,
    Right,
    Return,
    Function,
}

/// A type label: the interned name of a value's type.
///
/// The closed set of labels is pre-interned (see [`StaticNames`]); user
/// functor tags extend it with ordinary interned names. Dispatch looks the
/// label's name up in the environment to find the type's module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Tag(NameId);

impl Tag {
    pub const UNIT: Self = Self::of(StaticNames::Unit);
    pub const NUM: Self = Self::of(StaticNames::Num);
    pub const STRING: Self = Self::of(StaticNames::String);
    pub const SYMBOL: Self = Self::of(StaticNames::Symbol);
    pub const PUNCTUATION: Self = Self::of(StaticNames::Punctuation);
    pub const SEPARATOR: Self = Self::of(StaticNames::Separator);
    pub const THUNK: Self = Self::of(StaticNames::Thunk);
    pub const FUNTHUNK: Self = Self::of(StaticNames::Funthunk);
    pub const FUNCTION: Self = Self::of(StaticNames::Function);
    pub const BUILTIN: Self = Self::of(StaticNames::Builtin);
    pub const SPECIAL: Self = Self::of(StaticNames::Special);
    pub const CONTINUATION: Self = Self::of(StaticNames::Continuation);
    pub const OBJECT: Self = Self::of(StaticNames::Object);
    pub const NATIVE_OBJECT: Self = Self::of(StaticNames::NativeObject);
    pub const ERROR: Self = Self::of(StaticNames::Error);
    pub const TREE: Self = Self::of(StaticNames::Tree);
    pub const VEC: Self = Self::of(StaticNames::Vec);
    pub const NUM_VEC: Self = Self::of(StaticNames::NumVec);
    pub const NUM_SET: Self = Self::of(StaticNames::NumSet);
    pub const RANGE: Self = Self::of(StaticNames::Range);
    pub const MATRIX: Self = Self::of(StaticNames::Matrix);
    pub const POINTER: Self = Self::of(StaticNames::Pointer);
    pub const SOME: Self = Self::of(StaticNames::SomeFunctor);
    pub const TRUE: Self = Self::of(StaticNames::True);
    pub const FALSE: Self = Self::of(StaticNames::False);

    const fn of(name: StaticNames) -> Self {
        Self(name.id())
    }

    /// The interned name of this label.
    pub fn name_id(self) -> NameId {
        self.0
    }
}

/// A user function: two parameter names, a baked body, and the captured
/// defining environment.
#[derive(Debug)]
pub(crate) struct Function {
    pub left_name: NameId,
    pub right_name: NameId,
    pub body: Value,
    pub env: Env,
}

/// A captured continuation: the spliced stack segment plus the environment
/// it was captured with. Invoking it reinstalls a copy of the segment, so a
/// continuation may be resumed any number of times.
#[derive(Debug)]
pub(crate) struct Continuation {
    pub segment: Segment,
    pub env: Env,
}

/// Payload of an `ERROR` leaf, produced when a native call fails and the
/// failure is reified through `shift "error"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ErrorPayload {
    pub kind: ExcKind,
    pub message: String,
}

/// A named native operation.
#[derive(Clone, Copy)]
pub(crate) struct Builtin {
    pub name: NameId,
    pub f: BuiltinFn,
}

impl std::fmt::Debug for Builtin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Builtin({:?})", self.name)
    }
}

/// A named native operation with stack and environment access.
#[derive(Clone, Copy)]
pub(crate) struct Special {
    pub name: NameId,
    pub f: SpecialFn,
}

impl std::fmt::Debug for Special {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Special({:?})", self.name)
    }
}

/// Atomic payloads. Each variant maps to one type label (see
/// [`Value::tag`]); `Boxed` carries a user functor tag of its own.
#[derive(Debug)]
pub(crate) enum Payload {
    Unit,
    Num(Number),
    Str(Rc<str>),
    Symbol(NameId),
    Punctuation(NameId),
    Separator(NameId),
    Thunk(Value),
    Funthunk(Value),
    Function(Rc<Function>),
    Builtin(Builtin),
    Special(Special),
    Continuation(Rc<Continuation>),
    Object(Env),
    Native(Rc<JsonMap>),
    Error(Rc<ErrorPayload>),
    Vec(Rc<Vec<Value>>),
    NumVec(Rc<Vec<Number>>),
    NumSet(Rc<IndexSet<Number>>),
    Range(RangeValue),
    Matrix(Rc<Matrix>),
    Pointer(Rc<RefCell<Value>>),
    Boxed(Tag, Value),
}

/// An atomic node: payload plus optional source span.
#[derive(Debug)]
pub(crate) struct Leaf {
    pub payload: Payload,
    pub span: Option<Span>,
}

/// A composite node. Its logical tag is always `TREE`.
#[derive(Debug)]
pub(crate) struct TreeNode {
    pub left: Value,
    pub head: Value,
    pub right: Value,
    pub span: Option<Span>,
}

/// A value of the language: one of the two node shapes, shared.
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Leaf(Rc<Leaf>),
    Tree(Rc<TreeNode>),
}

impl Value {
    pub fn leaf(payload: Payload, span: Option<Span>) -> Self {
        Self::Leaf(Rc::new(Leaf { payload, span }))
    }

    /// Builds a tree node. When `span` is `None` the node inherits the
    /// first span found among its children, so synthesized nodes stay
    /// localizable.
    pub fn tree(left: Self, head: Self, right: Self, span: Option<Span>) -> Self {
        let span = span
            .or_else(|| head.span())
            .or_else(|| left.span())
            .or_else(|| right.span());
        Self::Tree(Rc::new(TreeNode { left, head, right, span }))
    }

    pub fn unit() -> Self {
        Self::leaf(Payload::Unit, None)
    }

    pub fn num(n: Number) -> Self {
        Self::leaf(Payload::Num(n), None)
    }

    pub fn num_i64(n: i64) -> Self {
        Self::num(Number::from_i64(n))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Self::leaf(Payload::Str(s.into()), None)
    }

    pub fn symbol(name: NameId) -> Self {
        Self::leaf(Payload::Symbol(name), None)
    }

    pub fn punctuation(name: NameId) -> Self {
        Self::leaf(Payload::Punctuation(name), None)
    }

    pub fn object(env: Env) -> Self {
        Self::leaf(Payload::Object(env), None)
    }

    pub fn vec(items: Vec<Self>) -> Self {
        Self::leaf(Payload::Vec(Rc::new(items)), None)
    }

    pub fn num_vec(items: Vec<Number>) -> Self {
        Self::leaf(Payload::NumVec(Rc::new(items)), None)
    }

    pub fn num_set(items: IndexSet<Number>) -> Self {
        Self::leaf(Payload::NumSet(Rc::new(items)), None)
    }

    pub fn boxed(tag: Tag, payload: Self) -> Self {
        Self::leaf(Payload::Boxed(tag, payload), None)
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Leaf(leaf) => leaf.span,
            Self::Tree(tree) => tree.span,
        }
    }

    /// The instruction kind a reduction of this value starts in.
    pub fn ins(&self) -> Ins {
        match self {
            Self::Leaf(_) => Ins::Leaf,
            Self::Tree(_) => Ins::Tree,
        }
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    pub fn as_tree(&self) -> Option<&TreeNode> {
        match self {
            Self::Tree(tree) => Some(tree),
            Self::Leaf(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Leaf(leaf) => Some(&leaf.payload),
            Self::Tree(_) => None,
        }
    }

    /// The type label of this value.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Tree(_) => Tag::TREE,
            Self::Leaf(leaf) => match &leaf.payload {
                Payload::Unit => Tag::UNIT,
                Payload::Num(_) => Tag::NUM,
                Payload::Str(_) => Tag::STRING,
                Payload::Symbol(_) => Tag::SYMBOL,
                Payload::Punctuation(_) => Tag::PUNCTUATION,
                Payload::Separator(_) => Tag::SEPARATOR,
                Payload::Thunk(_) => Tag::THUNK,
                Payload::Funthunk(_) => Tag::FUNTHUNK,
                Payload::Function(_) => Tag::FUNCTION,
                Payload::Builtin(_) => Tag::BUILTIN,
                Payload::Special(_) => Tag::SPECIAL,
                Payload::Continuation(_) => Tag::CONTINUATION,
                Payload::Object(_) => Tag::OBJECT,
                Payload::Native(_) => Tag::NATIVE_OBJECT,
                Payload::Error(_) => Tag::ERROR,
                Payload::Vec(_) => Tag::VEC,
                Payload::NumVec(_) => Tag::NUM_VEC,
                Payload::NumSet(_) => Tag::NUM_SET,
                Payload::Range(_) => Tag::RANGE,
                Payload::Matrix(_) => Tag::MATRIX,
                Payload::Pointer(_) => Tag::POINTER,
                Payload::Boxed(tag, _) => *tag,
            },
        }
    }

    /// Whether this value can stand in head position after dispatch.
    pub fn is_function_like(&self) -> bool {
        matches!(
            self.payload(),
            Some(
                Payload::Function(_)
                    | Payload::Builtin(_)
                    | Payload::Special(_)
                    | Payload::Thunk(_)
                    | Payload::Funthunk(_)
                    | Payload::Continuation(_)
                    | Payload::Symbol(_)
                    | Payload::Punctuation(_)
                    | Payload::Object(_)
            )
        )
    }

    /// The number payload, or a type error naming `context`.
    pub fn expect_num(&self, context: &str) -> RunResult<&Number> {
        match self.payload() {
            Some(Payload::Num(n)) => Ok(n),
            _ => Err(RunError::type_error(format!("{context} expects a NUM operand")).with_span(self.span())),
        }
    }

    /// The string payload, or a type error naming `context`.
    pub fn expect_str(&self, context: &str) -> RunResult<&str> {
        match self.payload() {
            Some(Payload::Str(s)) => Ok(s),
            _ => Err(RunError::type_error(format!("{context} expects a STRING operand")).with_span(self.span())),
        }
    }

    /// The vector payload, or a type error naming `context`.
    pub fn expect_vec(&self, context: &str) -> RunResult<&Rc<Vec<Self>>> {
        match self.payload() {
            Some(Payload::Vec(items)) => Ok(items),
            _ => Err(RunError::type_error(format!("{context} expects a vec operand")).with_span(self.span())),
        }
    }

    /// Interprets a `SYMBOL` or `STRING` leaf as a name.
    pub fn name(&self, interner: &mut Interner) -> Option<NameId> {
        match self.payload()? {
            Payload::Symbol(id) | Payload::Punctuation(id) | Payload::Separator(id) => Some(*id),
            Payload::Str(s) => Some(interner.intern(s)),
            _ => None,
        }
    }

    /// Unwraps a `THUNK` / `FUNTHUNK` body or a `FUNCTION` body.
    pub fn unwrap_wrapped(&self) -> Option<Self> {
        match self.payload()? {
            Payload::Thunk(body) | Payload::Funthunk(body) => Some(body.clone()),
            Payload::Function(f) => Some(f.body.clone()),
            Payload::Boxed(_, inner) => Some(inner.clone()),
            _ => None,
        }
    }

    /// Structural equality.
    ///
    /// Identity-bearing values (functions, objects, continuations, pointers,
    /// natives) compare by handle identity; everything else compares by
    /// content. Trees compare recursively.
    pub fn deep_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Tree(a), Self::Tree(b)) => {
                Rc::ptr_eq(a, b)
                    || (a.left.deep_eq(&b.left) && a.head.deep_eq(&b.head) && a.right.deep_eq(&b.right))
            }
            (Self::Leaf(a), Self::Leaf(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                match (&a.payload, &b.payload) {
                    (Payload::Unit, Payload::Unit) => true,
                    (Payload::Num(x), Payload::Num(y)) => x == y,
                    (Payload::Str(x), Payload::Str(y)) => x == y,
                    (Payload::Symbol(x), Payload::Symbol(y))
                    | (Payload::Punctuation(x), Payload::Punctuation(y))
                    | (Payload::Separator(x), Payload::Separator(y)) => x == y,
                    (Payload::Thunk(x), Payload::Thunk(y)) | (Payload::Funthunk(x), Payload::Funthunk(y)) => {
                        x.deep_eq(y)
                    }
                    (Payload::Function(x), Payload::Function(y)) => Rc::ptr_eq(x, y),
                    (Payload::Builtin(x), Payload::Builtin(y)) => x.name == y.name && std::ptr::fn_addr_eq(x.f, y.f),
                    (Payload::Special(x), Payload::Special(y)) => x.name == y.name && std::ptr::fn_addr_eq(x.f, y.f),
                    (Payload::Continuation(x), Payload::Continuation(y)) => Rc::ptr_eq(x, y),
                    (Payload::Object(x), Payload::Object(y)) => x.ptr_eq(y),
                    (Payload::Native(x), Payload::Native(y)) => Rc::ptr_eq(x, y) || x == y,
                    (Payload::Error(x), Payload::Error(y)) => x == y,
                    (Payload::Vec(x), Payload::Vec(y)) => {
                        x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a.deep_eq(b))
                    }
                    (Payload::NumVec(x), Payload::NumVec(y)) => x == y,
                    (Payload::NumSet(x), Payload::NumSet(y)) => **x == **y,
                    (Payload::Range(x), Payload::Range(y)) => x == y,
                    (Payload::Matrix(x), Payload::Matrix(y)) => x == y,
                    (Payload::Pointer(x), Payload::Pointer(y)) => Rc::ptr_eq(x, y),
                    (Payload::Boxed(tx, x), Payload::Boxed(ty, y)) => tx == ty && x.deep_eq(y),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Renders the printed form of this value.
    pub fn render(&self, interner: &Interner) -> String {
        let mut out = String::new();
        self.render_into(&mut out, interner);
        out
    }

    fn render_into(&self, out: &mut String, interner: &Interner) {
        match self {
            Self::Tree(tree) => {
                out.push('(');
                tree.left.render_into(out, interner);
                out.push(' ');
                tree.head.render_into(out, interner);
                out.push(' ');
                tree.right.render_into(out, interner);
                out.push(')');
            }
            Self::Leaf(leaf) => match &leaf.payload {
                Payload::Unit => out.push_str("()"),
                Payload::Num(n) => out.push_str(&n.to_string()),
                Payload::Str(s) => {
                    out.push('"');
                    out.push_str(s);
                    out.push('"');
                }
                Payload::Symbol(id) | Payload::Punctuation(id) | Payload::Separator(id) => {
                    out.push_str(interner.resolve(*id));
                }
                Payload::Thunk(body) => {
                    out.push('[');
                    body.render_into(out, interner);
                    out.push(']');
                }
                Payload::Funthunk(body) => {
                    out.push('{');
                    body.render_into(out, interner);
                    out.push('}');
                }
                Payload::Function(f) => {
                    out.push_str("<function ");
                    out.push_str(interner.resolve(f.left_name));
                    out.push(':');
                    out.push_str(interner.resolve(f.right_name));
                    out.push('>');
                }
                Payload::Builtin(b) => {
                    out.push_str("<builtin ");
                    out.push_str(interner.resolve(b.name));
                    out.push('>');
                }
                Payload::Special(s) => {
                    out.push_str("<special ");
                    out.push_str(interner.resolve(s.name));
                    out.push('>');
                }
                Payload::Continuation(c) => {
                    out.push_str("<continuation ");
                    out.push_str(interner.resolve(c.segment.tag));
                    out.push('>');
                }
                Payload::Object(env) => {
                    out.push_str("<object");
                    for name in env.local_names() {
                        out.push(' ');
                        out.push_str(interner.resolve(name));
                    }
                    out.push('>');
                }
                Payload::Native(map) => {
                    let json = serde_json::Value::Object((**map).clone());
                    out.push_str(&json.to_string());
                }
                Payload::Error(e) => {
                    out.push_str("error: ");
                    out.push_str(&e.message);
                }
                Payload::Vec(items) => {
                    out.push('[');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        item.render_into(out, interner);
                    }
                    out.push(']');
                }
                Payload::NumVec(items) => {
                    out.push('[');
                    for (i, n) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&n.to_string());
                    }
                    out.push(']');
                }
                Payload::NumSet(items) => {
                    out.push('{');
                    for (i, n) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&n.to_string());
                    }
                    out.push('}');
                }
                Payload::Range(range) => {
                    out.push_str(&format!("range({}, {}, {})", range.lo, range.step, range.count));
                }
                Payload::Matrix(matrix) => out.push_str(&matrix.render()),
                Payload::Pointer(cell) => {
                    out.push_str("<pointer ");
                    cell.borrow().render_into(out, interner);
                    out.push('>');
                }
                Payload::Boxed(tag, inner) => {
                    out.push_str(interner.resolve(tag.name_id()));
                    if !matches!(inner.payload(), Some(Payload::Unit)) {
                        out.push('(');
                        inner.render_into(out, interner);
                        out.push(')');
                    }
                }
            },
        }
    }
}
