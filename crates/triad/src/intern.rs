//! Name interning for symbols, operator names, and type labels.
//!
//! Every identifier-like string in the interpreter (symbols, punctuation
//! runs, type labels, dispatch keys) is stored once in an [`Interner`] and
//! referred to by a [`NameId`]. Environments and dispatch tables key on ids,
//! so name comparison is an integer compare and the actual bytes are only
//! needed for error messages and printing.
//!
//! NameIds are laid out as follows:
//! * 0 to count(StaticNames) - names known at compile time
//! * everything above - names interned per session (source symbols,
//!   combined `op:operand` dispatch keys)

use ahash::AHashMap;
use strum::{EnumCount, FromRepr, IntoStaticStr};

/// Index into the interner's storage.
///
/// Uses `u32` to save space; environments and frames store many of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NameId(u32);

impl NameId {
    /// Returns the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Names which are known at compile time and pre-interned at fixed ids.
///
/// The discriminant of each variant is its `NameId`, so conversion in either
/// direction is free. Order is load-bearing: never reorder without also
/// migrating persisted references (there are none today).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr, EnumCount)]
pub(crate) enum StaticNames {
    // Type labels. These double as the environment names the dispatch
    // modules are bound under.
    #[strum(serialize = "UNIT")]
    Unit,
    #[strum(serialize = "NUM")]
    Num,
    #[strum(serialize = "STRING")]
    String,
    #[strum(serialize = "SYMBOL")]
    Symbol,
    #[strum(serialize = "PUNCTUATION")]
    Punctuation,
    #[strum(serialize = "SEPARATOR")]
    Separator,
    #[strum(serialize = "THUNK")]
    Thunk,
    #[strum(serialize = "FUNTHUNK")]
    Funthunk,
    #[strum(serialize = "FUNCTION")]
    Function,
    #[strum(serialize = "BUILTIN")]
    Builtin,
    #[strum(serialize = "SPECIAL")]
    Special,
    #[strum(serialize = "CONTINUATION")]
    Continuation,
    #[strum(serialize = "OBJECT")]
    Object,
    #[strum(serialize = "NATIVE_OBJECT")]
    NativeObject,
    #[strum(serialize = "ERROR")]
    Error,
    #[strum(serialize = "TREE")]
    Tree,
    #[strum(serialize = "vec")]
    Vec,
    #[strum(serialize = "num_vec")]
    NumVec,
    #[strum(serialize = "num_set")]
    NumSet,
    #[strum(serialize = "range")]
    Range,
    #[strum(serialize = "matrix")]
    Matrix,
    #[strum(serialize = "pointer")]
    Pointer,
    #[strum(serialize = "Some")]
    SomeFunctor,
    #[strum(serialize = "true")]
    True,
    #[strum(serialize = "false")]
    False,

    // Names the reducer synthesizes or compares against.
    #[strum(serialize = "__root__")]
    RootTag,
    #[strum(serialize = "error")]
    ErrorTag,
    #[strum(serialize = "reset")]
    Reset,
    #[strum(serialize = "shift")]
    Shift,
    #[strum(serialize = "func")]
    Func,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = "$")]
    Dollar,
    #[strum(serialize = "@")]
    At,
    #[strum(serialize = "|")]
    Bar,
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    #[strum(serialize = "_")]
    Underscore,
    #[strum(serialize = "F")]
    SelfFunction,
}

impl From<StaticNames> for NameId {
    #[inline]
    fn from(name: StaticNames) -> Self {
        Self(name as u32)
    }
}

impl StaticNames {
    /// The `NameId` this static name is pre-interned at.
    #[inline]
    pub const fn id(self) -> NameId {
        NameId(self as u32)
    }
}

/// Interned name storage for one interpreter session.
///
/// Names are never removed; a `NameId` stays valid for the life of the
/// session that produced it.
#[derive(Debug)]
pub(crate) struct Interner {
    names: Vec<Box<str>>,
    ids: AHashMap<Box<str>, NameId>,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    /// Creates an interner with all [`StaticNames`] pre-interned at their
    /// fixed ids.
    pub fn new() -> Self {
        let mut interner = Self {
            names: Vec::with_capacity(StaticNames::COUNT + 64),
            ids: AHashMap::with_capacity(StaticNames::COUNT + 64),
        };
        for index in 0..StaticNames::COUNT as u32 {
            let name = StaticNames::from_repr(index).expect("static name indices are dense");
            let text: &'static str = name.into();
            interner.names.push(text.into());
            interner.ids.insert(text.into(), NameId(index));
        }
        interner
    }

    /// Interns `name`, returning the existing id when already present.
    pub fn intern(&mut self, name: &str) -> NameId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = NameId(u32::try_from(self.names.len()).expect("interner overflow"));
        self.names.push(name.into());
        self.ids.insert(name.into(), id);
        id
    }

    /// Returns the text of an interned name.
    ///
    /// # Panics
    /// Panics if `id` did not come from this interner.
    pub fn resolve(&self, id: NameId) -> &str {
        &self.names[id.index()]
    }

    /// Interns the combined `op:operand` dispatch key for two names.
    pub fn dispatch_key(&mut self, op: NameId, operand: NameId) -> NameId {
        let key = format!("{}:{}", self.resolve(op), self.resolve(operand));
        self.intern(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_names_roundtrip() {
        let mut interner = Interner::new();
        assert_eq!(interner.resolve(StaticNames::Num.id()), "NUM");
        assert_eq!(interner.resolve(StaticNames::RootTag.id()), "__root__");
        assert_eq!(interner.intern("vec"), StaticNames::Vec.id());
    }

    #[test]
    fn interning_is_idempotent() {
        let mut interner = Interner::new();
        let a = interner.intern("countdown");
        let b = interner.intern("countdown");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "countdown");
    }

    #[test]
    fn dispatch_key_combines_names() {
        let mut interner = Interner::new();
        let plus = interner.intern("+");
        let key = interner.dispatch_key(plus, StaticNames::Num.id());
        assert_eq!(interner.resolve(key), "+:NUM");
    }
}
