//! The shape-building parser: tokens to balanced-operand ternary trees.
//!
//! There is no precedence. Operands are consumed three at a time into
//! `Tree(L, H, R)` and further heads chain left-associatively onto the tree
//! built so far. The two exceptions:
//!
//! * heads whose textual form starts with `:` (and the statement separator)
//!   fold to the right, so `a := b + 1` parses as `a := (b + 1)` and
//!   `a | b | c` as `a | (b | c)`;
//! * a dangling head with no right operand gets `UNIT` filled in, so a
//!   trailing `x f` means `x f ()`.
//!
//! Paren families build different nodes: `( ... )` yields the inner
//! expression, `[ ... ]` a `THUNK` leaf, `{ ... }` a `FUNTHUNK` leaf. An
//! empty pair of any kind yields `UNIT`.

use crate::{
    error::{ExcKind, RunError, RunResult},
    intern::{Interner, StaticNames},
    lex::{Span, Token, TokenKind, lex},
    value::{Payload, Value},
};

/// Lexes and parses `source` into a single ternary tree.
///
/// An empty source parses to `UNIT`.
pub(crate) fn parse(source: &str, interner: &mut Interner) -> RunResult<Value> {
    let tokens = lex(source)?;
    Parser {
        tokens,
        pos: 0,
        interner,
    }
    .program()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    interner: &'a mut Interner,
}

impl Parser<'_> {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>, span: Span) -> RunError {
        RunError::new(ExcKind::Parse, message).with_span(Some(span))
    }

    fn at_closing(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Rparen(_) | TokenKind::End)
    }

    fn program(mut self) -> RunResult<Value> {
        if matches!(self.peek().kind, TokenKind::End) {
            return Ok(Value::unit());
        }
        let tree = self.expr()?;
        match &self.peek().kind {
            TokenKind::End => Ok(tree),
            kind => {
                let token = self.peek();
                Err(self.error(
                    format!("dangling {} after a complete expression", kind.name()),
                    token.span,
                ))
            }
        }
    }

    fn expr(&mut self) -> RunResult<Value> {
        let first = self.operand()?;
        self.chain(first)
    }

    /// Chains heads onto an already-parsed left operand until a closing
    /// token. Left-associative by default; right-associative heads hand the
    /// rest of the expression to a recursive call.
    fn chain(&mut self, mut left: Value) -> RunResult<Value> {
        loop {
            if self.at_closing() {
                return Ok(left);
            }
            let head = self.operand()?;
            let right_assoc = self.is_right_assoc(&head);
            if self.at_closing() {
                return Ok(Value::tree(left, head, Value::unit(), None));
            }
            let right = self.operand()?;
            if right_assoc {
                let rest = self.chain(right)?;
                return Ok(Value::tree(left, head, rest, None));
            }
            left = Value::tree(left, head, right, None);
        }
    }

    /// Right-associative heads: the separator, and punctuation whose
    /// textual form starts with `:`.
    fn is_right_assoc(&self, head: &Value) -> bool {
        match head.payload() {
            Some(Payload::Separator(_)) => true,
            Some(Payload::Punctuation(id)) => self.interner.resolve(*id).starts_with(':'),
            _ => false,
        }
    }

    fn operand(&mut self) -> RunResult<Value> {
        let token = self.bump();
        let span = Some(token.span);
        match token.kind {
            TokenKind::Num(n) => Ok(Value::leaf(Payload::Num(n), span)),
            TokenKind::Symbol(name) => {
                let id = self.interner.intern(&name);
                Ok(Value::leaf(Payload::Symbol(id), span))
            }
            TokenKind::Str(text) => Ok(Value::leaf(Payload::Str(text.into()), span)),
            TokenKind::Punctuation(text) => {
                let id = self.interner.intern(&text);
                Ok(Value::leaf(Payload::Punctuation(id), span))
            }
            TokenKind::Separator => Ok(Value::leaf(
                Payload::Separator(StaticNames::Bar.id()),
                span,
            )),
            TokenKind::Lparen(open) => self.parenthesized(open, token.span),
            TokenKind::Rparen(close) => Err(self.error(format!("unmatched closing {close:?}"), token.span)),
            TokenKind::End => Err(self.error("expected an operand, found end of input", token.span)),
        }
    }

    fn parenthesized(&mut self, open: char, open_span: Span) -> RunResult<Value> {
        let expected_close = match open {
            '(' => ')',
            '[' => ']',
            _ => '}',
        };
        // Empty parens of any kind are UNIT.
        if let TokenKind::Rparen(close) = self.peek().kind {
            if close == expected_close {
                let close_token = self.bump();
                let span = Span::new(open_span.start, close_token.span.end, open_span.line);
                return Ok(Value::leaf(Payload::Unit, Some(span)));
            }
            let token = self.peek();
            return Err(self.error(
                format!("mismatched parens: {open:?} closed by {close:?}"),
                token.span,
            ));
        }
        let inner = self.expr()?;
        let close_token = self.bump();
        match close_token.kind {
            TokenKind::Rparen(close) if close == expected_close => {
                let span = Some(Span::new(open_span.start, close_token.span.end, open_span.line));
                match open {
                    '(' => Ok(inner),
                    '[' => Ok(Value::leaf(Payload::Thunk(inner), span)),
                    _ => Ok(Value::leaf(Payload::Funthunk(inner), span)),
                }
            }
            TokenKind::Rparen(close) => Err(self.error(
                format!("mismatched parens: {open:?} closed by {close:?}"),
                close_token.span,
            )),
            _ => Err(self.error(format!("unclosed {open:?}"), open_span)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Tag;

    fn parse_one(source: &str) -> (Value, Interner) {
        let mut interner = Interner::new();
        let tree = parse(source, &mut interner).unwrap();
        (tree, interner)
    }

    #[test]
    fn plain_heads_fold_left() {
        let (tree, interner) = parse_one("1 + 2 * 3");
        assert_eq!(tree.render(&interner), "((1 + 2) * 3)");
    }

    #[test]
    fn colon_heads_fold_right() {
        let (tree, interner) = parse_one("a := 1 + 2");
        assert_eq!(tree.render(&interner), "(a := (1 + 2))");
        let (tree, interner) = parse_one("1 : 2 : 3");
        assert_eq!(tree.render(&interner), "(1 : (2 : 3))");
    }

    #[test]
    fn separators_fold_right() {
        let (tree, interner) = parse_one("1 | 2 | 3");
        assert_eq!(tree.render(&interner), "(1 | (2 | 3))");
    }

    #[test]
    fn paren_families_build_distinct_nodes() {
        let (tree, _) = parse_one("(1 + 2)");
        assert_eq!(tree.tag(), Tag::TREE);
        let (thunk, _) = parse_one("[1 + 2]");
        assert_eq!(thunk.tag(), Tag::THUNK);
        let (funthunk, _) = parse_one("{1 + 2}");
        assert_eq!(funthunk.tag(), Tag::FUNTHUNK);
    }

    #[test]
    fn empty_parens_of_any_kind_are_unit() {
        for source in ["()", "[]", "{}"] {
            let (tree, _) = parse_one(source);
            assert_eq!(tree.tag(), Tag::UNIT, "{source} should parse to UNIT");
        }
    }

    #[test]
    fn dangling_head_gets_unit_right_operand() {
        let (tree, interner) = parse_one("1 f");
        assert_eq!(tree.render(&interner), "(1 f ())");
    }

    #[test]
    fn empty_source_is_unit() {
        let (tree, _) = parse_one("");
        assert_eq!(tree.tag(), Tag::UNIT);
    }

    #[test]
    fn mismatched_parens_are_a_parse_error() {
        let mut interner = Interner::new();
        let err = parse("(1 + 2]", &mut interner).unwrap_err();
        assert_eq!(err.kind(), ExcKind::Parse);
        assert!(err.span().is_some(), "parse errors carry the offending span");
    }

    #[test]
    fn dangling_close_is_a_parse_error() {
        let mut interner = Interner::new();
        let err = parse("1 + 2)", &mut interner).unwrap_err();
        assert_eq!(err.kind(), ExcKind::Parse);
    }

    #[test]
    fn spans_survive_into_the_tree() {
        let (tree, _) = parse_one("1 + 2");
        assert!(tree.span().is_some());
    }
}
