//! The lexer: source text to a token stream with byte-offset spans.
//!
//! Whitespace, comments (`# ... \n`), and plain newlines are consumed here
//! and never reach the parser. Every surviving token carries a [`Span`] with
//! its byte range and 1-based line number; spans flow into the IR so
//! diagnostics stay localizable after many reductions.

use crate::{
    error::{ExcKind, RunError, RunResult},
    types::num::Number,
};

/// Characters that form punctuation runs. A bare `.` is punctuation too but
/// never joins a run.
const PUNCT_CHARS: &str = "-$@&!%*+,?=<>/^\\`~;:";

/// A half-open byte range plus the 1-based line it starts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
    /// 1-based line number of `start`.
    pub line: usize,
}

impl Span {
    pub(crate) fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }
}

/// One lexed token. Payload-carrying kinds own their decoded text.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    /// Integer literal, already decoded (negation and `_` separators applied).
    Num(Number),
    /// Identifier.
    Symbol(String),
    /// String literal with escapes resolved.
    Str(String),
    /// Maximal punctuation run, or a bare `.`.
    Punctuation(String),
    /// The statement separator `|`.
    Separator,
    /// One of `(`, `[`, `{`.
    Lparen(char),
    /// One of `)`, `]`, `}`.
    Rparen(char),
    /// End of input sentinel, always the final token.
    End,
}

impl TokenKind {
    /// Short name for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Num(_) => "number",
            Self::Symbol(_) => "symbol",
            Self::Str(_) => "string",
            Self::Punctuation(_) => "punctuation",
            Self::Separator => "separator",
            Self::Lparen(_) => "opening paren",
            Self::Rparen(_) => "closing paren",
            Self::End => "end of input",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Lexes `source` into tokens, dropping space, comments, and newlines.
///
/// The returned stream always ends with a single [`TokenKind::End`] token.
pub(crate) fn lex(source: &str) -> RunResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    source: &'src str,
    chars: Vec<(usize, char)>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or(self.source.len(), |&(o, _)| o)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>, start: usize) -> RunError {
        RunError::new(ExcKind::Lex, message).with_span(Some(Span::new(start, self.offset(), self.line)))
    }

    fn push(&mut self, kind: TokenKind, start: usize, line: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::new(start, self.offset(), line),
        });
    }

    fn run(mut self) -> RunResult<Vec<Token>> {
        while let Some(c) = self.peek() {
            let start = self.offset();
            let line = self.line;
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.bump();
                }
                '#' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                '|' => {
                    self.bump();
                    self.push(TokenKind::Separator, start, line);
                }
                '(' | '[' | '{' => {
                    self.bump();
                    self.push(TokenKind::Lparen(c), start, line);
                }
                ')' | ']' | '}' => {
                    self.bump();
                    self.push(TokenKind::Rparen(c), start, line);
                }
                '"' => self.string(start, line)?,
                '.' => {
                    self.bump();
                    self.push(TokenKind::Punctuation(".".to_owned()), start, line);
                }
                '_' | '0'..='9' => self.number_or_symbol(start, line)?,
                c if c.is_ascii_alphabetic() => self.symbol(start, line),
                c if PUNCT_CHARS.contains(c) => {
                    let mut run = String::new();
                    while let Some(c) = self.peek() {
                        if !PUNCT_CHARS.contains(c) {
                            break;
                        }
                        run.push(c);
                        self.bump();
                    }
                    self.push(TokenKind::Punctuation(run), start, line);
                }
                other => {
                    self.bump();
                    return Err(self.error(format!("unexpected character {other:?}"), start));
                }
            }
        }
        let end = self.source.len();
        self.tokens.push(Token {
            kind: TokenKind::End,
            span: Span::new(end, end, self.line),
        });
        Ok(self.tokens)
    }

    /// Lexes a run starting with `_` or a digit.
    ///
    /// `_*[A-Za-z]...` is a symbol; anything else matching `[_0-9]+` is a
    /// number. `_` alone is positive infinity, `__` negative infinity, and a
    /// leading `_` before digits negates.
    fn number_or_symbol(&mut self, start: usize, line: usize) -> RunResult<()> {
        let mut text = String::new();
        while self.peek() == Some('_') {
            text.push('_');
            self.bump();
        }
        if self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
                text.push(self.bump().expect("peeked"));
            }
            self.push(TokenKind::Symbol(text), start, line);
            return Ok(());
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '_') {
            text.push(self.bump().expect("peeked"));
        }
        let number = match text.as_str() {
            "_" => Number::INF,
            "__" => Number::NEG_INF,
            _ => {
                let negative = text.starts_with('_');
                let digits: String = text.chars().filter(char::is_ascii_digit).collect();
                if digits.is_empty() {
                    return Err(self.error(format!("invalid number literal {text:?}"), start));
                }
                let n = Number::from_digits(&digits).ok_or_else(|| self.error("invalid number literal", start))?;
                if negative { -n } else { n }
            }
        };
        self.push(TokenKind::Num(number), start, line);
        Ok(())
    }

    fn symbol(&mut self, start: usize, line: usize) {
        let mut text = String::new();
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric() || c == '_') {
            text.push(self.bump().expect("peeked"));
        }
        self.push(TokenKind::Symbol(text), start, line);
    }

    fn string(&mut self, start: usize, line: usize) -> RunResult<()> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string literal", start)),
                Some('"') => break,
                Some('\\') => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.error("unterminated string literal", start));
                    };
                    text.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => other,
                    });
                }
                Some(c) => text.push(c),
            }
        }
        self.push(TokenKind::Str(text), start, line);
        Ok(())
    }
}
