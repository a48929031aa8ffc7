//! The regex AST that sits between pattern text and the byte grammar IR
//! (§4.2: "translate a regex AST ... into the IR").

/// A single character class: a union of inclusive byte ranges, optionally
/// negated against the valid-UTF-8-starting-byte alphabet (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteClass {
    pub ranges: Vec<(u8, u8)>,
    pub negated: bool,
}

impl ByteClass {
    pub fn single(b: u8) -> Self {
        Self {
            ranges: vec![(b, b)],
            negated: false,
        }
    }

    pub fn range(lo: u8, hi: u8) -> Self {
        Self {
            ranges: vec![(lo, hi)],
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexAst {
    /// An exact byte sequence, e.g. produced by [`crate::regex::quote_regex`]
    /// or a literal run of non-special characters.
    Literal(Vec<u8>),
    /// `.` — any Unicode scalar value, excluding `\n` unless the caller
    /// requested dot-all semantics (§4.2).
    AnyChar,
    Class(ByteClass),
    Concat(Vec<RegexAst>),
    Alt(Vec<RegexAst>),
    /// `{m,n}` (or `{m,}` when `max` is `None`); `*`, `+`, `?` desugar to
    /// this during parsing (§4.2).
    Repeat {
        inner: Box<RegexAst>,
        min: u32,
        max: Option<u32>,
    },
    /// A capture group, named (`(?P<name>...)`) or anonymous (`(...)`,
    /// `name` is `None`). Anonymous groups are grouping only: they compile
    /// to their inner node without a `Capture` IR wrapper.
    Group {
        inner: Box<RegexAst>,
        name: Option<String>,
    },
}

impl RegexAst {
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        RegexAst::Literal(bytes.into())
    }
}

/// Lifts a literal string into the regex AST (§4.1's `quote_regex`
/// contract, exposed here since the regex compiler is where a literal
/// actually turns into bytes).
pub fn quote_regex(s: &str) -> RegexAst {
    RegexAst::Literal(s.as_bytes().to_vec())
}
