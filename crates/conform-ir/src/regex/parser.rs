//! Recursive-descent parser from pattern text to [`RegexAst`] (§4.2).
//!
//! Supported syntax: literals, `.`, bracket classes (with negation and
//! ranges), the named classes `\d \D \w \W \s \S`, concatenation,
//! alternation (`|`), grouping (`(...)`, `(?:...)`, `(?P<name>...)`), and
//! the quantifiers `* + ? {m} {m,} {m,n}`. Lookaround, backreferences,
//! possessive/lazy quantifiers, and mid-pattern anchors are rejected with
//! [`RegexError::UnsupportedFeature`]; a leading `^` and trailing `$` are
//! accepted and stripped as whole-match anchors, matching the convention
//! that a lexeme regex always matches the whole lexeme anyway.

use super::ast::ByteClass;
use super::ast::RegexAst;
use super::classes;
use super::error::RegexError;

pub fn parse(pattern: &str) -> Result<RegexAst, RegexError> {
    let bytes = pattern.as_bytes();
    let mut p = Parser { src: bytes, pos: 0 };

    let stripped_leading = p.consume_byte(b'^');
    let mut ast = p.parse_alt()?;
    if p.peek() == Some(b'$') {
        p.pos += 1;
    }
    if p.pos != bytes.len() {
        return Err(RegexError::syntax("trailing unparsed input", p.pos));
    }
    let _ = stripped_leading;
    if matches!(ast, RegexAst::Concat(ref v) if v.is_empty()) {
        ast = RegexAst::Literal(Vec::new());
    }
    Ok(ast)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn consume_byte(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_alt(&mut self) -> Result<RegexAst, RegexError> {
        let mut branches = vec![self.parse_concat()?];
        while self.consume_byte(b'|') {
            branches.push(self.parse_concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.into_iter().next().unwrap()
        } else {
            RegexAst::Alt(branches)
        })
    }

    fn parse_concat(&mut self) -> Result<RegexAst, RegexError> {
        let mut parts = Vec::new();
        while let Some(b) = self.peek() {
            if b == b'|' || b == b')' {
                break;
            }
            if b == b'$' && self.pos + 1 == self.src.len() {
                break;
            }
            parts.push(self.parse_quantified()?);
        }
        Ok(match parts.len() {
            1 => parts.into_iter().next().unwrap(),
            _ => RegexAst::Concat(parts),
        })
    }

    fn parse_quantified(&mut self) -> Result<RegexAst, RegexError> {
        let atom = self.parse_atom()?;
        self.parse_quantifier(atom)
    }

    fn parse_quantifier(&mut self, atom: RegexAst) -> Result<RegexAst, RegexError> {
        let (min, max) = match self.peek() {
            Some(b'*') => {
                self.pos += 1;
                (0, None)
            }
            Some(b'+') => {
                self.pos += 1;
                (1, None)
            }
            Some(b'?') => {
                self.pos += 1;
                (0, Some(1))
            }
            Some(b'{') => match self.try_parse_bounds()? {
                Some(bounds) => bounds,
                None => return Ok(atom),
            },
            _ => return Ok(atom),
        };
        if matches!(self.peek(), Some(b'?') | Some(b'+')) {
            return Err(RegexError::unsupported("lazy or possessive quantifiers"));
        }
        Ok(RegexAst::Repeat {
            inner: Box::new(atom),
            min,
            max,
        })
    }

    /// `{m}`, `{m,}`, `{m,n}`. Returns `None` (and rewinds) if `{` does not
    /// start a well-formed bound, in which case `{` is just a literal.
    fn try_parse_bounds(&mut self) -> Result<Option<(u32, Option<u32>)>, RegexError> {
        let start = self.pos;
        self.pos += 1;
        let min = self.parse_number();
        let result = if self.consume_byte(b',') {
            let max = self.parse_number();
            if self.consume_byte(b'}') {
                match (min, max) {
                    (Some(m), m2) => Some((m, m2)),
                    (None, _) => None,
                }
            } else {
                None
            }
        } else if self.consume_byte(b'}') {
            min.map(|m| (m, Some(m)))
        } else {
            None
        };
        if result.is_none() {
            self.pos = start;
        }
        Ok(result)
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.pos == start {
            None
        } else {
            std::str::from_utf8(&self.src[start..self.pos]).ok()?.parse().ok()
        }
    }

    fn parse_atom(&mut self) -> Result<RegexAst, RegexError> {
        match self.peek() {
            Some(b'(') => self.parse_group(),
            Some(b'.') => {
                self.pos += 1;
                Ok(RegexAst::AnyChar)
            }
            Some(b'[') => self.parse_bracket_class(),
            Some(b'\\') => self.parse_escape(),
            Some(b'^') | Some(b'$') => Err(RegexError::unsupported("mid-pattern anchors")),
            Some(_) => self.parse_literal_run(),
            None => Err(RegexError::syntax("unexpected end of pattern", self.pos)),
        }
    }

    /// A maximal run of plain bytes with no special meaning, so that
    /// `ab` compiles to one `Literal` rather than two `Concat` members.
    fn parse_literal_run(&mut self) -> Result<RegexAst, RegexError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'(' | b')' | b'.' | b'[' | b'\\' | b'|' | b'*' | b'+' | b'?' | b'^' | b'$' | b'{') {
                break;
            }
            self.pos += 1;
            // Don't let a quantifier apply to more than the last byte of a
            // multi-byte literal run.
            if matches!(self.peek(), Some(b'*') | Some(b'+') | Some(b'?') | Some(b'{')) {
                break;
            }
        }
        if self.pos == start {
            // A lone quantifier byte couldn't be consumed as a literal;
            // treat it as a one-byte literal so callers make progress.
            self.pos += 1;
        }
        Ok(RegexAst::Literal(self.src[start..self.pos].to_vec()))
    }

    fn parse_group(&mut self) -> Result<RegexAst, RegexError> {
        self.pos += 1; // '('
        let name = if self.peek() == Some(b'?') {
            match self.peek_at(1) {
                Some(b':') => {
                    self.pos += 2;
                    None
                }
                Some(b'P') if self.peek_at(2) == Some(b'<') => {
                    self.pos += 3;
                    let start = self.pos;
                    while self.peek().is_some_and(|b| b != b'>') {
                        self.pos += 1;
                    }
                    let name = std::str::from_utf8(&self.src[start..self.pos])
                        .map_err(|_| RegexError::syntax("non-UTF-8 group name", start))?
                        .to_string();
                    if !self.consume_byte(b'>') {
                        return Err(RegexError::syntax("unterminated group name", self.pos));
                    }
                    Some(name)
                }
                Some(b'=') | Some(b'!') => {
                    return Err(RegexError::unsupported("lookaround"));
                }
                Some(b'<') if matches!(self.peek_at(2), Some(b'=') | Some(b'!')) => {
                    return Err(RegexError::unsupported("lookaround"));
                }
                _ => return Err(RegexError::unsupported("unrecognized (?...) group")),
            }
        } else {
            None
        };
        let inner = self.parse_alt()?;
        if !self.consume_byte(b')') {
            return Err(RegexError::syntax("unterminated group", self.pos));
        }
        Ok(RegexAst::Group {
            inner: Box::new(inner),
            name,
        })
    }

    fn parse_escape(&mut self) -> Result<RegexAst, RegexError> {
        self.pos += 1; // '\'
        let Some(b) = self.peek() else {
            return Err(RegexError::syntax("dangling escape", self.pos));
        };
        self.pos += 1;
        let class = match b {
            b'd' => Some((classes::digit(), false)),
            b'D' => Some((classes::digit(), true)),
            b'w' => Some((classes::word(), false)),
            b'W' => Some((classes::word(), true)),
            b's' => Some((classes::space(), false)),
            b'S' => Some((classes::space(), true)),
            _ => None,
        };
        if let Some((set, negated)) = class {
            return Ok(RegexAst::Class(byteset_to_class(set, negated)));
        }
        if matches!(b, b'1'..=b'9') {
            return Err(RegexError::unsupported("backreferences"));
        }
        let literal = match b {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'0' => b'\0',
            other => other,
        };
        Ok(RegexAst::Literal(vec![literal]))
    }

    fn parse_bracket_class(&mut self) -> Result<RegexAst, RegexError> {
        self.pos += 1; // '['
        let negated = self.consume_byte(b'^');
        let mut ranges = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(RegexError::syntax("unterminated character class", self.pos)),
                Some(b']') if !first => {
                    self.pos += 1;
                    break;
                }
                _ => {}
            }
            first = false;
            let lo = self.parse_class_byte()?;
            if self.peek() == Some(b'-') && self.peek_at(1) != Some(b']') && self.peek_at(1).is_some() {
                self.pos += 1;
                let hi = self.parse_class_byte()?;
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        Ok(RegexAst::Class(ByteClass { ranges, negated }))
    }

    fn parse_class_byte(&mut self) -> Result<u8, RegexError> {
        match self.peek() {
            Some(b'\\') => {
                self.pos += 1;
                let b = self
                    .peek()
                    .ok_or_else(|| RegexError::syntax("dangling escape in class", self.pos))?;
                self.pos += 1;
                Ok(match b {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    other => other,
                })
            }
            Some(b) => {
                self.pos += 1;
                Ok(b)
            }
            None => Err(RegexError::syntax("unterminated character class", self.pos)),
        }
    }
}

fn byteset_to_class(set: crate::byteset::ByteSet, negated: bool) -> ByteClass {
    ByteClass {
        ranges: set.iter().map(|b| (b, b)).collect(),
        negated,
    }
}
