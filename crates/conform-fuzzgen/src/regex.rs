//! Random regex pattern generation, restricted to the subset
//! `conform_ir::regex::parser` accepts (literals, `.`, bracket classes,
//! `?`/`*`/`+`/`{m,n}` quantifiers, `(...)`/`(?:...)`/`(?P<name>...)`
//! groups, `|` alternation) so a generated pattern is either compiled and
//! exercised, or rejected with a specific `UnsupportedFeature`, never a
//! generic parse failure from reaching for syntax this crate never claimed
//! to support.

use arbitrary::Result;
use arbitrary::Unstructured;

const MAX_DEPTH: usize = 3;

pub struct RegexBuilder<'a, 'u> {
    u: &'a mut Unstructured<'u>,
}

impl<'a, 'u> RegexBuilder<'a, 'u> {
    pub fn new(u: &'a mut Unstructured<'u>) -> Self {
        Self { u }
    }

    pub fn arbitrary_pattern(&mut self) -> Result<String> {
        self.alternation(0)
    }

    fn alternation(&mut self, depth: usize) -> Result<String> {
        let branches = self.u.int_in_range(1..=3usize)?;
        let mut parts = Vec::with_capacity(branches);
        for _ in 0..branches {
            parts.push(self.concat(depth)?);
        }
        Ok(parts.join("|"))
    }

    fn concat(&mut self, depth: usize) -> Result<String> {
        let atoms = self.u.int_in_range(1..=4usize)?;
        let mut out = String::new();
        for _ in 0..atoms {
            out.push_str(&self.quantified(depth)?);
        }
        Ok(out)
    }

    fn quantified(&mut self, depth: usize) -> Result<String> {
        let atom = self.atom(depth)?;
        let quantifier = match self.u.int_in_range(0..=4u8)? {
            0 => "",
            1 => "?",
            2 => "*",
            3 => "+",
            _ => "{1,3}",
        };
        Ok(format!("{atom}{quantifier}"))
    }

    fn atom(&mut self, depth: usize) -> Result<String> {
        if depth < MAX_DEPTH && self.u.int_in_range(0..=3u8)? == 0 {
            let inner = self.alternation(depth + 1)?;
            return Ok(match self.u.int_in_range(0..=2u8)? {
                0 => format!("({inner})"),
                1 => format!("(?:{inner})"),
                _ => format!("(?P<g{depth}>{inner})"),
            });
        }
        match self.u.int_in_range(0..=3u8)? {
            0 => Ok(".".to_string()),
            1 => Ok("[a-z0-9]".to_string()),
            2 => {
                let c = (b'a' + self.u.int_in_range(0..=25u8)?) as char;
                Ok(c.to_string())
            }
            _ => Ok("[A-Za-z]".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_pattern_from_arbitrary_bytes() {
        let bytes: Vec<u8> = (0u8..=255).cycle().take(256).collect();
        let mut u = Unstructured::new(&bytes);
        let pattern = RegexBuilder::new(&mut u).arbitrary_pattern().unwrap();
        assert!(!pattern.is_empty());
    }
}
