//! Range-constrained numeric regexes (§4.3.3: "narrowed ... by generating a
//! range-constrained integer regex").
//!
//! The digit-splitting algorithm below is the standard technique for
//! turning an inclusive integer range into a minimal-ish regular
//! expression: recursively split a mixed-length range at power-of-ten
//! boundaries, then within a same-length range peel one digit at a time,
//! handling the low edge, the free middle digits, and the high edge
//! separately.

/// An inclusive integer range `[min, max]`, both non-negative, expressed as
/// one regex per same-length-digit chunk (joined by the caller).
fn magnitude_patterns(min: u64, max: u64) -> Vec<String> {
    let mut chunks = Vec::new();
    split_by_length(min, max, &mut chunks);
    chunks
        .into_iter()
        .map(|(lo, hi)| {
            let lo_digits = lo.to_string().into_bytes();
            let hi_digits = hi.to_string().into_bytes();
            let mut patterns = Vec::new();
            same_length_patterns(&lo_digits, &hi_digits, &mut patterns);
            // Each chunk must be atomic: callers (e.g. the `-` sign prefix
            // in `signed_range_pattern`) apply to the whole chunk, so an
            // internal `|` from a multi-piece chunk needs grouping.
            match patterns.len() {
                1 => patterns.into_iter().next().unwrap(),
                _ => format!("(?:{})", patterns.join("|")),
            }
        })
        .collect()
}

fn digit_count(n: u64) -> u32 {
    n.to_string().len() as u32
}

fn split_by_length(lo: u64, hi: u64, out: &mut Vec<(u64, u64)>) {
    if lo > hi {
        return;
    }
    let lo_len = digit_count(lo);
    let hi_len = digit_count(hi);
    if lo_len == hi_len {
        out.push((lo, hi));
        return;
    }
    let boundary = 10u64.saturating_pow(lo_len) - 1;
    split_by_length(lo, boundary.min(hi), out);
    split_by_length(boundary + 1, hi, out);
}

fn free_pattern(len: usize) -> String {
    "[0-9]".repeat(len)
}

/// `lo` and `hi` are equal-length decimal digit strings, `lo <= hi`.
/// Produces an alternation of fixed-length patterns covering exactly the
/// integers between them.
///
/// The low and high edge digits are folded into the contiguous middle
/// character class whenever their remaining suffix is already fully free
/// (`[0-9]` all the way down) — e.g. `10`..`99` collapses to
/// `[1-9][0-9]` instead of `1[0-9]|[2-8][0-9]|9[0-9]` — so ranges that
/// don't actually need a three-way split don't get one.
fn same_length_patterns(lo: &[u8], hi: &[u8], out: &mut Vec<String>) {
    if lo.is_empty() {
        out.push(String::new());
        return;
    }
    if lo[0] == hi[0] {
        let mut rest = Vec::new();
        same_length_patterns(&lo[1..], &hi[1..], &mut rest);
        for r in rest {
            out.push(format!("{}{r}", lo[0] as char));
        }
        return;
    }

    let rest_len = lo.len() - 1;
    let free = free_pattern(rest_len);
    let nines = vec![b'9'; rest_len];
    let zeros = vec![b'0'; rest_len];

    let mut low_rest = Vec::new();
    same_length_patterns(&lo[1..], &nines, &mut low_rest);
    let low_is_free = low_rest.len() == 1 && low_rest[0] == free;

    let mut high_rest = Vec::new();
    same_length_patterns(&zeros, &hi[1..], &mut high_rest);
    let high_is_free = high_rest.len() == 1 && high_rest[0] == free;

    if !low_is_free {
        for r in &low_rest {
            out.push(format!("{}{r}", lo[0] as char));
        }
    }

    let mid_lo = if low_is_free { lo[0] } else { lo[0] + 1 };
    let mid_hi = if high_is_free { hi[0] } else { hi[0] - 1 };
    if mid_lo <= mid_hi {
        let class = if mid_lo == mid_hi {
            format!("{}", mid_lo as char)
        } else {
            format!("[{}-{}]", mid_lo as char, mid_hi as char)
        };
        out.push(format!("{class}{free}"));
    }

    if !high_is_free {
        for r in &high_rest {
            out.push(format!("{}{r}", hi[0] as char));
        }
    }
}

/// `-?(0|[1-9][0-9]*)` narrowed to `[min, max]` (§4.3.3). `min`/`max` are
/// already resolved to inclusive bounds by the caller (exclusivity is
/// folded in before this is called).
pub fn integer_range_pattern(min: Option<i64>, max: Option<i64>) -> String {
    match (min, max) {
        (None, None) => r"-?(0|[1-9][0-9]*)".to_string(),
        (min, max) => {
            let min = min.unwrap_or(i64::MIN / 2);
            let max = max.unwrap_or(i64::MAX / 2);
            signed_range_pattern(min, max)
        }
    }
}

fn signed_range_pattern(min: i64, max: i64) -> String {
    assert!(min <= max, "integer_range_pattern: min ({min}) > max ({max})");
    let mut alts = Vec::new();
    if min < 0 {
        let neg_hi = (-min) as u64;
        let neg_lo = if max < 0 { (-max) as u64 } else { 1 };
        if neg_lo <= neg_hi {
            for pat in magnitude_patterns(neg_lo, neg_hi) {
                alts.push(format!("-{pat}"));
            }
        }
    }
    if max >= 0 {
        let pos_lo = min.max(0) as u64;
        let pos_hi = max as u64;
        alts.extend(magnitude_patterns(pos_lo, pos_hi));
    }
    if alts.len() == 1 {
        alts.into_iter().next().unwrap()
    } else {
        format!("(?:{})", alts.join("|"))
    }
}

/// A `number` regex: an integer part narrowed to the floor/ceiling of the
/// bounds, plus an optional fractional part and an optional exponent
/// (§4.3.3). This is a documented approximation — see DESIGN.md — rather
/// than a tight float-range regex, which the spec's "narrowed similarly"
/// leaves unspecified in enough detail to pin down exactly.
pub fn number_range_pattern(min: Option<f64>, max: Option<f64>) -> String {
    let int_min = min.map(|m| m.floor() as i64);
    let int_max = max.map(|m| m.ceil() as i64);
    let integer_part = integer_range_pattern(int_min, int_max);
    format!(r"{integer_part}(\.[0-9]+)?([eE][+-]?[0-9]+)?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::regex::compile_pattern;
    use conform_ir::regex::CompileOptions;
    use conform_ir::first_bytes::first_bytes;

    fn compiles(pattern: &str) {
        compile_pattern(pattern, CompileOptions::default()).expect("pattern should compile");
    }

    #[test]
    fn small_range_splits_correctly() {
        let pat = integer_range_pattern(Some(10), Some(99));
        assert_eq!(pat, "[1-9][0-9]");
        compiles(&pat);
    }

    #[test]
    fn single_value_range() {
        assert_eq!(integer_range_pattern(Some(7), Some(7)), "7");
    }

    #[test]
    fn crosses_digit_length_boundary() {
        let pat = integer_range_pattern(Some(8), Some(12));
        compiles(&pat);
        // 8, 9, 10, 11, 12 - first byte of the compiled grammar should
        // accept both '8'/'9' (one-digit) and '1' (two-digit) alternatives.
        let node = compile_pattern(&pat, CompileOptions::default()).unwrap();
        let first = first_bytes(&node);
        assert!(first.contains(b'8'));
        assert!(first.contains(b'1'));
        assert!(!first.contains(b'2'));
    }

    #[test]
    fn negative_and_positive_span() {
        let pat = integer_range_pattern(Some(-5), Some(5));
        compiles(&pat);
    }

    #[test]
    fn negative_only_range() {
        let pat = integer_range_pattern(Some(-99), Some(-10));
        compiles(&pat);
        let node = compile_pattern(&pat, CompileOptions::default()).unwrap();
        assert!(first_bytes(&node).contains(b'-'));
    }
}
