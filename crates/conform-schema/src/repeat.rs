//! Homogeneous, separator-delimited repetition of a single grammar node a
//! bounded or unbounded number of times — the array/object analogue of
//! `conform_ir::regex`'s `{m,n}` expansion (§4.3.3's array/object tails),
//! generalized from byte terminals to arbitrary sub-grammars and with a
//! separator woven between occurrences.

use conform_ir::builder::join;
use conform_ir::builder::null;
use conform_ir::builder::recursive;
use conform_ir::builder::select;
use conform_ir::Node;

/// `item` repeated `min..=max` times (or `min..` if `max` is `None`),
/// joined by `separator` between (never before the first or after the
/// last).
pub fn repeat_homogeneous(item: Node, separator: Node, min: u64, max: Option<u64>) -> Node {
    if max == Some(0) {
        return null();
    }

    if min == 0 {
        let extra = match max {
            Some(max) => bounded_rest(&item, &separator, max - 1),
            None => unbounded_rest(item.clone(), separator.clone()),
        };
        return select([null(), join([item, extra])], false);
    }

    let mut mandatory = Vec::new();
    for i in 0..min {
        if i > 0 {
            mandatory.push(separator.clone());
        }
        mandatory.push(item.clone());
    }
    let extra = match max {
        Some(max) => bounded_rest(&item, &separator, max - min),
        None => unbounded_rest(item.clone(), separator.clone()),
    };
    mandatory.push(extra);
    join(mandatory)
}

fn bounded_rest(item: &Node, separator: &Node, remaining: u64) -> Node {
    if remaining == 0 {
        return null();
    }
    let rest = bounded_rest(item, separator, remaining - 1);
    select([null(), join([separator.clone(), item.clone(), rest])], false)
}

fn unbounded_rest(item: Node, separator: Node) -> Node {
    recursive(move || {
        select(
            [null(), join([separator.clone(), item.clone(), unbounded_rest(item.clone(), separator.clone())])],
            false,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::byte;
    use conform_ir::builder::string;
    use conform_ir::first_bytes::first_bytes;
    use conform_ir::first_bytes::is_nullable;

    #[test]
    fn zero_min_unbounded_is_nullable() {
        let g = repeat_homogeneous(byte(b'x'), string(b","), 0, None);
        assert!(is_nullable(&g));
        assert!(first_bytes(&g).contains(b'x'));
    }

    #[test]
    fn positive_min_is_not_nullable() {
        let g = repeat_homogeneous(byte(b'x'), string(b","), 1, Some(3));
        assert!(!is_nullable(&g));
    }

    #[test]
    fn max_zero_accepts_only_empty() {
        let g = repeat_homogeneous(byte(b'x'), string(b","), 0, Some(0));
        assert!(is_nullable(&g));
        assert!(!first_bytes(&g).contains(b'x'));
    }
}
