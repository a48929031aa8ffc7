//! The ordered-optional-sequence construction shared by arrays
//! (`prefixItems`) and objects (optional `properties`) — §4.3.4.
//!
//! ```text
//! T_i(prefixed):
//!   i > n        -> ε
//!   req_i        -> (prefixed ? ", " e_i : e_i) . T_{i+1}(true)
//!   !req_i       -> prefixed ? (", " e_i . T_{i+1}(true))?
//!                            : T_{i+1}(false) | e_i . T_{i+1}(true)
//! whole = T_1(false)
//! ```

use conform_ir::builder::join;
use conform_ir::builder::null;
use conform_ir::builder::select;
use conform_ir::Node;

pub struct SequenceItem {
    pub grammar: Node,
    pub required: bool,
}

impl SequenceItem {
    pub fn required(grammar: Node) -> Self {
        Self { grammar, required: true }
    }

    pub fn optional(grammar: Node) -> Self {
        Self { grammar, required: false }
    }
}

/// Builds `T_1(false)` over `items`, using `separator` between any two
/// present items (never leading or trailing).
pub fn build_sequence(items: &[SequenceItem], separator: &Node) -> Node {
    t(items, 0, false, separator)
}

fn t(items: &[SequenceItem], i: usize, prefixed: bool, separator: &Node) -> Node {
    let Some(item) = items.get(i) else {
        return null();
    };

    if item.required {
        let this = if prefixed {
            join([separator.clone(), item.grammar.clone()])
        } else {
            item.grammar.clone()
        };
        join([this, t(items, i + 1, true, separator)])
    } else if prefixed {
        let tail = join([separator.clone(), item.grammar.clone(), t(items, i + 1, true, separator)]);
        select([null(), tail], false)
    } else {
        let skip = t(items, i + 1, false, separator);
        let take = join([item.grammar.clone(), t(items, i + 1, true, separator)]);
        select([skip, take], false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::byte;
    use conform_ir::builder::string;
    use conform_ir::first_bytes::is_nullable;

    #[test]
    fn all_required_is_not_nullable() {
        let items = vec![SequenceItem::required(byte(b'a')), SequenceItem::required(byte(b'b'))];
        let seq = build_sequence(&items, &string(b","));
        assert!(!is_nullable(&seq));
    }

    #[test]
    fn all_optional_is_nullable() {
        let items = vec![SequenceItem::optional(byte(b'a')), SequenceItem::optional(byte(b'b'))];
        let seq = build_sequence(&items, &string(b","));
        assert!(is_nullable(&seq));
    }

    #[test]
    fn leading_required_then_optional_is_not_nullable() {
        let items = vec![SequenceItem::required(byte(b'a')), SequenceItem::optional(byte(b'b'))];
        let seq = build_sequence(&items, &string(b","));
        assert!(!is_nullable(&seq));
    }
}
