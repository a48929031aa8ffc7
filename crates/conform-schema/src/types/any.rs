//! The "anything" grammar for `Schema::Bool(true)` and bare `{}` schemas
//! (§4.3.3): any well-formed JSON value, recursively. Needed wherever a
//! schema admits an unconstrained sub-value — `additionalProperties: true`,
//! `items: true`, or a `type`-less schema with no combinator.

use conform_ir::builder::join;
use conform_ir::builder::json_string_lexeme;
use conform_ir::builder::recursive;
use conform_ir::builder::select;
use conform_ir::builder::string;
use conform_ir::regex::compile_pattern;
use conform_ir::regex::CompileOptions;
use conform_ir::Node;

use crate::number::number_range_pattern;
use crate::repeat::repeat_homogeneous;
use crate::types::boolean;
use crate::types::null;

fn any_string() -> Node {
    let content = compile_pattern(".*", CompileOptions { dot_all: true }).expect("built-in pattern must compile");
    json_string_lexeme(content, true)
}

fn any_number() -> Node {
    let pattern = number_range_pattern(None, None);
    compile_pattern(&pattern, CompileOptions::default()).expect("number pattern must compile")
}

/// Any well-formed JSON value. Self-referential through `array`/`object`
/// members via [`recursive`].
pub fn compile() -> Node {
    recursive(|| {
        let array = join([string(b"["), recursive(any_array_tail), string(b"]")]);
        let object = join([string(b"{"), recursive(any_object_tail), string(b"}")]);
        select(
            [null::compile(), boolean::compile(), any_number(), any_string(), array, object],
            false,
        )
    })
}

fn any_array_tail() -> Node {
    repeat_homogeneous(recursive(compile), string(b","), 0, None)
}

fn any_object_tail() -> Node {
    let pair = join([any_string(), string(b":"), recursive(compile)]);
    repeat_homogeneous(pair, string(b","), 0, None)
}

#[cfg(test)]
mod tests {
    use conform_ir::first_bytes::first_bytes;
    use conform_ir::first_bytes::is_nullable;

    use super::*;

    #[test]
    fn every_json_value_kind_is_a_reachable_first_byte() {
        let g = compile();
        let first = first_bytes(&g);
        for b in [b'n', b't', b'f', b'"', b'[', b'{', b'-'] {
            assert!(first.contains(b), "missing first byte {b:?}");
        }
        // a digit, not just the sign, must also be a valid number start
        assert!(first.contains(b'0'));
    }

    #[test]
    fn is_not_nullable_every_value_kind_requires_at_least_one_byte() {
        assert!(!is_nullable(&compile()));
    }
}
