//! Regex-to-IR compilation (§4.2): pattern text -> [`RegexAst`] -> byte
//! grammar [`Node`](crate::node::Node).

mod ast;
mod classes;
mod compile;
mod error;
mod parser;

pub use ast::ByteClass;
pub use ast::RegexAst;
pub use ast::quote_regex;
pub use compile::CompileOptions;
pub use compile::compile;
pub use error::RegexError;
pub use parser::parse;

use crate::node::Node;

/// Parses and compiles a pattern in one step; the common entry point for
/// callers that don't need the intermediate AST (§4.2).
pub fn compile_pattern(pattern: &str, opts: CompileOptions) -> Result<Node, RegexError> {
    let ast = parse(pattern)?;
    Ok(compile(&ast, opts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_bytes::first_bytes;
    use crate::first_bytes::is_nullable;

    fn matches_byte(node: &Node, b: u8) -> bool {
        first_bytes(node).contains(b)
    }

    #[test]
    fn literal_roundtrip() {
        let node = compile_pattern("abc", CompileOptions::default()).unwrap();
        assert!(matches_byte(&node, b'a'));
        assert!(!matches_byte(&node, b'b'));
        assert!(!is_nullable(&node));
    }

    #[test]
    fn star_is_nullable() {
        let node = compile_pattern("a*", CompileOptions::default()).unwrap();
        assert!(is_nullable(&node));
        assert!(matches_byte(&node, b'a'));
    }

    #[test]
    fn plus_is_not_nullable() {
        let node = compile_pattern("a+", CompileOptions::default()).unwrap();
        assert!(!is_nullable(&node));
    }

    #[test]
    fn digit_class() {
        let node = compile_pattern(r"\d", CompileOptions::default()).unwrap();
        assert!(matches_byte(&node, b'5'));
        assert!(!matches_byte(&node, b'a'));
    }

    #[test]
    fn negated_class_excludes_digits() {
        let node = compile_pattern(r"\D", CompileOptions::default()).unwrap();
        assert!(!matches_byte(&node, b'5'));
        assert!(matches_byte(&node, b'a'));
    }

    #[test]
    fn bracket_class_with_range() {
        let node = compile_pattern("[a-cX]", CompileOptions::default()).unwrap();
        assert!(matches_byte(&node, b'b'));
        assert!(matches_byte(&node, b'X'));
        assert!(!matches_byte(&node, b'd'));
    }

    #[test]
    fn bounded_repeat_caps_length() {
        let node = parse("a{2,3}").unwrap();
        assert_eq!(
            node,
            RegexAst::Repeat {
                inner: Box::new(RegexAst::Literal(vec![b'a'])),
                min: 2,
                max: Some(3),
            }
        );
    }

    #[test]
    fn alternation() {
        let node = compile_pattern("cat|dog", CompileOptions::default()).unwrap();
        assert!(matches_byte(&node, b'c'));
        assert!(matches_byte(&node, b'd'));
        assert!(!matches_byte(&node, b'x'));
    }

    #[test]
    fn named_group_parses() {
        let ast = parse("(?P<word>[a-z]+)").unwrap();
        match ast {
            RegexAst::Group { name, .. } => assert_eq!(name.as_deref(), Some("word")),
            other => panic!("expected Group, got {other:?}"),
        }
    }

    #[test]
    fn named_group_compiles_to_a_capture_node() {
        let node = compile_pattern("(?P<word>[a-z]+)", CompileOptions::default()).unwrap();
        match node.kind() {
            crate::node::NodeKind::Capture(_, name, list_append) => {
                assert_eq!(name.as_str(), "word");
                assert!(!*list_append);
            }
            other => panic!("expected Capture, got {other:?}"),
        }
    }

    #[test]
    fn anonymous_group_compiles_to_its_contents_without_a_capture_wrapper() {
        let named = compile_pattern("(?P<word>[a-z]+)", CompileOptions::default()).unwrap();
        let anonymous = compile_pattern("(?:[a-z]+)", CompileOptions::default()).unwrap();
        assert!(!matches!(anonymous.kind(), crate::node::NodeKind::Capture(..)));
        assert_ne!(named, anonymous);
    }

    #[test]
    fn lookahead_is_unsupported() {
        let err = parse("a(?=b)").unwrap_err();
        assert!(matches!(err, RegexError::UnsupportedFeature { .. }));
    }

    #[test]
    fn backreference_is_unsupported() {
        let err = parse(r"(a)\1").unwrap_err();
        assert!(matches!(err, RegexError::UnsupportedFeature { .. }));
    }

    #[test]
    fn anchors_are_stripped() {
        let with = parse("^abc$").unwrap();
        let without = parse("abc").unwrap();
        assert_eq!(with, without);
    }
}
