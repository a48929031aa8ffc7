//! Constructors for the byte grammar IR (§4.1).
//!
//! All constructors canonicalize trivially: `select([x])` returns `x`,
//! `join` of a single child collapses to that child, and empty
//! concatenations become [`null`]. This keeps the graph small and makes
//! structural equality (and therefore interning and memoization) actually
//! catch the duplicates a grammar compiler tends to produce.

use std::collections::HashSet;

use crate::capture::CaptureName;
use crate::node::GenSpec;
use crate::node::Node;
use crate::node::NodeKind;
use crate::node::TempBits;
use crate::lexeme::LexemeSpec;

pub use crate::deferred::recursive;

/// The empty string; the unit of concatenation (§3).
pub fn null() -> Node {
    Node::new(NodeKind::Null)
}

pub fn byte(b: u8) -> Node {
    Node::new(NodeKind::Byte(b))
}

/// An inclusive byte range. Collapses to [`byte`] when `lo == hi`.
pub fn byte_range(lo: u8, hi: u8) -> Node {
    assert!(lo <= hi, "byte_range: lo ({lo}) must be <= hi ({hi})");
    if lo == hi {
        byte(lo)
    } else {
        Node::new(NodeKind::ByteRange(lo, hi))
    }
}

/// Ordered concatenation. Flattens nested `Join`s, drops `Null` children,
/// and collapses to the single child (or [`null`]) when that's all that's
/// left, so a `Join`'s children list is always non-empty when the node
/// kind is actually `Join` (§3 invariants).
pub fn join<I: IntoIterator<Item = Node>>(children: I) -> Node {
    let mut flat = Vec::new();
    for child in children {
        match child.kind() {
            NodeKind::Null => {}
            NodeKind::Join(grandchildren) => flat.extend(grandchildren.iter().cloned()),
            _ => flat.push(child),
        }
    }
    match flat.len() {
        0 => null(),
        1 => flat.into_iter().next().unwrap(),
        _ => Node::new(NodeKind::Join(flat)),
    }
}

/// Lifts a literal byte string into a `Join` of `Byte`s (§4.1: "`string`
/// which flattens to a Join of Bytes").
pub fn string(bytes: &[u8]) -> Node {
    join(bytes.iter().copied().map(byte))
}

/// Nondeterministic choice among unique alternatives (§3). Alternatives are
/// de-duplicated by structural equality; when only one remains and the
/// select is not self-recursive, the select itself is dropped (recursive
/// selects are never collapsed, since being able to loop is the point).
pub fn select<I: IntoIterator<Item = Node>>(alternatives: I, recurse: bool) -> Node {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for alt in alternatives {
        // Flatten nested, non-recursive selects with the same recurse-ness
        // so `select([select([a, b], false), c], false)` reads the same as
        // `select([a, b, c], false)`.
        if let NodeKind::Select(inner, false) = alt.kind() {
            if !recurse {
                for inner_alt in inner {
                    if seen.insert(inner_alt.clone()) {
                        unique.push(inner_alt.clone());
                    }
                }
                continue;
            }
        }
        if seen.insert(alt.clone()) {
            unique.push(alt);
        }
    }
    if unique.len() == 1 && !recurse {
        return unique.into_iter().next().unwrap();
    }
    Node::new(NodeKind::Select(unique, recurse))
}

/// A bounded free-generation region (§3, `Gen`).
pub fn gen(
    body_regex: Node,
    stop_regex: Option<Node>,
    save_stop_text: bool,
    max_tokens: Option<u32>,
) -> Node {
    gen_with_suffix(body_regex, stop_regex, save_stop_text, max_tokens, None)
}

/// Like [`gen`], but with a literal appended once the stop sequence
/// completes (`guidance`'s `gen(..., suffix=...)`; SPEC_FULL.md §3).
pub fn gen_with_suffix(
    body_regex: Node,
    stop_regex: Option<Node>,
    save_stop_text: bool,
    max_tokens: Option<u32>,
    suffix: Option<Node>,
) -> Node {
    Node::new(NodeKind::Gen(GenSpec {
        body_regex,
        stop_regex,
        save_stop_text,
        max_tokens,
        suffix,
    }))
}

/// A terminal whose bytes match `regex` as a single token (§3, `Lexeme`;
/// §4.4).
pub fn lexeme(regex: Node, contextual: bool) -> Node {
    Node::new(NodeKind::Lexeme(LexemeSpec::new(regex, contextual)))
}

/// Like [`lexeme`], but additionally overlays the JSON string escape
/// grammar (quote, `\"`, `\\`, `\n`, `\uXXXX`, ...) on the matched bytes
/// (§3, `Lexeme`'s `json_string` flag). `regex` describes the string's
/// unescaped *content*; the quoting and escaping is expanded here, once,
/// so every consumer downstream (the parser included) sees a plain
/// `Lexeme` with nothing left to special-case.
pub fn json_string_lexeme(regex: Node, contextual: bool) -> Node {
    let body = crate::lexeme::json_string_body(regex);
    Node::new(NodeKind::Lexeme(LexemeSpec::json_string(body, contextual)))
}

/// Records the bytes matched by `child` under `name` (§3, `Capture`).
pub fn capture(child: Node, name: impl Into<CaptureName>, list_append: bool) -> Node {
    Node::new(NodeKind::Capture(child, name.into(), list_append))
}

/// Decorates `child` with an inference temperature (§3, `WithTemperature`).
pub fn with_temperature(child: Node, temperature: f32) -> Node {
    assert!(
        temperature.is_finite() && temperature >= 0.0,
        "temperature must be finite and non-negative, got {temperature}"
    );
    Node::new(NodeKind::WithTemperature(child, TempBits::new(temperature)))
}

/// Caps the number of tokens that may be consumed inside `child` (§3,
/// `TokenLimit`).
pub fn token_limit(child: Node, n: usize) -> Node {
    Node::new(NodeKind::TokenLimit(child, n))
}
