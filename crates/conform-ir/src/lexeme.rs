use std::collections::HashMap;

use crate::builder::byte;
use crate::builder::byte_range;
use crate::builder::capture;
use crate::builder::join;
use crate::builder::select;
use crate::builder::string;
use crate::builder::token_limit;
use crate::builder::with_temperature;
use crate::node::DeferredReference;
use crate::node::Node;
use crate::node::NodeKind;

/// A terminal whose bytes match `regex` as a single token of the enclosing
/// grammar (§3, `Lexeme`; §4.4, "A **lexeme** is a byte-level regex...").
///
/// `contextual` marks the lexeme as legal only where the parent grammar
/// expects a terminal — this is what lets the token mask computation (C5)
/// treat the lexeme's internals as opaque to surrounding whitespace
/// skipping. `json_string` records that `regex` has already been expanded
/// (by [`json_string_body`]) into the quoted, escape-aware automaton, so
/// the parser can treat every `Lexeme` uniformly — there is no separate
/// escaping responsibility left at parse time.
#[derive(Eq, PartialEq, Hash)]
pub struct LexemeSpec {
    pub regex: Node,
    pub contextual: bool,
    pub json_string: bool,
}

impl LexemeSpec {
    pub fn new(regex: Node, contextual: bool) -> Self {
        Self {
            regex,
            contextual,
            json_string: false,
        }
    }

    pub fn json_string(regex: Node, contextual: bool) -> Self {
        Self {
            regex,
            contextual,
            json_string: true,
        }
    }
}

/// Expands a content automaton into the full JSON string it describes:
/// opening quote, the content with every terminal leaf rewritten to its
/// escape-aware form, closing quote (§3, `Lexeme`'s `json_string` flag).
///
/// Rewriting only the leaves (not the surrounding `Join`/`Select`
/// structure) preserves whatever repetition/length-bound shape the content
/// regex already encodes — a `{0,5}` bound stays a `{0,5}` bound, just over
/// escape-aware bytes instead of raw ones.
pub fn json_string_body(content: Node) -> Node {
    let mut cache = HashMap::new();
    join([byte(b'"'), rewrite_escaped(&content, &mut cache), byte(b'"')])
}

fn rewrite_escaped(node: &Node, cache: &mut HashMap<usize, Node>) -> Node {
    if let Some(hit) = cache.get(&node.id()) {
        return hit.clone();
    }
    if let NodeKind::Deferred(d) = node.kind() {
        // Mirrors `conform_ir::deferred::recursive`'s memoized-thunk trick:
        // install a fresh placeholder before recursing so a cycle through
        // this same node sees it already in progress instead of looping.
        let placeholder = DeferredReference::new();
        let placeholder_node = Node::new_deferred(placeholder.clone());
        cache.insert(node.id(), placeholder_node.clone());
        if let Some(value) = d.value() {
            let rewritten = rewrite_escaped(value, cache);
            placeholder
                .resolve(rewritten)
                .expect("fresh deferred reference resolved exactly once");
        }
        return placeholder_node;
    }

    let result = match node.kind() {
        NodeKind::Null => node.clone(),
        NodeKind::Byte(b) => escape_byte(*b),
        NodeKind::ByteRange(lo, hi) => escape_byte_range(*lo, *hi),
        NodeKind::Join(children) => join(children.iter().map(|c| rewrite_escaped(c, cache)).collect::<Vec<_>>()),
        NodeKind::Select(alts, recurse) => {
            select(alts.iter().map(|a| rewrite_escaped(a, cache)).collect::<Vec<_>>(), *recurse)
        }
        NodeKind::Capture(child, name, list_append) => {
            capture(rewrite_escaped(child, cache), name.clone(), *list_append)
        }
        NodeKind::WithTemperature(child, t) => with_temperature(rewrite_escaped(child, cache), t.get()),
        NodeKind::TokenLimit(child, n) => token_limit(rewrite_escaped(child, cache), *n),
        // A free-generation region or an already-expanded lexeme has no
        // "raw content bytes" of its own to escape; leave it alone.
        NodeKind::Gen(_) | NodeKind::Lexeme(_) => node.clone(),
        NodeKind::Deferred(_) => unreachable!("handled above"),
    };
    cache.insert(node.id(), result.clone());
    result
}

/// A byte that may appear literally inside a JSON string: not the quote or
/// backslash, and not a control character (those require some escape).
fn is_plain(b: u8) -> bool {
    !matches!(b, b'"' | b'\\') && b >= 0x20
}

fn escape_byte(b: u8) -> Node {
    match b {
        b'"' => string(b"\\\""),
        b'\\' => string(b"\\\\"),
        0x08 => string(b"\\b"),
        0x0c => string(b"\\f"),
        0x0a => string(b"\\n"),
        0x0d => string(b"\\r"),
        0x09 => string(b"\\t"),
        0x00..=0x1f => string(format!("\\u{b:04x}").as_bytes()),
        _ => byte(b),
    }
}

fn escape_byte_range(lo: u8, hi: u8) -> Node {
    let mut alts = Vec::new();
    let mut run_start: Option<u8> = None;
    let mut b = lo;
    loop {
        if is_plain(b) {
            run_start.get_or_insert(b);
        } else {
            if let Some(start) = run_start.take() {
                alts.push(byte_range(start, b - 1));
            }
            alts.push(escape_byte(b));
        }
        if b == hi {
            break;
        }
        b += 1;
    }
    if let Some(start) = run_start {
        alts.push(byte_range(start, hi));
    }
    select(alts, false)
}
