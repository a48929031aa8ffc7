//! The subgrammar layer (§4.4): bundles a grammar body with the
//! whitespace-skip configuration the token parser needs to apply between
//! lexemes (but never inside one), plus `as_regular_grammar`'s practical
//! instance.

use std::collections::HashMap;

use crate::builder::byte;
use crate::builder::join;
use crate::builder::null;
use crate::builder::recursive;
use crate::builder::select;
use crate::capture::CaptureName;
use crate::node::Node;

/// A grammar wrapped with the whitespace-flexibility configuration
/// described in §4.4. This is parser configuration, not itself a grammar
/// node: the skip-regex is applied by `conform-parser` between lexemes,
/// never by the IR's own matching rules.
pub struct Subgrammar {
    pub body: Node,
    pub skip_regex: Option<Node>,
    pub no_initial_skip: bool,
    pub max_tokens: Option<u32>,
    pub capture_name: Option<CaptureName>,
}

impl Subgrammar {
    pub fn new(body: Node) -> Self {
        Self {
            body,
            skip_regex: None,
            no_initial_skip: false,
            max_tokens: None,
            capture_name: None,
        }
    }

    pub fn with_skip_regex(mut self, skip: Node) -> Self {
        self.skip_regex = Some(skip);
        self
    }

    pub fn suppress_initial_skip(mut self) -> Self {
        self.no_initial_skip = true;
        self
    }

    pub fn with_max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    pub fn with_capture_name(mut self, name: impl Into<CaptureName>) -> Self {
        self.capture_name = Some(name.into());
        self
    }
}

struct TrieNode {
    terminal: bool,
    children: HashMap<u8, TrieNode>,
}

impl TrieNode {
    fn empty() -> Self {
        Self {
            terminal: false,
            children: HashMap::new(),
        }
    }

    fn build(strings: &[&[u8]]) -> Self {
        let mut root = Self::empty();
        for s in strings {
            let mut node = &mut root;
            for &b in *s {
                node = node.children.entry(b).or_insert_with(Self::empty);
            }
            node.terminal = true;
        }
        root
    }
}

/// Zero-or-more repetitions of `char_class` (a one-character grammar, e.g.
/// a `Select` over byte ranges), as a Kleene closure (§4.2's description of
/// `{m,}` repetition collapsed to the `m == 0` case).
///
/// Self-referential via [`recursive`]: the call to `any_string` inside the
/// closure is the same closure expression (monomorphized to the same
/// type), so re-entrance returns the in-progress `Deferred` placeholder
/// instead of looping forever.
pub fn any_string(char_class: Node) -> Node {
    recursive(move || {
        select(
            [null(), join([char_class.clone(), any_string(char_class.clone())])],
            false,
        )
    })
}

/// Builds a grammar matching zero or more `char_class` characters that, as
/// a whole string, is not exactly equal to any byte string in `excluded`.
///
/// This is the concrete instance `as_regular_grammar` exists for in
/// practice (§4.4): "a JSON string but not any of these already-used
/// keys". General boolean composition (`Not`/`And`/`Or`) of arbitrary
/// lexeme regexes would need full automaton complementation; that's out of
/// proportion for this 10%-of-the-budget component, so only the
/// finite-exclusion-set case is implemented (see DESIGN.md).
pub fn exclude_literals(char_class: Node, excluded: &[&[u8]]) -> Node {
    let trie = TrieNode::build(excluded);
    exclude_rec(&trie, &char_class)
}

fn exclude_rec(trie_node: &TrieNode, char_class: &Node) -> Node {
    let mut alts = Vec::new();
    if !trie_node.terminal {
        alts.push(null());
    }
    for b in 0u16..256 {
        let b = b as u8;
        // Only offer bytes the char class itself can produce; this keeps
        // the construction's size bounded by the trie rather than 256
        // dead alternatives per level.
        if !byte_in(char_class, b) {
            continue;
        }
        match trie_node.children.get(&b) {
            Some(child) => alts.push(join([byte(b), exclude_rec(child, char_class)])),
            None => alts.push(join([byte(b), any_string(char_class.clone())])),
        }
    }
    select(alts, false)
}

fn byte_in(char_class: &Node, b: u8) -> bool {
    crate::first_bytes::first_bytes(char_class).contains(b)
}
