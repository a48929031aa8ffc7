//! Token mask computation (§4.5: "the parser maintains a trie over the
//! tokenizer's vocabulary and walks it in parallel with the frontier").

use conform_ir::first_bytes::first_bytes;
use conform_ir::first_bytes::is_nullable;
use conform_ir::node::Node;

use crate::derivative::derivative;
use crate::derivative::Step;
use crate::derivative::Unresolved;
use crate::trie::TrieNodeId;
use crate::trie::VocabTrie;

/// A packed byte-per-token bitmap (§6: "packed byte-per-token mask"): `0`
/// disallowed, nonzero allowed. A byte per entry rather than a real bitset
/// because this is handed to an oracle implementation across a plain byte
/// buffer (e.g. to add as a logit bias), where bit-packing would just cost
/// an unpacking step on the other side for no benefit here.
pub struct TokenMask {
    allowed: Vec<u8>,
}

impl TokenMask {
    fn new(vocab_size: usize) -> Self {
        Self {
            allowed: vec![0; vocab_size],
        }
    }

    fn allow(&mut self, token_id: u32) {
        if let Some(slot) = self.allowed.get_mut(token_id as usize) {
            *slot = 1;
        }
    }

    pub fn is_allowed(&self, token_id: u32) -> bool {
        self.allowed.get(token_id as usize).copied().unwrap_or(0) != 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.allowed
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

/// Computes the set of vocabulary tokens that can legally be sampled next
/// given `residual` (§4.5, "Token mask computation").
///
/// Walks the trie depth-first, pruning any byte not in the current
/// position's FIRST set before even attempting its derivative — the trie
/// can have tens of thousands of live branches, and most of a typical
/// grammar's alphabet is excluded at any given position.
///
/// A token whose bytes run past the end of what the grammar can still
/// accept is only included when the residual is itself already accepting
/// (§4.5, "Accepting-state relaxation") — the token is then truncated in
/// effect by the caller substituting EOS, never submitted as the
/// raw over-long token.
pub fn compute(trie: &VocabTrie, residual: &Node, vocab_size: usize) -> Result<TokenMask, Unresolved> {
    let mut mask = TokenMask::new(vocab_size);
    walk(trie, VocabTrie::ROOT, residual, &mut mask)?;
    if is_nullable(residual) {
        mask.allow(trie.eos_token_id());
    }
    Ok(mask)
}

fn walk(trie: &VocabTrie, trie_node: TrieNodeId, residual: &Node, mask: &mut TokenMask) -> Result<(), Unresolved> {
    for &token_id in trie.tokens_ending_here(trie_node) {
        mask.allow(token_id);
    }
    let first = first_bytes(residual);
    for (byte, child) in trie.children(trie_node) {
        if !first.contains(byte) {
            continue;
        }
        if let Step::Ok(next_residual) = derivative(residual, byte)? {
            walk(trie, child, &next_residual, mask)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::select;
    use conform_ir::builder::string;
    use crate::trie::VocabEntry;

    #[test]
    fn masks_only_grammar_consistent_tokens() {
        let grammar = select([string(b"foo"), string(b"bar")], false);
        let vocab = vec![
            VocabEntry { token_id: 1, bytes: b"foo".to_vec() },
            VocabEntry { token_id: 2, bytes: b"baz".to_vec() },
            VocabEntry { token_id: 3, bytes: b"bar".to_vec() },
        ];
        let trie = VocabTrie::build(&vocab, 99);
        let mask = compute(&trie, &grammar, 100).unwrap();
        assert!(mask.is_allowed(1));
        assert!(!mask.is_allowed(2));
        assert!(mask.is_allowed(3));
    }

    #[test]
    fn allows_eos_only_when_accepting() {
        let grammar = string(b"ok");
        let vocab = vec![VocabEntry { token_id: 1, bytes: b"ok".to_vec() }];
        let trie = VocabTrie::build(&vocab, 7);
        let mask = compute(&trie, &grammar, 10).unwrap();
        assert!(!mask.is_allowed(7));

        let Step::Ok(after_o) = derivative(&grammar, b'o').unwrap() else { panic!() };
        let Step::Ok(done) = derivative(&after_o, b'k').unwrap() else { panic!() };
        let mask = compute(&trie, &done, 10).unwrap();
        assert!(mask.is_allowed(7));
    }
}
