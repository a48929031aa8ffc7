//! A trie over the tokenizer's vocabulary (§4.5: "the parser maintains a
//! trie over the tokenizer's vocabulary and walks it in parallel with the
//! frontier"). Built once per tokenizer and shared read-only across parses,
//! the same way the grammar IR is (§5).

use ahash::AHashMap;

/// One vocabulary entry: a token id and its byte decoding.
pub struct VocabEntry {
    pub token_id: u32,
    pub bytes: Vec<u8>,
}

struct TrieNode {
    children: AHashMap<u8, usize>,
    /// Token ids whose byte decoding ends exactly at this node. More than
    /// one token can share a decoding in principle (rare, but the data
    /// model doesn't forbid it), so this is a list rather than an option.
    tokens_ending_here: Vec<u32>,
}

impl TrieNode {
    fn empty() -> Self {
        Self {
            children: AHashMap::new(),
            tokens_ending_here: Vec::new(),
        }
    }
}

/// Index of a node within [`VocabTrie`]'s arena. `0` is always the root.
pub type TrieNodeId = usize;

/// A prefix trie over every token's byte decoding, used to walk token
/// candidates byte-by-byte in lockstep with the grammar frontier (§4.5).
pub struct VocabTrie {
    nodes: Vec<TrieNode>,
    eos_token_id: u32,
    id_to_bytes: AHashMap<u32, Vec<u8>>,
}

impl VocabTrie {
    pub fn build(vocab: &[VocabEntry], eos_token_id: u32) -> Self {
        let mut nodes = vec![TrieNode::empty()];
        let mut id_to_bytes = AHashMap::new();
        for entry in vocab {
            let mut cursor = 0usize;
            for &b in &entry.bytes {
                cursor = match nodes[cursor].children.get(&b) {
                    Some(&next) => next,
                    None => {
                        nodes.push(TrieNode::empty());
                        let next = nodes.len() - 1;
                        nodes[cursor].children.insert(b, next);
                        next
                    }
                };
            }
            nodes[cursor].tokens_ending_here.push(entry.token_id);
            id_to_bytes.insert(entry.token_id, entry.bytes.clone());
        }
        Self { nodes, eos_token_id, id_to_bytes }
    }

    /// The byte decoding of `token_id`, if it's part of this vocabulary.
    pub fn bytes_of(&self, token_id: u32) -> Option<&[u8]> {
        self.id_to_bytes.get(&token_id).map(|v| v.as_slice())
    }

    pub const ROOT: TrieNodeId = 0;

    pub fn eos_token_id(&self) -> u32 {
        self.eos_token_id
    }

    pub fn child(&self, node: TrieNodeId, byte: u8) -> Option<TrieNodeId> {
        self.nodes[node].children.get(&byte).copied()
    }

    pub fn tokens_ending_here(&self, node: TrieNodeId) -> &[u32] {
        &self.nodes[node].tokens_ending_here
    }

    pub fn children(&self, node: TrieNodeId) -> impl Iterator<Item = (u8, TrieNodeId)> + '_ {
        self.nodes[node].children.iter().map(|(&b, &n)| (b, n))
    }

    /// The first vocabulary token whose byte decoding is exactly `bytes`,
    /// if any (§4.5, "Token healing" — used to check whether a longer
    /// combined span has its own single-token spelling).
    pub fn token_for(&self, bytes: &[u8]) -> Option<u32> {
        let mut cursor = Self::ROOT;
        for &b in bytes {
            cursor = self.child(cursor, b)?;
        }
        self.tokens_ending_here(cursor).first().copied()
    }

    /// Greedily tokenizes `bytes` into the longest vocabulary tokens that
    /// cover it, left to right. Used to assign a canonical tokenization to
    /// force-forwarded bytes, which never go through the oracle (§4.5,
    /// "fast-forward").
    pub fn greedy_tokenize(&self, bytes: &[u8]) -> Vec<u32> {
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let mut cursor = Self::ROOT;
            let mut best: Option<(u32, usize)> = None;
            let mut i = pos;
            while i < bytes.len() {
                match self.child(cursor, bytes[i]) {
                    Some(next) => {
                        cursor = next;
                        i += 1;
                        if let Some(&tok) = self.tokens_ending_here(cursor).first() {
                            best = Some((tok, i));
                        }
                    }
                    None => break,
                }
            }
            match best {
                Some((tok, end)) => {
                    out.push(tok);
                    pos = end;
                }
                None => {
                    // No vocabulary token covers the byte at `pos` at all;
                    // the caller surfaces this as a `VocabularyGap`.
                    break;
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<VocabEntry> {
        vec![
            VocabEntry { token_id: 1, bytes: b"foo".to_vec() },
            VocabEntry { token_id: 2, bytes: b"foobar".to_vec() },
            VocabEntry { token_id: 3, bytes: b"baz".to_vec() },
        ]
    }

    #[test]
    fn walks_shared_prefixes() {
        let trie = VocabTrie::build(&vocab(), 0);
        let mut cursor = VocabTrie::ROOT;
        for b in b"foo" {
            cursor = trie.child(cursor, *b).expect("prefix present");
        }
        assert_eq!(trie.tokens_ending_here(cursor), &[1]);
        for b in b"bar" {
            cursor = trie.child(cursor, *b).expect("prefix present");
        }
        assert_eq!(trie.tokens_ending_here(cursor), &[2]);
    }

    #[test]
    fn disjoint_prefix_not_found() {
        let trie = VocabTrie::build(&vocab(), 0);
        assert!(trie.child(VocabTrie::ROOT, b'q').is_none());
    }
}
