//! Token healing (§4.5, "Token healing"; §8's `"foo"`/`"foobar"` scenario).
//!
//! A token accepted one step can turn out, once more bytes are forced,
//! to be a strict prefix of a single longer vocabulary token spanning the
//! same position. Healing rescinds that last token and lets the normal
//! fast-forward/mask path rediscover the longer one.
//!
//! This crate checks healing only one token back (the most recently
//! committed one), not transitively further — rescinding two or more
//! trailing tokens at once is a real possibility for some tokenizers but
//! isn't implemented here; see DESIGN.md.

use crate::capture::CaptureTracker;
use crate::trie::VocabTrie;
use conform_ir::node::Node;

/// A token-boundary checkpoint, pushed immediately before a token is
/// committed, so a single token can be rescinded in O(1) by restoring it.
#[derive(Clone)]
pub struct Checkpoint {
    pub residual: Node,
    pub bytes_len: usize,
    pub token_ids_len: usize,
    pub captures: CaptureTracker,
}

/// If the bytes of the last committed token, combined with `forced` (the
/// bytes about to be force-forwarded from the current residual), spell a
/// single longer vocabulary token, pops `checkpoints` to rescind the last
/// token and reports the bytes that must be re-walked. Returns `None` when
/// no healing is needed.
pub fn maybe_heal(
    trie: &VocabTrie,
    checkpoints: &[Checkpoint],
    bytes_committed: &[u8],
    forced: &[u8],
) -> Option<usize> {
    let last = checkpoints.last()?;
    let last_token_bytes = &bytes_committed[last.bytes_len..];
    if last_token_bytes.is_empty() || forced.is_empty() {
        return None;
    }
    let combined: Vec<u8> = last_token_bytes.iter().chain(forced).copied().collect();
    let healed_token = trie.token_for(&combined)?;
    let last_token = trie.token_for(last_token_bytes);
    if Some(healed_token) == last_token {
        return None;
    }
    Some(checkpoints.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::VocabEntry;
    use conform_ir::builder::null;

    #[test]
    fn detects_when_a_longer_token_spans_the_boundary() {
        let vocab = vec![
            VocabEntry { token_id: 1, bytes: b"foo".to_vec() },
            VocabEntry { token_id: 2, bytes: b"foobar".to_vec() },
        ];
        let trie = VocabTrie::build(&vocab, 0);
        let checkpoints = vec![Checkpoint {
            residual: null(),
            bytes_len: 0,
            token_ids_len: 0,
            captures: CaptureTracker::new(),
        }];
        let healed = maybe_heal(&trie, &checkpoints, b"foo", b"bar");
        assert_eq!(healed, Some(0));
    }

    #[test]
    fn no_heal_when_nothing_longer_exists() {
        let vocab = vec![VocabEntry { token_id: 1, bytes: b"foo".to_vec() }];
        let trie = VocabTrie::build(&vocab, 0);
        let checkpoints = vec![Checkpoint {
            residual: null(),
            bytes_len: 0,
            token_ids_len: 0,
            captures: CaptureTracker::new(),
        }];
        assert_eq!(maybe_heal(&trie, &checkpoints, b"foo", b"bar"), None);
    }
}
