//! The tokenizer interface (§6): turns bytes into token ids and back, and
//! knows the handful of special tokens the engine loop needs to reason
//! about (BOS, EOS, an optional chat template).

/// A tokenizer's encode/decode pair plus the special-token knowledge the
/// engine loop needs (§6).
pub trait Tokenizer {
    fn encode(&self, bytes: &[u8]) -> Vec<u32>;
    fn decode(&self, token_ids: &[u32]) -> Vec<u8>;

    /// Beginning-of-sequence token, if this tokenizer has one.
    fn bos_token_id(&self) -> Option<u32>;
    fn eos_token_id(&self) -> u32;

    /// A chat template string, if the model this tokenizer belongs to has
    /// one configured.
    fn chat_template(&self) -> Option<&str> {
        None
    }

    /// Renormalizes a token sequence after BOS insertion (§6): some
    /// tokenizers merge or re-split tokens at a sequence boundary, so this
    /// is not always the identity function even though the default below
    /// treats it as one.
    fn recode(&self, token_ids: &[u32]) -> Vec<u32> {
        token_ids.to_vec()
    }
}
