//! The engine loop (§4.6, C6): drives a `conform_parser::ParserState`
//! against an `Oracle`, one token (or fast-forward chunk) at a time.

use std::rc::Rc;
use std::time::Instant;

use conform_ir::node::Node;
use conform_parser::EngineResponse;
use conform_parser::ParserState;
use conform_parser::VocabTrie;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::oracle::Oracle;
use crate::tokenizer::Tokenizer;

/// Drives one generation end to end (§4.6's numbered loop): initializes the
/// parser, optionally prepends BOS, and alternates between fast-forwarding
/// grammatically-forced bytes and querying the oracle for a token, until
/// `done()`.
pub struct Engine<O, T> {
    oracle: O,
    tokenizer: T,
    config: EngineConfig,
}

impl<O: Oracle, T: Tokenizer> Engine<O, T> {
    pub fn new(oracle: O, tokenizer: T, config: EngineConfig) -> Self {
        Self { oracle, tokenizer, config }
    }

    /// Runs a generation to completion over `grammar`, seeded with `prompt`
    /// bytes, and returns every response chunk in order (§4.6 step 4:
    /// "emit the response chunk with latency, backtrack count, and
    /// captures").
    pub fn generate(
        &mut self,
        grammar: Node,
        trie: Rc<VocabTrie>,
        vocab_size: usize,
        prompt: &[u8],
        prepend_bos: bool,
    ) -> Result<Vec<EngineResponse>, EngineError<O::Error>> {
        let mut prompt_tokens = self.tokenizer.encode(prompt);
        if prepend_bos {
            if let Some(bos) = self.tokenizer.bos_token_id() {
                prompt_tokens.insert(0, bos);
            }
        }
        prompt_tokens = self.tokenizer.recode(&prompt_tokens);

        let mut parser = ParserState::new(grammar, trie, vocab_size, self.config.default_temperature);

        let mut chunks = Vec::new();
        loop {
            if parser.done() {
                break;
            }

            let start = Instant::now();
            let (gen_data, response) = parser.advance(None)?;

            if let Some(mut response) = response {
                response.latency_ms = start.elapsed().as_secs_f32() * 1_000.0;
                chunks.push(response);
                continue;
            }

            let Some(gen_data) = gen_data else {
                // Neither a response nor a request to sample: the parser is
                // already done (handled above) or has nothing left to do.
                break;
            };

            // §4.6 step 3: ask the oracle for logits, then for a token
            // sampled under the mask and temperature. The engine doesn't
            // use `Oracle::get_next_token`'s fused default here because it
            // also wants the raw logits to compute `token_logprob` itself
            // (§3's supplemented per-step log-probability) rather than
            // asking the oracle for a second number.
            //
            // §4.6 step 3's "accepting-state relaxation" (omit the mask and
            // post-correct once the parser is already accepting) isn't
            // applied here: `mask` is always the exact grammar-consistent
            // set, which is stricter than necessary in that relaxed case
            // but never incorrect. See DESIGN.md.
            let mask_bytes = gen_data.mask.as_bytes();
            let context: Vec<u32> = prompt_tokens.iter().copied().chain(gen_data.token_prefix.iter().copied()).collect();
            let logits = self.oracle.get_logits(&context).map_err(EngineError::Oracle)?;
            let token_id = self
                .oracle
                .sample_with_temperature(&logits, mask_bytes, gen_data.temperature)
                .map_err(EngineError::Oracle)?;
            let log_prob = crate::oracle::token_logprob(&logits, mask_bytes, gen_data.temperature, token_id);

            let start = Instant::now();
            let (_, response) = parser.advance(Some((token_id, log_prob)))?;
            let mut response = response.expect("advance(Some(..)) always returns a response");
            response.latency_ms = start.elapsed().as_secs_f32() * 1_000.0;
            chunks.push(response);
        }

        Ok(chunks)
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_ir::builder::byte;
    use conform_ir::builder::select;
    use conform_parser::VocabEntry;

    struct IdentityTokenizer;

    impl Tokenizer for IdentityTokenizer {
        fn encode(&self, bytes: &[u8]) -> Vec<u32> {
            bytes.iter().map(|&b| b as u32).collect()
        }
        fn decode(&self, token_ids: &[u32]) -> Vec<u8> {
            token_ids.iter().map(|&t| t as u8).collect()
        }
        fn bos_token_id(&self) -> Option<u32> {
            None
        }
        fn eos_token_id(&self) -> u32 {
            256
        }
    }

    /// Always samples the lowest-valued token allowed by the mask: a
    /// deterministic stand-in for a real model, good enough to exercise the
    /// loop's control flow.
    struct FirstAllowedOracle;

    impl Oracle for FirstAllowedOracle {
        type Error = std::convert::Infallible;

        fn get_logits(&mut self, _token_ids: &[u32]) -> Result<Vec<f32>, Self::Error> {
            Ok(vec![0.0; 257])
        }

        fn sample_with_temperature(&mut self, logits: &[f32], mask: &[u8], _temperature: f32) -> Result<u32, Self::Error> {
            let _ = logits;
            Ok(mask.iter().position(|&allowed| allowed != 0).expect("mask must allow something") as u32)
        }
    }

    fn byte_vocab() -> Vec<VocabEntry> {
        (0u32..256).map(|b| VocabEntry { token_id: b, bytes: vec![b as u8] }).collect()
    }

    #[test]
    fn drives_a_forced_literal_to_completion_by_fast_forwarding() {
        let grammar = conform_ir::builder::string(b"ok");
        let trie = Rc::new(VocabTrie::build(&byte_vocab(), 256));
        let mut engine = Engine::new(FirstAllowedOracle, IdentityTokenizer, EngineConfig::default());

        let chunks = engine.generate(grammar, trie, 257, b"", false).unwrap();

        let committed: Vec<u8> = chunks.iter().flat_map(|c| c.new_bytes.iter().copied()).collect();
        assert_eq!(committed, b"ok");
        assert!(chunks.iter().any(|c| !c.is_generated));
    }

    #[test]
    fn samples_from_the_oracle_at_an_ambiguous_choice() {
        let grammar = select([byte(b'a'), byte(b'b')], false);
        let trie = Rc::new(VocabTrie::build(&byte_vocab(), 256));
        let mut engine = Engine::new(FirstAllowedOracle, IdentityTokenizer, EngineConfig::default());

        let chunks = engine.generate(grammar, trie, 257, b"", false).unwrap();

        let committed: Vec<u8> = chunks.iter().flat_map(|c| c.new_bytes.iter().copied()).collect();
        assert_eq!(committed, b"a");
        assert!(chunks.iter().any(|c| c.is_generated));
    }
}
