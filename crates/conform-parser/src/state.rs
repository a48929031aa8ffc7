//! The parser state machine (§3, "Parser state"; §4.5/§4.6's `advance`).

use std::rc::Rc;

use ahash::AHashMap;
use conform_ir::first_bytes::forced_prefix;
use conform_ir::first_bytes::is_nullable;
use conform_ir::node::Node;
use conform_ir::node::NodeKind;

use crate::capture::CaptureTracker;
use crate::derivative::derivative;
use crate::derivative::Step;
use crate::error::GrammarFailure;
use crate::error::ParseError;
use crate::error::VocabularyGap;
use crate::heal;
use crate::heal::Checkpoint;
use crate::mask;
use crate::response::CaptureValue;
use crate::response::EngineResponse;
use crate::response::GenData;
use crate::response::LogProbValue;
use crate::trie::VocabTrie;

/// A parse in progress over a single grammar and tokenizer vocabulary
/// (§5: a parser owns its own generation; the grammar IR and vocab trie
/// underneath it are shared, read-only, across however many of these run
/// concurrently).
pub struct ParserState {
    residual: Node,
    bytes_committed: Vec<u8>,
    token_ids: Vec<u32>,
    trie: Rc<VocabTrie>,
    vocab_size: usize,
    default_temperature: f32,
    captures: CaptureTracker,
    checkpoints: Vec<Checkpoint>,
    done: bool,
}

impl ParserState {
    pub fn new(grammar: Node, trie: Rc<VocabTrie>, vocab_size: usize, default_temperature: f32) -> Self {
        Self {
            residual: grammar,
            bytes_committed: Vec::new(),
            token_ids: Vec::new(),
            trie,
            vocab_size,
            default_temperature,
            captures: CaptureTracker::new(),
            checkpoints: Vec::new(),
            done: false,
        }
    }

    pub fn is_accepting(&self) -> bool {
        is_nullable(&self.residual)
    }

    pub fn done(&self) -> bool {
        self.done
    }

    pub fn token_ids(&self) -> &[u32] {
        &self.token_ids
    }

    /// One step of the parse (§4.6's engine loop): call with `None` to ask
    /// what should happen next (a fast-forward response, or `gen_data` for
    /// the caller to sample from), and with `Some((token_id, log_prob))`
    /// once the caller has sampled a token in response to `gen_data`.
    pub fn advance(&mut self, sampled: Option<(u32, f32)>) -> Result<(Option<GenData>, Option<EngineResponse>), ParseError> {
        if self.done {
            return Ok((None, None));
        }
        match sampled {
            Some((token_id, log_prob)) => self.accept_token(token_id, log_prob).map(|r| (None, Some(r))),
            None => self.fast_forward_or_request(),
        }
    }

    fn fast_forward_or_request(&mut self) -> Result<(Option<GenData>, Option<EngineResponse>), ParseError> {
        let forced = forced_prefix(&self.residual);

        let mut backtrack = 0u32;
        if let Some(rescind_to) = heal::maybe_heal(&self.trie, &self.checkpoints, &self.bytes_committed, &forced) {
            self.rescind_to(rescind_to);
            backtrack = 1;
        }
        let forced = forced_prefix(&self.residual);

        if forced.is_empty() {
            if backtrack > 0 {
                // The healed-away token is reported on its own, zero-byte
                // response; the caller issues another `advance(None)`
                // afterward to get `gen_data` for what comes next.
                return Ok((None, Some(self.response(Vec::new(), Vec::new(), Vec::new(), 0, backtrack, false))));
            }
            let mask = mask::compute(&self.trie, &self.residual, self.vocab_size).map_err(|_| ParseError::UnresolvedReference)?;
            return Ok((Some(self.gen_data(mask)), None));
        }

        let response = self.commit_bytes(&forced, backtrack)?;
        Ok((None, Some(response)))
    }

    fn gen_data(&self, mask: mask::TokenMask) -> GenData {
        GenData {
            token_prefix: self.token_ids.clone(),
            mask,
            temperature: nearest_temperature(&self.residual).unwrap_or(self.default_temperature),
            target_log_bias: None,
        }
    }

    fn accept_token(&mut self, token_id: u32, log_prob: f32) -> Result<EngineResponse, ParseError> {
        if token_id == self.trie.eos_token_id() {
            if !self.is_accepting() {
                return Err(ParseError::Grammar(GrammarFailure::new(
                    "EOS sampled at a non-accepting position",
                    self.bytes_committed.clone(),
                    self.bytes_committed.len(),
                )));
            }
            self.done = true;
            return Ok(self.response_with_logprob(Vec::new(), Vec::new(), Vec::new(), 0, 0, true, log_prob));
        }

        // §4.6's accepting-state relaxation: when the position the token was
        // sampled at is already accepting, a token that turns out
        // inconsistent with the grammar (missing from the vocab trie, or
        // rejected partway through) is treated as if EOS had been sampled
        // instead of erroring — the engine is allowed to skip masking once
        // the grammar is satisfiable, so a token outside the mask is
        // expected there, not a bug.
        let was_accepting = self.is_accepting();

        let Some(bytes) = self.trie.bytes_of(token_id) else {
            if was_accepting {
                self.done = true;
                return Ok(self.response_with_logprob(Vec::new(), Vec::new(), Vec::new(), 0, 0, true, log_prob));
            }
            return Err(ParseError::VocabularyGap(VocabularyGap::new(Vec::new(), self.bytes_committed.len())));
        };
        let bytes = bytes.to_vec();
        let checkpoint = self.checkpoint();
        let before = self.residual.clone();
        let start_offset = self.bytes_committed.len();

        for &b in &bytes {
            match derivative(&self.residual, b).map_err(|_| ParseError::UnresolvedReference)? {
                Step::Ok(next) => {
                    self.residual = next;
                    self.bytes_committed.push(b);
                }
                Step::Reject => {
                    if was_accepting {
                        self.residual = checkpoint.residual;
                        self.bytes_committed.truncate(start_offset);
                        self.done = true;
                        return Ok(self.response_with_logprob(Vec::new(), Vec::new(), Vec::new(), 0, 0, true, log_prob));
                    }
                    return Err(ParseError::Grammar(GrammarFailure::new(
                        "sampled token is inconsistent with the grammar",
                        self.bytes_committed.clone(),
                        self.bytes_committed.len(),
                    )));
                }
            }
        }
        self.checkpoints.push(checkpoint);
        self.captures.observe(&before, &self.residual, &self.bytes_committed, start_offset, log_prob);
        self.token_ids.push(token_id);

        Ok(self.response_with_logprob(bytes.clone(), bytes, Vec::new(), 1, 0, true, log_prob))
    }

    /// Consumes `forced` bytes (which must already be known-valid, e.g. via
    /// `forced_prefix`) and records them as force-forwarded.
    fn commit_bytes(&mut self, forced: &[u8], backtrack: u32) -> Result<EngineResponse, ParseError> {
        let checkpoint = self.checkpoint();
        let before = self.residual.clone();
        let start_offset = self.bytes_committed.len();

        for &b in forced {
            match derivative(&self.residual, b).map_err(|_| ParseError::UnresolvedReference)? {
                Step::Ok(next) => {
                    self.residual = next;
                    self.bytes_committed.push(b);
                }
                Step::Reject => {
                    return Err(ParseError::Grammar(GrammarFailure::new(
                        "forced byte rejected by its own grammar position",
                        self.bytes_committed.clone(),
                        self.bytes_committed.len(),
                    )));
                }
            }
        }
        self.checkpoints.push(checkpoint);

        let tokens = self.trie.greedy_tokenize(forced);
        let covered: usize = tokens
            .iter()
            .filter_map(|&id| self.trie.bytes_of(id))
            .map(|b| b.len())
            .sum();
        if covered != forced.len() {
            return Err(ParseError::VocabularyGap(VocabularyGap::new(forced.to_vec(), start_offset)));
        }
        self.token_ids.extend(tokens.iter().copied());
        self.captures.observe(&before, &self.residual, &self.bytes_committed, start_offset, 0.0);

        Ok(self.response(forced.to_vec(), Vec::new(), forced.to_vec(), tokens.len() as u32, backtrack, false))
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            residual: self.residual.clone(),
            bytes_len: self.bytes_committed.len(),
            token_ids_len: self.token_ids.len(),
            captures: self.captures.clone(),
        }
    }

    fn rescind_to(&mut self, index: usize) {
        let checkpoint = self.checkpoints.split_off(index).into_iter().next().expect("index in bounds");
        self.residual = checkpoint.residual;
        self.bytes_committed.truncate(checkpoint.bytes_len);
        self.token_ids.truncate(checkpoint.token_ids_len);
        self.captures = checkpoint.captures;
    }

    fn response(
        &mut self,
        new_bytes: Vec<u8>,
        generated_bytes: Vec<u8>,
        force_forwarded_bytes: Vec<u8>,
        new_token_count: u32,
        backtrack: u32,
        is_generated: bool,
    ) -> EngineResponse {
        self.response_with_logprob(new_bytes, generated_bytes, force_forwarded_bytes, new_token_count, backtrack, is_generated, 0.0)
    }

    fn response_with_logprob(
        &mut self,
        new_bytes: Vec<u8>,
        generated_bytes: Vec<u8>,
        force_forwarded_bytes: Vec<u8>,
        new_token_count: u32,
        backtrack: u32,
        is_generated: bool,
        token_logprob: f32,
    ) -> EngineResponse {
        let mut capture_groups = AHashMap::new();
        let mut capture_group_log_probs = AHashMap::new();
        for closed in self.captures.take_closed() {
            let name = closed.name.as_str().to_string();
            if closed.list_append {
                match capture_groups.entry(name.clone()).or_insert_with(|| CaptureValue::List(Vec::new())) {
                    CaptureValue::List(values) => values.push(closed.bytes),
                    CaptureValue::Single(_) => {}
                }
                match capture_group_log_probs.entry(name).or_insert_with(|| LogProbValue::List(Vec::new())) {
                    LogProbValue::List(values) => values.push(closed.log_prob),
                    LogProbValue::Single(_) => {}
                }
            } else {
                capture_groups.insert(name.clone(), CaptureValue::Single(closed.bytes));
                capture_group_log_probs.insert(name, LogProbValue::Single(closed.log_prob));
            }
        }

        EngineResponse {
            new_bytes,
            generated_bytes,
            force_forwarded_bytes,
            new_token_count,
            backtrack,
            capture_groups,
            capture_group_log_probs,
            token_logprob,
            is_generated,
            latency_ms: 0.0,
        }
    }
}

/// Scans for the nearest (shallowest) `WithTemperature` reachable from the
/// current residual. Depth-first, so with more than one live
/// `WithTemperature` region in an ambiguous grammar it reports whichever
/// it encounters first rather than the true shallowest — a documented
/// approximation (DESIGN.md).
fn nearest_temperature(node: &Node) -> Option<f32> {
    match node.kind() {
        NodeKind::WithTemperature(_, t) => Some(t.get()),
        NodeKind::Join(children) | NodeKind::Select(children, _) => children.iter().find_map(nearest_temperature),
        NodeKind::Gen(g) => nearest_temperature(&g.body_regex)
            .or_else(|| g.stop_regex.as_ref().and_then(nearest_temperature))
            .or_else(|| g.suffix.as_ref().and_then(nearest_temperature)),
        NodeKind::Lexeme(spec) => nearest_temperature(&spec.regex),
        NodeKind::Capture(child, _, _) | NodeKind::TokenLimit(child, _) => nearest_temperature(child),
        NodeKind::Deferred(d) => d.value().and_then(nearest_temperature),
        NodeKind::Null | NodeKind::Byte(_) | NodeKind::ByteRange(_, _) => None,
    }
}
