//! The oracle interface (§6): the only boundary between the engine loop and
//! the LLM actually producing logits. Mirrors the spec's three operations
//! exactly (`get_logits`, `sample_with_temperature`, `get_next_token`) so a
//! caller can implement whichever level of control it needs and let the
//! other default to the composite shortcut.

/// A source of next-token logits and a sampler over them. Implementations
/// own whatever's actually running the model; this crate only needs the
/// three calls below.
pub trait Oracle {
    type Error: std::fmt::Display + std::fmt::Debug;

    /// Logits over the full vocabulary for the next token, conditioned on
    /// `token_ids`.
    fn get_logits(&mut self, token_ids: &[u32]) -> Result<Vec<f32>, Self::Error>;

    /// Samples one token id from `logits`, after masking out every token
    /// whose byte in `mask` is `0` and temperature-scaling the rest (§4.6
    /// step 3: "mask out disallowed tokens by adding `-∞` to their logits,
    /// temperature-scale, sample one token").
    fn sample_with_temperature(&mut self, logits: &[f32], mask: &[u8], temperature: f32) -> Result<u32, Self::Error>;

    /// Composite shortcut: `get_logits` followed by `sample_with_temperature`
    /// (§6). Implementations that can fuse the two (e.g. server-side
    /// batching) may override this; the default just chains the other two.
    fn get_next_token(&mut self, token_ids: &[u32], mask: &[u8], temperature: f32) -> Result<u32, Self::Error> {
        let logits = self.get_logits(token_ids)?;
        self.sample_with_temperature(&logits, mask, temperature)
    }
}

/// Masks `logits` in place by adding `-infinity` to every index whose byte
/// in `mask` is `0` (§4.6 step 3). A helper for `Oracle` implementations
/// that want to do their own sampling on top of a masked distribution.
pub fn apply_mask(logits: &mut [f32], mask: &[u8]) {
    for (logit, &allowed) in logits.iter_mut().zip(mask) {
        if allowed == 0 {
            *logit = f32::NEG_INFINITY;
        }
    }
}

/// The log-probability `token_id` would have had under the same
/// masked, temperature-scaled distribution an `Oracle::sample_with_temperature`
/// call samples from (§3's supplemented per-step `token_logprob`). The
/// engine computes this itself from the logits it already has rather than
/// asking the oracle for a second number.
pub fn token_logprob(logits: &[f32], mask: &[u8], temperature: f32, token_id: u32) -> f32 {
    let mut scaled: Vec<f32> = logits.to_vec();
    apply_mask(&mut scaled, mask);
    let temperature = temperature.max(1e-6);
    for logit in &mut scaled {
        *logit /= temperature;
    }
    let max = scaled.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let log_sum_exp = max + scaled.iter().map(|&l| (l - max).exp()).sum::<f32>().ln();
    scaled[token_id as usize] - log_sum_exp
}
