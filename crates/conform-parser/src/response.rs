//! Per-`advance` outputs (§3, "Engine-call response"; §6's bit-exact
//! response record).

use ahash::AHashMap;

/// What the oracle needs to produce the next token: the token-id prefix
/// fed so far, the mask it must sample within, the temperature to sample
/// at, and an optional target log-bias (§3, "`gen_data`"). The log-bias
/// field is carried but never populated by this crate — nothing in the
/// grammar IR or the JSON-Schema compiler produces one yet; it's reserved
/// for a future per-token bias source.
pub struct GenData {
    pub token_prefix: Vec<u32>,
    pub mask: crate::mask::TokenMask,
    pub temperature: f32,
    pub target_log_bias: Option<Vec<f32>>,
}

/// One captured value: either a single span or, for `list_append`
/// captures, every span recorded under that name in order (§3, "Capture
/// record").
pub enum CaptureValue {
    Single(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// The bit-exact per-step response record (§6): bytes newly committed this
/// step, broken down by how they arrived, plus whatever captures closed.
pub struct EngineResponse {
    /// Every byte committed this step, generated or force-forwarded alike.
    pub new_bytes: Vec<u8>,
    /// The subset of `new_bytes` that came from sampling (empty for a pure
    /// fast-forward step).
    pub generated_bytes: Vec<u8>,
    /// The subset of `new_bytes` the grammar forced without consulting the
    /// oracle.
    pub force_forwarded_bytes: Vec<u8>,
    pub new_token_count: u32,
    /// How many previously-committed tokens were rescinded by token
    /// healing to produce this step (§4.5, "Token healing").
    pub backtrack: u32,
    pub capture_groups: AHashMap<String, CaptureValue>,
    pub capture_group_log_probs: AHashMap<String, LogProbValue>,
    /// The sampled token's log-probability for this step (`0.0` for
    /// fast-forwarded or force-forwarded bytes, which were never sampled).
    /// Surfaced so a caller can track per-step likelihood the way the
    /// original `guidance` engine tracks token log-probabilities.
    pub token_logprob: f32,
    pub is_generated: bool,
    pub latency_ms: f32,
}

pub enum LogProbValue {
    Single(f32),
    List(Vec<f32>),
}
