//! Engine configuration: the one small config layer this crate has. There
//! is no file-watching or environment-variable layer in the teacher, so we
//! don't invent one here either — just a `serde`-deserializable struct a
//! caller can load from wherever it likes.

use serde::Deserialize;

/// Defaults applied when a grammar position doesn't pin its own value
/// (§4.5: `WithTemperature`'s "nearest enclosing" rule falls back to this
/// when no such node is reachable; `TokenLimit` is always explicit in the
/// grammar, but a generation with none at all still needs a backstop).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub default_temperature: f32,
    pub default_max_tokens: Option<u32>,
    /// Whether the compiler layer should treat adjacent object/array
    /// punctuation as allowing incidental whitespace (a `conform-schema`
    /// compile-time knob surfaced here because it's the one the engine's
    /// caller actually sets per-request).
    pub whitespace_flexible: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_temperature: 1.0,
            default_max_tokens: None,
            whitespace_flexible: true,
        }
    }
}
