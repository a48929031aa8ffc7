//! Runtime (decode-phase) errors (§7): raised from `advance` and abort the
//! current generation without corrupting the shared, read-only IR. Shaped
//! like `apollo_parser::Error` (message + data + index) rather than
//! `thiserror`-derived enums, since these carry a byte offset and a context
//! window meant for a human staring at a half-finished generation, not a
//! fixed set of structured variants a caller matches on.

use std::fmt;

/// The frontier became empty: no grammar path can consume the next byte
/// (§4.5, "Failure semantics").
#[derive(Clone, PartialEq, Eq)]
pub struct GrammarFailure {
    message: String,
    /// Bytes committed immediately before the failing byte, for context.
    recent_bytes: Vec<u8>,
    offset: usize,
}

impl GrammarFailure {
    pub fn new(message: impl Into<String>, recent_bytes: Vec<u8>, offset: usize) -> Self {
        Self {
            message: message.into(),
            recent_bytes,
            offset,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn recent_bytes(&self) -> &[u8] {
        &self.recent_bytes
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Debug for GrammarFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GrammarFailure at byte {}: {} (context: {:?})",
            self.offset,
            self.message,
            String::from_utf8_lossy(&self.recent_bytes)
        )
    }
}

impl fmt::Display for GrammarFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.offset)
    }
}

impl std::error::Error for GrammarFailure {}

/// The tokenizer's vocabulary cannot cover some byte sequence the grammar
/// requires (§4.5). Not retried: there is no sampling decision that can fix
/// a tokenizer that lacks the right token entirely.
#[derive(Clone, PartialEq, Eq)]
pub struct VocabularyGap {
    /// The byte sequence the grammar needed but no vocabulary token covers.
    required_bytes: Vec<u8>,
    offset: usize,
}

impl VocabularyGap {
    pub fn new(required_bytes: Vec<u8>, offset: usize) -> Self {
        Self { required_bytes, offset }
    }

    pub fn required_bytes(&self) -> &[u8] {
        &self.required_bytes
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Debug for VocabularyGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VocabularyGap at byte {}: no token covers {:?}",
            self.offset,
            String::from_utf8_lossy(&self.required_bytes)
        )
    }
}

impl fmt::Display for VocabularyGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no vocabulary token covers the required bytes at offset {}", self.offset)
    }
}

impl std::error::Error for VocabularyGap {}

/// Everything `advance` can fail with (§7): grammar exhaustion, a
/// vocabulary that can't express a required byte sequence, or an
/// unresolved `DeferredReference` reached at parse time (§4.1).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarFailure),
    #[error(transparent)]
    VocabularyGap(#[from] VocabularyGap),
    #[error("unresolved reference reached during parsing")]
    UnresolvedReference,
}
