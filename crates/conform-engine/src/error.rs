//! Everything the engine loop (§4.6, C6) can fail with: a parser-side
//! `ParseError` (§7) or whatever error the oracle implementation raised.

/// Wraps `conform_parser::ParseError` together with the oracle's own error
/// type, since the engine loop is the first place both can occur together.
#[derive(Debug, thiserror::Error)]
pub enum EngineError<O: std::fmt::Display + std::fmt::Debug> {
    #[error(transparent)]
    Parse(#[from] conform_parser::ParseError),
    #[error("oracle error: {0}")]
    Oracle(O),
}
