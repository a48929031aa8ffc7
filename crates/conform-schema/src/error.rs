use conform_ir::regex::RegexError;
use thiserror::Error;

/// Compile-phase errors raised while turning a schema document into a
/// grammar (§7). Each carries the structured context a caller needs to
/// report the problem, in the style of `apollo-compiler`'s
/// `validation::diagnostics::DiagnosticData`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("schema document is not valid JSON: {0}")]
    Json(String),

    #[error("unresolved $ref: {uri}")]
    UnresolvedRef { uri: String },

    #[error("$ref target not found: {uri}")]
    RefNotFound { uri: String },

    #[error("unsupported keyword: {keyword}")]
    UnsupportedKeyword { keyword: String },

    #[error("unsupported string format: {format}")]
    UnsupportedFormat { format: String },

    #[error("allOf branches conflict: {reason}")]
    AllOfConflict { reason: String },

    #[error("allOf branches duplicate an unmergeable keyword: {keyword}")]
    AllOfUnsupportedDuplicate { keyword: String },

    #[error("array schema is unsatisfiable: {reason}")]
    UnsatisfiableArray { reason: String },

    #[error("object schema is unsatisfiable: {reason}")]
    UnsatisfiableObject { reason: String },

    #[error("array bounds are contradictory: maxItems ({max}) < minItems ({min})")]
    BadArrayBounds { min: u64, max: u64 },

    #[error(transparent)]
    Regex(#[from] RegexError),
}
