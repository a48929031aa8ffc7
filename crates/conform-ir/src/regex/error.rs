use thiserror::Error;

/// Errors raised while parsing or compiling a regex pattern (§4.2, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegexError {
    #[error("malformed regex at byte {index}: {message}")]
    Syntax { message: String, index: usize },

    #[error("unsupported regex feature: {feature}")]
    UnsupportedFeature { feature: &'static str },
}

impl RegexError {
    pub fn syntax(message: impl Into<String>, index: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            index,
        }
    }

    pub fn unsupported(feature: &'static str) -> Self {
        Self::UnsupportedFeature { feature }
    }
}
