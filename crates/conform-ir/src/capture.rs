use std::fmt;
use std::sync::Arc;

/// The name under which a `Capture` node records the bytes it matches
/// (§3, "Capture record"). Cheap to clone; shared between the IR node and
/// whatever capture-tracking state a parser builds over it.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct CaptureName(Arc<str>);

impl CaptureName {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CaptureName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CaptureName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for CaptureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for CaptureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
