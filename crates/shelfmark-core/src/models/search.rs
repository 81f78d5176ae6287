use serde::{Deserialize, Serialize};

/// Segment of a highlighted string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub matched: bool,
}

impl Span {
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matched: false,
        }
    }

    #[must_use]
    pub fn matched(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matched: true,
        }
    }
}
