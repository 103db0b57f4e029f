//! Target URL normalization

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Absolute, scheme-qualified URL of the page under analysis.
///
/// Normalization never fails and does not check reachability; a malformed
/// result surfaces later as a fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageUrl(String);

impl PageUrl {
    /// Trim the input and prepend `https://` unless it already starts with
    /// `http://` or `https://`.
    pub fn normalize(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self(trimmed.to_string())
        } else {
            Self(format!("{DEFAULT_SCHEME_PREFIX}{trimmed}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PageUrl> for String {
    fn from(url: PageUrl) -> Self {
        url.0
    }
}

impl AsRef<str> for PageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
