//! Parsing error types for the document parser and extractors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    #[error("HTML parsing failed: {message}")]
    HtmlParsingFailed { message: String },

    #[error("Markup rejected: {error_count} parse error(s), first: {first_error}")]
    MalformedMarkupRejected {
        error_count: usize,
        first_error: String,
    },

    #[error("Invalid CSS selector: {selector} - {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Invalid pattern: {pattern} - {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("URL resolution failed: {url} - {reason}")]
    UrlResolutionFailed {
        url: String,
        reason: String,
        base_url: Option<String>,
    },
}

impl ParsingError {
    pub fn invalid_selector(selector: &str, reason: &str) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn url_resolution_failed(url: &str, base_url: &str, reason: &str) -> Self {
        Self::UrlResolutionFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            base_url: Some(base_url.to_string()),
        }
    }

    /// Recovered locally by the extractor rather than failing the analysis
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::UrlResolutionFailed { .. } => true,
            Self::HtmlParsingFailed { .. }
            | Self::MalformedMarkupRejected { .. }
            | Self::InvalidSelector { .. }
            | Self::InvalidPattern { .. } => false,
        }
    }
}

pub type ParsingResult<T> = Result<T, ParsingError>;
