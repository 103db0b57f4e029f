//! Per-document extraction context

use tracing::warn;
use url::Url;

use crate::infrastructure::parsing_error::ParsingError;

/// Page URL the document was fetched from, parsed once for resolving
/// relative references
#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub page_url: String,

    /// `None` when the page URL itself cannot be parsed
    pub base_url: Option<Url>,
}

impl ExtractionContext {
    pub fn new(page_url: &str) -> Self {
        let base_url = match Url::parse(page_url) {
            Ok(url) => Some(url),
            Err(e) => {
                let error = ParsingError::url_resolution_failed(page_url, page_url, &e.to_string());
                warn!("Page URL is not a valid base, relative sources stay unresolved: {}", error);
                None
            }
        };

        Self {
            page_url: page_url.to_string(),
            base_url,
        }
    }

    /// Resolve a reference against the page URL
    pub fn resolve(&self, reference: &str) -> Result<String, ParsingError> {
        let base = self.base_url.as_ref().ok_or_else(|| {
            ParsingError::url_resolution_failed(reference, &self.page_url, "invalid base URL")
        })?;

        base.join(reference)
            .map(String::from)
            .map_err(|e| ParsingError::url_resolution_failed(reference, &self.page_url, &e.to_string()))
    }
}
