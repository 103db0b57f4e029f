//! Hyperlink inventory

use scraper::Selector;

use super::{ExtractionContext, ParsedDocument, StructureExtractor, compile_selector, element_text};
use crate::domain::analysis::{EMPTY_LINK_TEXT, LinkClassification, LinkRecord, SIMULATED_LINK_STATUS};
use crate::infrastructure::parsing_error::ParsingResult;

/// Every `<a>` element in document order, with or without `href`
pub struct LinkExtractor {
    anchor: Selector,
}

impl LinkExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            anchor: compile_selector("a")?,
        })
    }
}

impl StructureExtractor for LinkExtractor {
    type Output = Vec<LinkRecord>;

    fn extract(&self, document: &ParsedDocument, context: &ExtractionContext) -> Vec<LinkRecord> {
        document
            .html()
            .select(&self.anchor)
            .map(|anchor| {
                let href = anchor.value().attr("href").unwrap_or_default().to_string();
                let text = element_text(&anchor).trim().to_string();

                LinkRecord {
                    text: if text.is_empty() { EMPTY_LINK_TEXT.to_string() } else { text },
                    title_attr: anchor.value().attr("title").unwrap_or_default().to_string(),
                    classification: LinkClassification::classify(&href, &context.page_url),
                    href,
                    status: SIMULATED_LINK_STATUS,
                }
            })
            .collect()
    }
}
