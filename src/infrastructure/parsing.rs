//! HTML parsing and structural extraction
//!
//! The document is parsed once with the lenient html5ever-based `scraper`
//! parser, then a set of independent extractors read the tree. Extractors
//! never mutate the tree, so running them twice yields identical records.

pub mod accessibility;
pub mod context;
pub mod css;
pub mod document;
pub mod images;
pub mod links;

pub use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};
pub use accessibility::{AriaExtractor, HeadingExtractor, LandmarkExtractor, TableExtractor};
pub use context::ExtractionContext;
pub use css::CssColorExtractor;
pub use document::{MetadataExtractor, PageMetadata, ParsedDocument};
pub use images::ImageExtractor;
pub use links::LinkExtractor;

use scraper::{ElementRef, Selector};
use tracing::debug;

use crate::domain::report_assembler::ExtractedStructure;
use crate::infrastructure::config::ParsingConfig;

/// A single extraction pass over a parsed document
pub trait StructureExtractor {
    type Output;

    fn extract(&self, document: &ParsedDocument, context: &ExtractionContext) -> Self::Output;
}

/// Compile a CSS selector, keeping the selector text in the error
pub fn compile_selector(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ParsingError::invalid_selector(selector, &e.to_string()))
}

/// Concatenated text content of an element and its descendants
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

/// Attribute value, treating an empty value as absent
pub fn non_empty_attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Parser plus every structural extractor, compiled once and reused
pub struct PageExtractor {
    config: ParsingConfig,
    metadata: MetadataExtractor,
    links: LinkExtractor,
    images: ImageExtractor,
    headings: HeadingExtractor,
    landmarks: LandmarkExtractor,
    aria: AriaExtractor,
    tables: TableExtractor,
    css: CssColorExtractor,
}

impl PageExtractor {
    pub fn new(config: ParsingConfig) -> ParsingResult<Self> {
        Ok(Self {
            metadata: MetadataExtractor::new()?,
            links: LinkExtractor::new()?,
            images: ImageExtractor::new()?,
            headings: HeadingExtractor::new()?,
            landmarks: LandmarkExtractor::new()?,
            aria: AriaExtractor::new()?,
            tables: TableExtractor::new()?,
            css: CssColorExtractor::new(config.max_detected_colors)?,
            config,
        })
    }

    /// Parse markup according to the configured tolerance
    pub fn parse(&self, html: &str) -> ParsingResult<ParsedDocument> {
        ParsedDocument::parse(html, self.config.tolerate_malformed_markup)
    }

    /// Run every extractor over an already parsed document
    pub fn extract(&self, document: &ParsedDocument, page_url: &str) -> ExtractedStructure {
        let context = ExtractionContext::new(page_url);
        let PageMetadata {
            title,
            meta_description,
        } = self.metadata.extract(document, &context);

        let structure = ExtractedStructure {
            title,
            meta_description,
            links: self.links.extract(document, &context),
            images: self.images.extract(document, &context),
            headings: self.headings.extract(document, &context),
            landmarks: self.landmarks.extract(document, &context),
            aria_elements: self.aria.extract(document, &context),
            tables: self.tables.extract(document, &context),
            css: self.css.extract(document, &context),
        };

        debug!(
            links = structure.links.len(),
            images = structure.images.len(),
            headings = structure.headings.len(),
            landmarks = structure.landmarks.len(),
            aria_elements = structure.aria_elements.len(),
            tables = structure.tables.len(),
            colors = structure.css.detected_colors.len(),
            "Extracted page structure"
        );
        structure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_selector_reports_its_text() {
        let error = compile_selector("a[").unwrap_err();
        assert!(matches!(error, ParsingError::InvalidSelector { ref selector, .. } if selector == "a["));
    }

    #[test]
    fn extraction_is_repeatable() {
        let extractor = PageExtractor::new(ParsingConfig::default()).unwrap();
        let document = extractor
            .parse(r#"<main><h1>Hi</h1><a href="/x" aria-label="">x</a><p style="color:#abc">t</p></main>"#)
            .unwrap();

        let first = extractor.extract(&document, "https://example.com");
        let second = extractor.extract(&document, "https://example.com");
        assert_eq!(first.links, second.links);
        assert_eq!(first.headings, second.headings);
        assert_eq!(first.aria_elements, second.aria_elements);
        assert_eq!(first.css, second.css);
    }
}
