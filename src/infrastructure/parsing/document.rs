//! Lenient document parser and page metadata
//!
//! Parsing goes through html5ever via `scraper`, which recovers from
//! unclosed tags, a missing doctype and broken attributes the way a browser
//! does. Whether recovered errors are acceptable is a parser setting.

use scraper::{Html, Selector};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::debug;

use super::{ExtractionContext, StructureExtractor, compile_selector, element_text};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

pub const NO_TITLE: &str = "No Title Found";
pub const NO_META_DESCRIPTION: &str = "No meta description found.";

/// Parsed document tree
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    /// Parse `source`. With `tolerate_malformed` unset, any error the
    /// parser had to recover from rejects the document.
    pub fn parse(source: &str, tolerate_malformed: bool) -> ParsingResult<Self> {
        let html = catch_unwind(AssertUnwindSafe(|| Html::parse_document(source))).map_err(
            |panic| ParsingError::HtmlParsingFailed {
                message: panic_message(panic.as_ref()),
            },
        )?;

        if !html.errors.is_empty() {
            debug!(
                recovered = html.errors.len(),
                first = %html.errors[0],
                "Parser recovered from malformed markup"
            );
            if !tolerate_malformed {
                return Err(ParsingError::MalformedMarkupRejected {
                    error_count: html.errors.len(),
                    first_error: html.errors[0].to_string(),
                });
            }
        }

        Ok(Self { html })
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Errors the parser recovered from
    pub fn recovered_errors(&self) -> usize {
        self.html.errors.len()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "parser panicked".to_string())
}

/// Title and meta description, with placeholders when missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub meta_description: String,
}

pub struct MetadataExtractor {
    title: Selector,
    meta_description: Selector,
}

impl MetadataExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            title: compile_selector("title")?,
            meta_description: compile_selector(r#"meta[name="description"]"#)?,
        })
    }
}

impl StructureExtractor for MetadataExtractor {
    type Output = PageMetadata;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> PageMetadata {
        let title = document
            .html()
            .select(&self.title)
            .next()
            .map(|element| {
                element_text(&element)
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| NO_TITLE.to_string());

        let meta_description = document
            .html()
            .select(&self.meta_description)
            .next()
            .and_then(|element| element.value().attr("content"))
            .filter(|content| !content.is_empty())
            .map_or_else(|| NO_META_DESCRIPTION.to_string(), str::to_string);

        PageMetadata {
            title,
            meta_description,
        }
    }
}
