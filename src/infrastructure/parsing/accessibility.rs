//! Accessibility structure: headings, landmarks, ARIA usage and tables

use scraper::Selector;
use std::collections::{BTreeMap, HashSet};

use super::{ExtractionContext, ParsedDocument, StructureExtractor, compile_selector, element_text, non_empty_attr};
use crate::domain::analysis::{AriaElementRecord, HeadingRecord, LandmarkRecord, LandmarkRole, TableRecord};
use crate::infrastructure::parsing_error::ParsingResult;

pub struct HeadingExtractor {
    heading: Selector,
}

impl HeadingExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            heading: compile_selector("h1, h2, h3, h4, h5, h6")?,
        })
    }
}

impl StructureExtractor for HeadingExtractor {
    type Output = Vec<HeadingRecord>;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> Vec<HeadingRecord> {
        document
            .html()
            .select(&self.heading)
            .filter_map(|heading| {
                let level = heading.value().name().strip_prefix('h')?.parse::<u8>().ok()?;
                Some(HeadingRecord {
                    level,
                    text: element_text(&heading).trim().to_string(),
                })
            })
            .collect()
    }
}

/// Landmarks by role. An element matched by an earlier role's selector is
/// not recorded again under a later role.
pub struct LandmarkExtractor {
    selectors: Vec<(LandmarkRole, Selector)>,
}

impl LandmarkExtractor {
    pub fn new() -> ParsingResult<Self> {
        let selectors = LandmarkRole::EVALUATION_ORDER
            .iter()
            .map(|role| compile_selector(&role.selector()).map(|selector| (*role, selector)))
            .collect::<ParsingResult<Vec<_>>>()?;

        Ok(Self { selectors })
    }
}

impl StructureExtractor for LandmarkExtractor {
    type Output = Vec<LandmarkRecord>;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> Vec<LandmarkRecord> {
        let mut claimed = HashSet::new();
        let mut landmarks = Vec::new();

        for (role, selector) in &self.selectors {
            for element in document.html().select(selector) {
                if !claimed.insert(element.id()) {
                    continue;
                }
                landmarks.push(LandmarkRecord {
                    role: *role,
                    tag: element.value().name().to_lowercase(),
                    label: non_empty_attr(&element, "aria-label"),
                });
            }
        }

        landmarks
    }
}

pub struct AriaExtractor {
    any: Selector,
}

impl AriaExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            any: compile_selector("*")?,
        })
    }
}

impl StructureExtractor for AriaExtractor {
    type Output = Vec<AriaElementRecord>;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> Vec<AriaElementRecord> {
        document
            .html()
            .select(&self.any)
            .filter_map(|element| {
                let attributes: BTreeMap<String, String> = element
                    .value()
                    .attrs()
                    .filter(|(name, _)| AriaElementRecord::is_aria_attribute(name))
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect();

                (!attributes.is_empty()).then(|| AriaElementRecord {
                    tag: element.value().name().to_lowercase(),
                    attributes,
                })
            })
            .collect()
    }
}

pub struct TableExtractor {
    table: Selector,
    caption: Selector,
    header_section: Selector,
    row: Selector,
}

impl TableExtractor {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            table: compile_selector("table")?,
            caption: compile_selector("caption")?,
            header_section: compile_selector("thead")?,
            row: compile_selector("tr")?,
        })
    }
}

impl StructureExtractor for TableExtractor {
    type Output = Vec<TableRecord>;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> Vec<TableRecord> {
        document
            .html()
            .select(&self.table)
            .enumerate()
            .map(|(position, table)| TableRecord {
                index: position + 1,
                role: non_empty_attr(&table, "role"),
                caption: table
                    .select(&self.caption)
                    .next()
                    .map(|caption| element_text(&caption).trim().to_string())
                    .filter(|caption| !caption.is_empty()),
                has_header_section: table.select(&self.header_section).next().is_some(),
                row_count: table.select(&self.row).count(),
            })
            .collect()
    }
}
