//! Hex color usage in embedded and inline CSS

use regex::Regex;
use scraper::Selector;
use std::collections::HashMap;

use super::{ExtractionContext, ParsedDocument, StructureExtractor, compile_selector, element_text};
use crate::domain::analysis::{ColorSample, CssAnalysis};
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

const HEX_COLOR_PATTERN: &str = r"#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})";

/// Tallies hex color literals found in `<style>` contents and `style`
/// attributes. Colors are compared case-insensitively and never expanded,
/// so `#FFF` and `#FFFFFF` stay distinct.
pub struct CssColorExtractor {
    style_element: Selector,
    styled: Selector,
    hex_color: Regex,
    max_colors: usize,
}

impl CssColorExtractor {
    pub fn new(max_colors: usize) -> ParsingResult<Self> {
        let hex_color = Regex::new(HEX_COLOR_PATTERN).map_err(|e| ParsingError::InvalidPattern {
            pattern: HEX_COLOR_PATTERN.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            style_element: compile_selector("style")?,
            styled: compile_selector("[style]")?,
            hex_color,
            max_colors,
        })
    }

    /// Style element texts, then inline style attributes, as one corpus.
    /// The two groups are separated by a space so a color split across the
    /// boundary (`#ab` + `c...`) is not read as one literal.
    fn collect_css(&self, document: &ParsedDocument) -> (String, usize) {
        let embedded: Vec<String> = document
            .html()
            .select(&self.style_element)
            .map(|style| element_text(&style))
            .collect();

        let inline: Vec<&str> = document
            .html()
            .select(&self.styled)
            .filter_map(|element| element.value().attr("style"))
            .collect();

        let corpus = format!("{} {}", embedded.join(" "), inline.join(" "));
        (corpus, inline.len())
    }

    /// Count colors in first-seen order, then rank by count
    pub fn tally(&self, css: &str) -> Vec<ColorSample> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut samples: Vec<ColorSample> = Vec::new();

        for found in self.hex_color.find_iter(css) {
            let hex = found.as_str().to_uppercase();
            match positions.get(&hex) {
                Some(&position) => samples[position].occurrence_count += 1,
                None => {
                    positions.insert(hex.clone(), samples.len());
                    samples.push(ColorSample {
                        hex,
                        occurrence_count: 1,
                    });
                }
            }
        }

        // stable: ties keep first-seen order
        samples.sort_by(|a, b| b.occurrence_count.cmp(&a.occurrence_count));
        samples.truncate(self.max_colors);
        samples
    }
}

impl StructureExtractor for CssColorExtractor {
    type Output = CssAnalysis;

    fn extract(&self, document: &ParsedDocument, _context: &ExtractionContext) -> CssAnalysis {
        let (corpus, inline_style_element_count) = self.collect_css(document);

        CssAnalysis {
            detected_colors: self.tally(&corpus),
            inline_style_element_count,
        }
    }
}
