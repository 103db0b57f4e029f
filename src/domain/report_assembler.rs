//! Merges extractor outputs into the final [`PageAnalysis`]

use crate::domain::accessibility_rules::{self, RuleInput};
use crate::domain::analysis::{
    AccessibilityReport, AnalysisSummary, AriaElementRecord, CssAnalysis, HeadingRecord,
    ImageRecord, LandmarkRecord, LinkRecord, PageAnalysis, TableRecord,
};

/// Everything the structural extractors produced for one document
#[derive(Debug, Clone, Default)]
pub struct ExtractedStructure {
    pub title: String,
    pub meta_description: String,
    pub links: Vec<LinkRecord>,
    pub images: Vec<ImageRecord>,
    pub headings: Vec<HeadingRecord>,
    pub landmarks: Vec<LandmarkRecord>,
    pub aria_elements: Vec<AriaElementRecord>,
    pub tables: Vec<TableRecord>,
    pub css: CssAnalysis,
}

/// Run the rule engine and build the report
pub fn assemble(url: &str, raw_html: String, structure: ExtractedStructure) -> PageAnalysis {
    let errors = accessibility_rules::evaluate(RuleInput {
        headings: &structure.headings,
        landmarks: &structure.landmarks,
        aria_elements: &structure.aria_elements,
    });
    let score = accessibility_rules::score(errors.len());

    let summary = AnalysisSummary {
        link_count: structure.links.len(),
        image_count: structure.images.len(),
        error_count: errors.len(),
        warning_count: structure.images.iter().filter(|image| image.alt.is_empty()).count()
            + structure.links.iter().filter(|link| link.text.is_empty()).count(),
    };

    PageAnalysis {
        url: url.to_string(),
        title: structure.title,
        meta_description: structure.meta_description,
        raw_html,
        links: structure.links,
        images: structure.images,
        accessibility: AccessibilityReport {
            headings: structure.headings,
            aria_elements: structure.aria_elements,
            landmarks: structure.landmarks,
            tables: structure.tables,
            score,
            errors,
        },
        css: structure.css,
        summary,
    }
}
