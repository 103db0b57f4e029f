//! Audit recommendations produced by an optional text-generation service

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::domain::analysis::PageAnalysis;

pub const FALLBACK_SUMMARY: &str = "Could not generate AI summary at this time.";
pub const FALLBACK_SEO_PRIORITIES: [&str; 3] =
    ["Review keyword density", "Check meta tags", "Optimize images"];
pub const FALLBACK_ACCESSIBILITY_PRIORITIES: [&str; 3] =
    ["Fix header hierarchy", "Add missing alt text", "Review ARIA roles"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecommendations {
    pub summary: String,
    pub seo_priorities: Vec<String>,
    pub accessibility_priorities: Vec<String>,
}

impl AuditRecommendations {
    /// Fixed object substituted whenever the service fails
    pub fn fallback() -> Self {
        Self {
            summary: FALLBACK_SUMMARY.to_string(),
            seo_priorities: FALLBACK_SEO_PRIORITIES.iter().map(ToString::to_string).collect(),
            accessibility_priorities: FALLBACK_ACCESSIBILITY_PRIORITIES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Build the service prompt from the report's summary statistics
pub fn build_prompt(analysis: &PageAnalysis) -> String {
    let headings = analysis
        .accessibility
        .headings
        .iter()
        .map(|heading| format!("H{}: {}", heading.level, heading.text))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze the following technical metadata for a webpage at {url}.\n\
         Provide a professional SEO and Accessibility audit.\n\
         \n\
         Context:\n\
         - Title: {title}\n\
         - Description: {description}\n\
         - Total Links: {links}\n\
         - Total Images: {images} (Missing alt text: {missing_alt})\n\
         - Headers: {headings}\n\
         - Accessibility Errors: {errors}\n\
         - Table count: {tables}\n\
         \n\
         Please provide:\n\
         1. A short summary of the site's quality.\n\
         2. Top 3 SEO priorities.\n\
         3. Top 3 Accessibility priorities.\n\
         \n\
         Respond with a JSON object with the keys \"summary\" (string), \
         \"seoPriorities\" (array of strings) and \"accessibilityPriorities\" (array of strings).",
        url = analysis.url,
        title = analysis.title,
        description = analysis.meta_description,
        links = analysis.summary.link_count,
        images = analysis.summary.image_count,
        missing_alt = analysis.images_missing_alt(),
        headings = headings,
        errors = analysis.accessibility.errors.join("; "),
        tables = analysis.accessibility.tables.len(),
    )
}
