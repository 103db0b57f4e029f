//! Page analysis report model
//!
//! Immutable value records produced once per analysis run. The root
//! [`PageAnalysis`] is the only object handed to the presentation layer,
//! so every record serializes with camelCase names and exports a
//! TypeScript binding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

/// Status reported for every discovered link. Links are never requested.
pub const SIMULATED_LINK_STATUS: u16 = 200;

/// Text stored for links whose rendered text is empty after trimming
pub const EMPTY_LINK_TEXT: &str = "(Empty Text)";

/// File name used when an image `src` has no usable last segment
pub const UNKNOWN_FILE_NAME: &str = "unknown";

/// Where a link points relative to the analyzed page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LinkClassification {
    Internal,
    External,
    Anchor,
}

impl LinkClassification {
    /// Classify an `href` against the analyzed page URL.
    ///
    /// Evaluated in order: `#` prefix is an anchor; a `/` prefix or an
    /// `href` containing the page URL is internal; anything else is external.
    pub fn classify(href: &str, page_url: &str) -> Self {
        if href.starts_with('#') {
            Self::Anchor
        } else if href.starts_with('/') || href.contains(page_url) {
            Self::Internal
        } else {
            Self::External
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Anchor => "anchor",
        }
    }
}

impl fmt::Display for LinkClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `<a>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    pub text: String,
    pub title_attr: String,
    pub href: String,
    pub classification: LinkClassification,
    /// Always [`SIMULATED_LINK_STATUS`]
    pub status: u16,
}

/// A single `<img>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// `src` resolved against the page URL unless it already starts with `http`
    pub resolved_src: String,
    pub alt: String,
    pub title_attr: String,
    pub file_name: String,
}

/// An `h1`..`h6` element in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct HeadingRecord {
    pub level: u8,
    pub text: String,
}

/// Landmark roles checked by the audit, in evaluation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkRole {
    Main,
    Banner,
    Contentinfo,
}

impl LandmarkRole {
    /// Roles in the order their selectors claim elements
    pub const EVALUATION_ORDER: [Self; 3] = [Self::Main, Self::Banner, Self::Contentinfo];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Banner => "banner",
            Self::Contentinfo => "contentinfo",
        }
    }

    /// Semantic element carrying this role implicitly
    pub fn implicit_tag(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Banner => "header",
            Self::Contentinfo => "footer",
        }
    }

    /// Selector matching an explicit `role` attribute or the implicit tag
    pub fn selector(&self) -> String {
        format!("[role=\"{}\"], {}", self.as_str(), self.implicit_tag())
    }
}

impl fmt::Display for LandmarkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LandmarkRecord {
    pub role: LandmarkRole,
    pub tag: String,
    pub label: Option<String>,
}

/// Element carrying `role` and/or `aria-*` attributes.
///
/// Only the qualifying attributes are kept; the map is ordered by name so
/// repeated extractions serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AriaElementRecord {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl AriaElementRecord {
    /// True when the attribute name is `role` or starts with `aria-`
    pub fn is_aria_attribute(name: &str) -> bool {
        name == "role" || name.starts_with("aria-")
    }

    /// `aria-label` is present but blank
    pub fn has_empty_aria_label(&self) -> bool {
        self.attributes
            .get("aria-label")
            .is_some_and(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TableRecord {
    /// 1-based position in document order
    pub index: usize,
    pub role: Option<String>,
    pub caption: Option<String>,
    pub has_header_section: bool,
    pub row_count: usize,
}

/// A hex color literal and how often it occurred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ColorSample {
    /// Uppercased `#RRGGBB` or `#RGB`
    pub hex: String,
    pub occurrence_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityReport {
    pub headings: Vec<HeadingRecord>,
    pub aria_elements: Vec<AriaElementRecord>,
    pub landmarks: Vec<LandmarkRecord>,
    pub tables: Vec<TableRecord>,
    /// `max(0, 100 - 10 * errors.len())`
    pub score: u8,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CssAnalysis {
    pub detected_colors: Vec<ColorSample>,
    pub inline_style_element_count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub link_count: usize,
    pub image_count: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Root report returned to collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PageAnalysis {
    pub url: String,
    pub title: String,
    pub meta_description: String,
    pub raw_html: String,
    pub links: Vec<LinkRecord>,
    pub images: Vec<ImageRecord>,
    pub accessibility: AccessibilityReport,
    pub css: CssAnalysis,
    pub summary: AnalysisSummary,
}

impl PageAnalysis {
    /// Images whose `alt` is empty
    pub fn images_missing_alt(&self) -> usize {
        self.images.iter().filter(|image| image.alt.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#top", LinkClassification::Anchor)]
    #[case("#", LinkClassification::Anchor)]
    #[case("/about", LinkClassification::Internal)]
    #[case("https://example.com/contact", LinkClassification::Internal)]
    #[case("https://other.org/", LinkClassification::External)]
    #[case("mailto:hi@example.com", LinkClassification::External)]
    #[case("", LinkClassification::External)]
    fn classifies_links_against_page_url(#[case] href: &str, #[case] expected: LinkClassification) {
        assert_eq!(LinkClassification::classify(href, "https://example.com"), expected);
    }

    #[test]
    fn anchor_wins_over_containing_page_url() {
        let page = "https://example.com";
        assert_eq!(
            LinkClassification::classify("#https://example.com", page),
            LinkClassification::Anchor
        );
    }

    #[test]
    fn landmark_selectors_cover_role_and_tag() {
        assert_eq!(LandmarkRole::Main.selector(), "[role=\"main\"], main");
        assert_eq!(LandmarkRole::Banner.selector(), "[role=\"banner\"], header");
        assert_eq!(
            LandmarkRole::Contentinfo.selector(),
            "[role=\"contentinfo\"], footer"
        );
    }

    #[test]
    fn detects_blank_aria_labels() {
        let mut attributes = BTreeMap::new();
        attributes.insert("aria-label".to_string(), "   ".to_string());
        let record = AriaElementRecord { tag: "button".into(), attributes };
        assert!(record.has_empty_aria_label());

        let unlabeled = AriaElementRecord {
            tag: "div".into(),
            attributes: BTreeMap::from([("role".to_string(), "note".to_string())]),
        };
        assert!(!unlabeled.has_empty_aria_label());
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let link = LinkRecord {
            text: "Home".into(),
            title_attr: String::new(),
            href: "/".into(),
            classification: LinkClassification::Internal,
            status: SIMULATED_LINK_STATUS,
        };
        let json = serde_json::to_value(&link).unwrap();
        assert_eq!(json["titleAttr"], "");
        assert_eq!(json["classification"], "internal");
        assert_eq!(json["status"], 200);
    }
}
