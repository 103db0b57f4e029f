//! Domain module - report model and pure audit policy
//!
//! Value types produced by an analysis run, URL normalization, the
//! accessibility rule engine, report assembly and the recommendation
//! contract. Nothing in here performs I/O.

pub mod accessibility_rules;
pub mod analysis;
pub mod page_url;
pub mod recommendations;
pub mod report_assembler;

pub use analysis::{
    AccessibilityReport, AnalysisSummary, AriaElementRecord, ColorSample, CssAnalysis,
    HeadingRecord, ImageRecord, LandmarkRecord, LandmarkRole, LinkClassification, LinkRecord,
    PageAnalysis, TableRecord,
};
pub use page_url::PageUrl;
pub use recommendations::AuditRecommendations;
pub use report_assembler::ExtractedStructure;
