//! Site Inspector - single-page SEO and accessibility audit
//!
//! Fetches a page's markup through a chain of relay proxies, extracts its
//! links, images, headings, landmarks, ARIA usage, tables and CSS colors,
//! and scores it against a small set of accessibility rules.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{AnalysisError, PageAnalyzer};
pub use domain::{AuditRecommendations, PageAnalysis, PageUrl};
pub use infrastructure::config::{AppConfig, ConfigManager};
pub use infrastructure::fetch_error::FetchError;
