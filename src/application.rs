//! Application layer
//!
//! Use cases that tie the fetch chain, the parser and the audit policy
//! into a single analysis run.

pub mod page_analyzer;

pub use page_analyzer::{AnalysisError, PageAnalyzer};
