//! Accessibility rule engine
//!
//! Pure policy over already-extracted structural records. Rules run in a
//! fixed order and every rule runs even if an earlier one fired; messages
//! are never deduplicated or reordered afterwards.

use crate::domain::analysis::{AriaElementRecord, HeadingRecord, LandmarkRecord, LandmarkRole};

/// Score deducted for every violation message
pub const PENALTY_PER_ERROR: usize = 10;

/// Score of a page without violations
pub const MAX_SCORE: u8 = 100;

pub const MULTIPLE_H1: &str = "Multiple H1 tags found.";
pub const FIRST_HEADING_NOT_H1: &str = "Page does not start with an H1.";
pub const NO_MAIN_LANDMARK: &str = "No 'main' landmark detected.";
pub const MULTIPLE_MAIN_LANDMARKS: &str = "Multiple 'main' landmarks detected.";

/// Structural inputs consumed by the rules
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub headings: &'a [HeadingRecord],
    pub landmarks: &'a [LandmarkRecord],
    pub aria_elements: &'a [AriaElementRecord],
}

/// Evaluate all rules and return the violation messages in rule order
pub fn evaluate(input: RuleInput<'_>) -> Vec<String> {
    let mut errors = Vec::new();

    check_single_h1(input.headings, &mut errors);
    check_starts_with_h1(input.headings, &mut errors);
    check_heading_skips(input.headings, &mut errors);
    check_main_landmark(input.landmarks, &mut errors);
    check_empty_aria_labels(input.aria_elements, &mut errors);

    errors
}

/// `max(0, 100 - 10 * error_count)`
pub fn score(error_count: usize) -> u8 {
    let penalty = error_count.saturating_mul(PENALTY_PER_ERROR);
    let remaining = usize::from(MAX_SCORE).saturating_sub(penalty);
    u8::try_from(remaining).unwrap_or(0)
}

fn check_single_h1(headings: &[HeadingRecord], errors: &mut Vec<String>) {
    if headings.iter().filter(|heading| heading.level == 1).count() > 1 {
        errors.push(MULTIPLE_H1.to_string());
    }
}

fn check_starts_with_h1(headings: &[HeadingRecord], errors: &mut Vec<String>) {
    if headings.first().is_some_and(|first| first.level != 1) {
        errors.push(FIRST_HEADING_NOT_H1.to_string());
    }
}

fn check_heading_skips(headings: &[HeadingRecord], errors: &mut Vec<String>) {
    for pair in headings.windows(2) {
        let (previous, current) = (pair[0].level, pair[1].level);
        if current > previous.saturating_add(1) {
            errors.push(format!(
                "Header skip detected: H{previous} followed by H{current}"
            ));
        }
    }
}

// Missing and duplicated main landmarks are mutually exclusive.
fn check_main_landmark(landmarks: &[LandmarkRecord], errors: &mut Vec<String>) {
    let main_count = landmarks
        .iter()
        .filter(|landmark| landmark.role == LandmarkRole::Main)
        .count();

    if main_count == 0 {
        errors.push(NO_MAIN_LANDMARK.to_string());
    }
    if main_count > 1 {
        errors.push(MULTIPLE_MAIN_LANDMARKS.to_string());
    }
}

fn check_empty_aria_labels(aria_elements: &[AriaElementRecord], errors: &mut Vec<String>) {
    let empty = aria_elements
        .iter()
        .filter(|element| element.has_empty_aria_label())
        .count();

    if empty > 0 {
        errors.push(format!(
            "Critical: Found {empty} element(s) with empty 'aria-label' attribute."
        ));
    }
}
