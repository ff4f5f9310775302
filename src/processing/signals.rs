//! Best-effort experience and education signals

use once_cell::sync::Lazy;
use regex::Regex;

static EXPERIENCE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?\+?)\s*(?:years?|yrs?)\s*(?:of)?\s*experience")
        .expect("Invalid experience regex")
});

static DEGREE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:B\.?Sc|M\.?Sc|B\.?A|M\.?A|B\.?Tech|M\.?Tech|Ph\.?D|MBA|Bachelor|Master|Diploma)\b[^\n]*",
    )
    .expect("Invalid degree regex")
});

const MAX_DEGREE_WORDS: usize = 10;

/// Years of experience as written, e.g. `"5+"` from "5+ years of experience"
pub fn extract_experience(text: &str) -> Option<String> {
    EXPERIENCE_REGEX
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Degree mentions in document order, deduplicated
pub fn extract_education(text: &str) -> Vec<String> {
    let mut education: Vec<String> = Vec::new();

    for found in DEGREE_REGEX.find_iter(text) {
        let line = found.as_str().trim();
        // long matches are usually prose, not a degree line
        if line.split_whitespace().count() >= MAX_DEGREE_WORDS {
            continue;
        }
        if !education.iter().any(|e| e == line) {
            education.push(line.to_string());
        }
    }

    education
}
