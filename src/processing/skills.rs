//! Hybrid skill extraction
//!
//! Skills come from an ordered list of [`SkillStrategy`] implementations:
//! the BERT entity recognizer, the learned token classifier, and the keyword
//! dictionary. Each returns an [`ExtractionOutcome`]; the cascade unions the
//! available results into one [`SkillSet`], keeping the casing of whichever
//! strategy saw a skill first. Optional strategies that are unavailable or
//! fail contribute nothing, but the cascade records why in its diagnostics.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Skills deduplicated case-insensitively, first-seen casing kept
#[derive(Debug, Clone, Default)]
pub struct SkillSet {
    skills: Vec<String>,
    keys: HashSet<String>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a skill; returns false for blanks and case-insensitive duplicates
    pub fn insert(&mut self, skill: &str) -> bool {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            return false;
        }
        if self.keys.insert(trimmed.to_lowercase()) {
            self.skills.push(trimmed.to_string());
            true
        } else {
            false
        }
    }

    pub fn extend<'a, I: IntoIterator<Item = &'a str>>(&mut self, skills: I) {
        for skill in skills {
            self.insert(skill);
        }
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.keys.contains(&skill.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.skills.iter().map(String::as_str)
    }

    /// Skills sorted case-insensitively, for stable display
    pub fn sorted(&self) -> Vec<String> {
        let mut skills = self.skills.clone();
        skills.sort_by_key(|s| s.to_lowercase());
        skills
    }
}

/// Set semantics: order does not matter, comparison ignores case
impl PartialEq for SkillSet {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys
    }
}

impl Eq for SkillSet {}

impl<'a> FromIterator<&'a str> for SkillSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        set.extend(iter);
        set
    }
}

impl Serialize for SkillSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.skills.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SkillSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let skills = Vec::<String>::deserialize(deserializer)?;
        Ok(skills.iter().map(String::as_str).collect())
    }
}

/// What a single strategy produced for one input
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome {
    Available(SkillSet),
    /// The strategy's model is not loaded (disabled, missing, or failed to load)
    Unavailable,
    /// The model raised during inference on this input
    Failed(String),
}

impl ExtractionOutcome {
    pub fn status(&self) -> StrategyStatus {
        match self {
            ExtractionOutcome::Available(skills) => StrategyStatus::Contributed { count: skills.len() },
            ExtractionOutcome::Unavailable => StrategyStatus::Unavailable,
            ExtractionOutcome::Failed(reason) => StrategyStatus::Failed { reason: reason.clone() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StrategyStatus {
    Contributed { count: usize },
    Unavailable,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDiagnostic {
    pub strategy: String,
    #[serde(flatten)]
    pub status: StrategyStatus,
}

impl StrategyDiagnostic {
    pub fn is_degraded(&self) -> bool {
        !matches!(self.status, StrategyStatus::Contributed { .. })
    }
}

/// One way of finding skills in free text
pub trait SkillStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Never panics or errors: failures are reported in the outcome
    fn extract(&self, text: &str) -> ExtractionOutcome;
}

/// Merged skills plus a per-strategy account of how extraction went
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeResult {
    pub skills: SkillSet,
    pub diagnostics: Vec<StrategyDiagnostic>,
}

impl CascadeResult {
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.iter().any(StrategyDiagnostic::is_degraded)
    }
}

pub struct SkillExtractionCascade {
    strategies: Vec<Box<dyn SkillStrategy>>,
}

impl SkillExtractionCascade {
    /// Strategies run in the given order; earlier ones win casing ties
    pub fn new(strategies: Vec<Box<dyn SkillStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn extract(&self, text: &str) -> SkillSet {
        self.extract_with_diagnostics(text).skills
    }

    pub fn extract_with_diagnostics(&self, text: &str) -> CascadeResult {
        let mut skills = SkillSet::new();
        let mut diagnostics = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            let outcome = strategy.extract(text);
            match &outcome {
                ExtractionOutcome::Available(found) => {
                    debug!("Strategy '{}' found {} skills", strategy.name(), found.len());
                    skills.extend(found.iter());
                }
                ExtractionOutcome::Unavailable => {
                    debug!("Strategy '{}' unavailable, skipping", strategy.name());
                }
                ExtractionOutcome::Failed(reason) => {
                    warn!("Strategy '{}' failed on this input: {}", strategy.name(), reason);
                }
            }
            diagnostics.push(StrategyDiagnostic {
                strategy: strategy.name().to_string(),
                status: outcome.status(),
            });
        }

        CascadeResult { skills, diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::keywords::KeywordStrategy;

    struct FixedStrategy {
        name: &'static str,
        outcome: ExtractionOutcome,
    }

    impl SkillStrategy for FixedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        fn extract(&self, _text: &str) -> ExtractionOutcome {
            self.outcome.clone()
        }
    }

    fn fixed(name: &'static str, skills: &[&str]) -> Box<dyn SkillStrategy> {
        Box::new(FixedStrategy {
            name,
            outcome: ExtractionOutcome::Available(skills.iter().copied().collect()),
        })
    }

    #[test]
    fn test_skill_set_case_insensitive_dedup() {
        let mut set = SkillSet::new();
        assert!(set.insert("Python"));
        assert!(!set.insert("python"));
        assert!(!set.insert("  PYTHON "));
        assert!(!set.insert("   "));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["Python"]);
        assert!(set.contains("pYtHoN"));
    }

    #[test]
    fn test_skill_set_equality_ignores_order_and_case() {
        let a: SkillSet = ["Rust", "Go"].into_iter().collect();
        let b: SkillSet = ["go", "rust"].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_earlier_strategy_wins_casing() {
        let cascade = SkillExtractionCascade::new(vec![
            fixed("ner", &["Python", "TensorFlow"]),
            fixed("classifier", &["python", "Kubernetes"]),
            fixed("keywords", &["tensorflow", "kubernetes", "sql"]),
        ]);

        let skills = cascade.extract("irrelevant");
        assert_eq!(skills.len(), 4);
        assert_eq!(
            skills.iter().collect::<Vec<_>>(),
            vec!["Python", "TensorFlow", "Kubernetes", "sql"]
        );
    }

    #[test]
    fn test_unavailable_and_failed_do_not_abort() {
        let cascade = SkillExtractionCascade::new(vec![
            Box::new(FixedStrategy { name: "ner", outcome: ExtractionOutcome::Unavailable }),
            Box::new(FixedStrategy {
                name: "classifier",
                outcome: ExtractionOutcome::Failed("shape mismatch".to_string()),
            }),
            Box::new(KeywordStrategy::new()),
        ]);

        let result = cascade.extract_with_diagnostics("I know Python and Java");
        let expected: SkillSet = ["python", "java"].into_iter().collect();
        assert_eq!(result.skills, expected);
        assert!(result.is_degraded());
        assert_eq!(result.diagnostics[0].status, StrategyStatus::Unavailable);
        assert_eq!(
            result.diagnostics[1].status,
            StrategyStatus::Failed { reason: "shape mismatch".to_string() }
        );
        assert_eq!(result.diagnostics[2].status, StrategyStatus::Contributed { count: 2 });
    }

    #[test]
    fn test_extract_is_idempotent() {
        let cascade = SkillExtractionCascade::new(vec![Box::new(KeywordStrategy::new())]);
        let text = "Built REST APIs with Python, Docker and Kubernetes on AWS.";
        assert_eq!(cascade.extract(text), cascade.extract(text));
    }

    #[test]
    fn test_diagnostic_serialization_shape() {
        let diagnostic = StrategyDiagnostic {
            strategy: "ner".to_string(),
            status: StrategyStatus::Failed { reason: "oom".to_string() },
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["strategy"], "ner");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "oom");
    }
}
