//! Keyword dictionary strategy: the always-available fallback

use crate::processing::skills::{ExtractionOutcome, SkillSet, SkillStrategy};
use aho_corasick::AhoCorasick;
use log::error;

/// Matches a curated vocabulary case-insensitively at word boundaries
pub struct KeywordStrategy {
    matcher: Option<AhoCorasick>,
    vocabulary: Vec<String>,
}

impl KeywordStrategy {
    pub fn new() -> Self {
        Self::with_custom_skills(Vec::new())
    }

    /// Default vocabulary plus `additional_skills`, all canonicalised to lowercase
    pub fn with_custom_skills(additional_skills: Vec<String>) -> Self {
        let mut vocabulary: Vec<String> = Self::default_vocabulary()
            .iter()
            .map(|s| s.to_string())
            .chain(additional_skills.into_iter().map(|s| s.trim().to_lowercase()))
            .filter(|s| !s.is_empty())
            .collect();
        vocabulary.sort();
        vocabulary.dedup();

        // Standard match kind so overlapping terms ("java", "javascript") are all seen
        let matcher = match AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&vocabulary)
        {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                error!("Failed to build keyword matcher: {}", e);
                None
            }
        };

        Self { matcher, vocabulary }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Vocabulary terms present in `text`, in order of first appearance
    pub fn find_skills(&self, text: &str) -> SkillSet {
        let mut found = SkillSet::new();
        let Some(matcher) = &self.matcher else {
            return found;
        };

        for mat in matcher.find_overlapping_iter(text) {
            if is_word_boundary(text, mat.start(), mat.end()) {
                found.insert(&self.vocabulary[mat.pattern().as_usize()]);
            }
        }

        found
    }

    fn default_vocabulary() -> &'static [&'static str] {
        &[
            // Languages
            "python", "java", "c++", "c#", "javascript", "typescript", "rust", "golang",
            "ruby", "php", "swift", "kotlin", "scala", "sql", "html", "css", "bash",
            // Web and backend
            "react", "angular", "vue", "node.js", "django", "flask", "spring", "graphql",
            "rest", "microservices",
            // Infrastructure
            "aws", "azure", "gcp", "docker", "kubernetes", "terraform", "linux", "git",
            "jenkins", "ci/cd",
            // Data
            "postgresql", "mysql", "mongodb", "redis", "kafka", "spark", "hadoop", "excel",
            "tableau",
            // Machine learning
            "machine learning", "deep learning", "nlp", "computer vision", "pytorch",
            "tensorflow", "scikit-learn", "pandas", "numpy",
            // Soft skills
            "communication", "leadership", "teamwork", "project management", "agile", "scrum",
        ]
    }
}

impl Default for KeywordStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillStrategy for KeywordStrategy {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn extract(&self, text: &str) -> ExtractionOutcome {
        ExtractionOutcome::Available(self.find_skills(text))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// True when the match is not glued to a neighbouring word character
fn is_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills_of(text: &str) -> Vec<String> {
        KeywordStrategy::new().find_skills(text).sorted()
    }

    #[test]
    fn test_simple_match() {
        assert_eq!(skills_of("I know Python and Java"), vec!["java", "python"]);
    }

    #[test]
    fn test_word_boundaries() {
        // "java" inside "javascript" and "rest" inside "interest" must not count
        assert_eq!(skills_of("Interested in JavaScript"), vec!["javascript"]);
        assert!(skills_of("pythonic gitlab").is_empty());
    }

    #[test]
    fn test_symbols_and_phrases() {
        let found = skills_of("Shipped C++ and Node.js services; Machine Learning with scikit-learn.");
        assert_eq!(found, vec!["c++", "machine learning", "node.js", "scikit-learn"]);
    }

    #[test]
    fn test_canonical_lowercase() {
        assert_eq!(skills_of("DOCKER, Kubernetes, AWS"), vec!["aws", "docker", "kubernetes"]);
    }

    #[test]
    fn test_custom_skills() {
        let strategy = KeywordStrategy::with_custom_skills(vec![" Snowflake ".to_string()]);
        let found = strategy.find_skills("Migrated the warehouse to snowflake");
        assert!(found.contains("snowflake"));
        assert_eq!(strategy.vocabulary_size(), KeywordStrategy::new().vocabulary_size() + 1);
    }

    #[test]
    fn test_always_available() {
        let outcome = KeywordStrategy::new().extract("nothing relevant here");
        assert_eq!(outcome, ExtractionOutcome::Available(SkillSet::new()));
    }
}
