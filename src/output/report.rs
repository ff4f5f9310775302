//! Report structures for a screening run

use crate::processing::ranking::{Ranking, RankingEntry};
use crate::processing::skills::SkillSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 160;

/// Everything a formatter needs to present one screening run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub job: JobSummary,
    pub ranking: Ranking,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub source: String,
    /// First characters of the job text, whitespace collapsed
    pub preview: String,
    /// Skills the cascade found in the job description itself
    pub skills: SkillSet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub screener_version: String,
    pub processing_time_ms: u64,
    pub models_used: ModelsUsed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub embedding_model: String,
    pub strategies: Vec<String>,
}

impl JobSummary {
    pub fn new(source: impl Into<String>, text: &str, skills: SkillSet) -> Self {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut preview: String = collapsed.chars().take(PREVIEW_CHARS).collect();
        if collapsed.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        Self {
            source: source.into(),
            preview,
            skills,
        }
    }
}

impl ScreeningReport {
    pub fn new(job: JobSummary, ranking: Ranking, processing_time_ms: u64, models_used: ModelsUsed) -> Self {
        Self {
            job,
            ranking,
            metadata: ReportMetadata {
                generated_at: Utc::now(),
                screener_version: env!("CARGO_PKG_VERSION").to_string(),
                processing_time_ms,
                models_used,
            },
        }
    }

    /// Candidate skills that also appear in the job description, sorted
    pub fn matched_skills(&self, entry: &RankingEntry) -> Vec<String> {
        let mut matched: Vec<String> = entry
            .skills
            .iter()
            .filter(|skill| self.job.skills.contains(skill))
            .map(str::to_string)
            .collect();
        matched.sort_by_key(|s| s.to_lowercase());
        matched
    }

    /// Keep only the best `n` entries
    pub fn truncate(&mut self, n: usize) {
        self.ranking.entries.truncate(n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ranking::CandidateProfile;

    fn models_used() -> ModelsUsed {
        ModelsUsed {
            embedding_model: "potion-base-8M".to_string(),
            strategies: vec!["keywords".to_string()],
        }
    }

    #[test]
    fn test_job_preview_is_collapsed_and_bounded() {
        let summary = JobSummary::new("job.txt", "Senior   Rust\n\nengineer", SkillSet::new());
        assert_eq!(summary.preview, "Senior Rust engineer");

        let long_text = "word ".repeat(100);
        let summary = JobSummary::new("job.txt", &long_text, SkillSet::new());
        assert!(summary.preview.ends_with("..."));
        assert_eq!(summary.preview.chars().count(), PREVIEW_CHARS + 3);
    }

    #[test]
    fn test_matched_skills() {
        let job_skills: SkillSet = ["rust", "docker", "aws"].into_iter().collect();
        let job = JobSummary::new("job.txt", "Rust, Docker, AWS", job_skills);
        let profile = CandidateProfile {
            skills: ["Docker", "python", "Rust"].into_iter().collect(),
            ..CandidateProfile::default()
        };
        let entry = RankingEntry::new("a.txt", 50.0, profile);
        let report = ScreeningReport::new(job, Ranking::default(), 10, models_used());

        assert_eq!(report.matched_skills(&entry), vec!["Docker", "Rust"]);
    }
}
