//! Candidate ranking against a single job description

use crate::error::{Result, ScreenerError};
use crate::processing::contact::ContactInfo;
use crate::processing::embeddings::SimilarityScorer;
use crate::processing::skills::{SkillSet, StrategyDiagnostic, StrategyStatus};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structured signals extracted from one candidate document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub skills: SkillSet,
    pub contact: ContactInfo,
    pub experience: Option<String>,
    pub education: Vec<String>,
    /// Predicted resume category, `None` without a category model
    #[serde(default)]
    pub category: Option<String>,
    pub diagnostics: Vec<StrategyDiagnostic>,
}

impl CandidateProfile {
    /// True when an optional extraction strategy did not contribute
    pub fn is_degraded(&self) -> bool {
        self.diagnostics.iter().any(StrategyDiagnostic::is_degraded)
    }
}

/// A candidate whose text has already been analysed
#[derive(Debug, Clone)]
pub struct AnalyzedCandidate {
    pub id: String,
    pub text: String,
    pub profile: CandidateProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub candidate_id: String,
    pub score: f32,
    pub skills: SkillSet,
    pub contact: ContactInfo,
    pub experience: Option<String>,
    pub education: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub degraded: bool,
    pub diagnostics: Vec<StrategyDiagnostic>,
}

impl RankingEntry {
    pub fn new(candidate_id: impl Into<String>, score: f32, profile: CandidateProfile) -> Self {
        let degraded = profile.is_degraded();
        Self {
            candidate_id: candidate_id.into(),
            score,
            skills: profile.skills,
            contact: profile.contact,
            experience: profile.experience,
            education: profile.education,
            category: profile.category,
            degraded,
            diagnostics: profile.diagnostics,
        }
    }
}

/// A candidate left out of the ranking, with the reason
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub candidate_id: String,
    pub reason: String,
}

/// Ordered entries, best match first, plus everything that could not be ranked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub entries: Vec<RankingEntry>,
    pub rejected: Vec<RejectedCandidate>,
}

impl Ranking {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, n: usize) -> &[RankingEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

/// Sort by score descending. The sort is stable, so ties keep input order.
pub fn sort_entries(entries: &mut [RankingEntry]) {
    entries.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Diagnostic name used when the similarity score had to be defaulted
pub const SIMILARITY_DIAGNOSTIC: &str = "similarity";

pub struct RankingEngine {
    scorer: Arc<SimilarityScorer>,
}

impl RankingEngine {
    pub fn new(scorer: Arc<SimilarityScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Score one analysed candidate against the job.
    ///
    /// When no similarity can be computed the score defaults to 0.0 and a
    /// `similarity` diagnostic marks the entry as degraded.
    pub fn score_candidate(&self, candidate: AnalyzedCandidate, job_text: &str) -> RankingEntry {
        let AnalyzedCandidate { id, text, mut profile } = candidate;

        let score = match self.scorer.try_score(&text, job_text) {
            Ok(score) => score,
            Err(e) => {
                warn!("Similarity for '{}' defaulted to 0.0: {}", id, e);
                let status = match e {
                    ScreenerError::ModelUnavailable(_) => StrategyStatus::Unavailable,
                    other => StrategyStatus::Failed { reason: other.to_string() },
                };
                profile.diagnostics.push(StrategyDiagnostic {
                    strategy: SIMILARITY_DIAGNOSTIC.to_string(),
                    status,
                });
                0.0
            }
        };

        debug!("Candidate '{}' scored {:.2}", id, score);
        RankingEntry::new(id, score, profile)
    }

    /// Score every candidate and order the results
    pub fn rank(&self, candidates: Vec<AnalyzedCandidate>, job_text: &str) -> Result<Vec<RankingEntry>> {
        if job_text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Job description is empty".to_string()));
        }

        let mut entries: Vec<RankingEntry> = candidates
            .into_iter()
            .map(|candidate| self.score_candidate(candidate, job_text))
            .collect();

        sort_entries(&mut entries);
        Ok(entries)
    }
}
