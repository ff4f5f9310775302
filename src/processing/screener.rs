//! Screening facade: analysis, scoring and ranking of candidate documents

use crate::config::Config;
use crate::error::{Result, ScreenerError};
use crate::input::InputManager;
use crate::processing::category::CategoryPredictor;
use crate::processing::classifier::ClassifierStrategy;
use crate::processing::contact::extract_contact_info;
use crate::processing::embeddings::SimilarityScorer;
use crate::processing::keywords::KeywordStrategy;
use crate::processing::ner::NerStrategy;
use crate::processing::ranking::{
    sort_entries, AnalyzedCandidate, CandidateProfile, Ranking, RankingEngine, RankingEntry, RejectedCandidate,
};
use crate::processing::signals::{extract_education, extract_experience};
use crate::processing::skills::{SkillExtractionCascade, SkillStrategy};
use log::{error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

type FileOutcome = std::result::Result<RankingEntry, String>;

/// Raw candidate input: an identifier and the document text
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub text: String,
}

impl Candidate {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

pub struct Screener {
    cascade: Arc<SkillExtractionCascade>,
    category: Arc<CategoryPredictor>,
    engine: Arc<RankingEngine>,
    input: Arc<InputManager>,
    max_workers: usize,
}

impl Screener {
    pub fn new(cascade: SkillExtractionCascade, scorer: SimilarityScorer, max_workers: usize) -> Self {
        Self {
            cascade: Arc::new(cascade),
            category: Arc::new(CategoryPredictor::disabled()),
            engine: Arc::new(RankingEngine::new(Arc::new(scorer))),
            input: Arc::new(InputManager::new()),
            max_workers: max_workers.max(1),
        }
    }

    /// Wire up strategies and models as configured. Models load on first use.
    pub fn from_config(config: &Config) -> Self {
        let plan = config.strategy_plan();
        let extraction = &config.extraction;

        let ner = match &plan.ner {
            Some(model_dir) => {
                info!("NER strategy enabled: {}", model_dir.display());
                NerStrategy::from_path(model_dir, extraction.ner_char_budget, extraction.ner_max_tokens)
            }
            None => {
                info!("NER strategy disabled");
                NerStrategy::disabled()
            }
        };

        let classifier = match &plan.classifier {
            Some(model_path) => {
                info!("Classifier strategy enabled: {}", model_path.display());
                ClassifierStrategy::from_path(model_path)
            }
            None => {
                info!("Classifier strategy disabled");
                ClassifierStrategy::disabled()
            }
        };

        let keywords = KeywordStrategy::with_custom_skills(extraction.custom_skills.clone());

        let strategies: Vec<Box<dyn SkillStrategy>> =
            vec![Box::new(ner), Box::new(classifier), Box::new(keywords)];

        let category = match &plan.category {
            Some(model_path) => CategoryPredictor::from_path(model_path),
            None => CategoryPredictor::disabled(),
        };

        info!("Embedding model source: {:?}", plan.embedding);
        let scorer = SimilarityScorer::from_model_path(plan.embedding.as_path());

        Self::new(SkillExtractionCascade::new(strategies), scorer, config.ranking.max_workers)
            .with_category_predictor(category)
    }

    pub fn with_category_predictor(mut self, category: CategoryPredictor) -> Self {
        self.category = Arc::new(category);
        self
    }

    pub fn with_input_manager(mut self, input: InputManager) -> Self {
        self.input = Arc::new(input);
        self
    }

    pub fn cascade(&self) -> &SkillExtractionCascade {
        &self.cascade
    }

    pub fn input(&self) -> &InputManager {
        &self.input
    }

    /// Skills, contact details and background signals for one document
    pub fn analyze_candidate(&self, text: &str) -> Result<CandidateProfile> {
        if text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Candidate text is empty".to_string()));
        }
        Ok(analyze(&self.cascade, &self.category, text))
    }

    pub fn score_against_job(&self, candidate_text: &str, job_text: &str) -> Result<f32> {
        if candidate_text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Candidate text is empty".to_string()));
        }
        if job_text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Job description is empty".to_string()));
        }
        Ok(self.engine.scorer().score(candidate_text, job_text))
    }

    /// Analyse and rank in-memory candidates. Empty documents are rejected, not ranked.
    pub fn rank_candidates(&self, candidates: Vec<Candidate>, job_text: &str) -> Result<Ranking> {
        if job_text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Job description is empty".to_string()));
        }

        let mut rejected = Vec::new();
        let mut analyzed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if candidate.text.trim().is_empty() {
                warn!("Candidate '{}' has no text, skipping", candidate.id);
                rejected.push(RejectedCandidate {
                    candidate_id: candidate.id,
                    reason: "document contains no text".to_string(),
                });
                continue;
            }
            let profile = analyze(&self.cascade, &self.category, &candidate.text);
            analyzed.push(AnalyzedCandidate { id: candidate.id, text: candidate.text, profile });
        }

        let entries = self.engine.rank(analyzed, job_text)?;
        Ok(Ranking { entries, rejected })
    }

    pub async fn rank_files(&self, paths: &[PathBuf], job_text: &str) -> Result<Ranking> {
        self.rank_files_with_progress(paths, job_text, |_| {}).await
    }

    /// Read, analyse and score each file on a bounded pool of workers.
    ///
    /// Missing or empty documents are reported in `rejected`; the rest are
    /// sorted once every worker has finished. `on_done` is called with each
    /// candidate id as it completes.
    pub async fn rank_files_with_progress<F>(
        &self,
        paths: &[PathBuf],
        job_text: &str,
        mut on_done: F,
    ) -> Result<Ranking>
    where
        F: FnMut(&str),
    {
        if job_text.trim().is_empty() {
            return Err(ScreenerError::InvalidInput("Job description is empty".to_string()));
        }

        let start_time = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let job_text: Arc<str> = Arc::from(job_text);
        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(paths.len());

        for (index, (path, candidate_id)) in paths.iter().zip(candidate_ids(paths)).enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let input = Arc::clone(&self.input);
            let cascade = Arc::clone(&self.cascade);
            let category = Arc::clone(&self.category);
            let engine = Arc::clone(&self.engine);
            let job_text = Arc::clone(&job_text);
            let path = path.clone();
            let id = candidate_id.clone();

            let handle = tasks.spawn(async move {
                match semaphore.acquire_owned().await {
                    Ok(_permit) => screen_file(&path, &id, input, cascade, category, engine, job_text).await,
                    Err(e) => Err(format!("worker pool closed: {}", e)),
                }
            });
            pending.insert(handle.id(), (index, candidate_id));
        }

        let mut results = join_outcomes(tasks, pending, &mut on_done).await;

        // input order first, so equal scores keep it through the stable sort
        results.sort_by_key(|(index, _, _)| *index);

        let mut ranking = Ranking::default();
        for (_, candidate_id, outcome) in results {
            match outcome {
                Ok(entry) => ranking.entries.push(entry),
                Err(reason) => {
                    warn!("Rejected '{}': {}", candidate_id, reason);
                    ranking.rejected.push(RejectedCandidate { candidate_id, reason });
                }
            }
        }
        sort_entries(&mut ranking.entries);

        info!(
            "Ranked {} candidates ({} rejected) in {:.2?}",
            ranking.entries.len(),
            ranking.rejected.len(),
            start_time.elapsed()
        );
        Ok(ranking)
    }
}

fn analyze(cascade: &SkillExtractionCascade, category: &CategoryPredictor, text: &str) -> CandidateProfile {
    let extraction = cascade.extract_with_diagnostics(text);
    CandidateProfile {
        skills: extraction.skills,
        contact: extract_contact_info(text),
        experience: extract_experience(text),
        education: extract_education(text),
        category: category.predict(text),
        diagnostics: extraction.diagnostics,
    }
}

/// Collect every task's outcome. A task that panicked or was cancelled is
/// reported as a failed outcome for its candidate.
async fn join_outcomes<F>(
    mut tasks: JoinSet<FileOutcome>,
    mut pending: HashMap<Id, (usize, String)>,
    on_done: &mut F,
) -> Vec<(usize, String, FileOutcome)>
where
    F: FnMut(&str),
{
    let mut results = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next_with_id().await {
        let (task_id, outcome) = match joined {
            Ok((task_id, outcome)) => (task_id, outcome),
            Err(e) => {
                error!("Screening task failed: {}", e);
                (e.id(), Err(format!("screening task failed: {}", e)))
            }
        };
        if let Some((index, candidate_id)) = pending.remove(&task_id) {
            on_done(&candidate_id);
            results.push((index, candidate_id, outcome));
        }
    }
    results
}

/// Report ids for a batch: the file name, or the full path when two files
/// in the batch share a name
pub fn candidate_ids(paths: &[PathBuf]) -> Vec<String> {
    let names: Vec<String> = paths.iter().map(|path| candidate_id(path)).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    paths
        .iter()
        .zip(names.iter())
        .map(|(path, name)| {
            if counts.get(name.as_str()).copied().unwrap_or(0) > 1 {
                path.display().to_string()
            } else {
                name.clone()
            }
        })
        .collect()
}

/// File name without directories, used to identify a candidate in reports
pub fn candidate_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

async fn screen_file(
    path: &Path,
    candidate_id: &str,
    input: Arc<InputManager>,
    cascade: Arc<SkillExtractionCascade>,
    category: Arc<CategoryPredictor>,
    engine: Arc<RankingEngine>,
    job_text: Arc<str>,
) -> FileOutcome {
    let text = input.extract_text(path).await.map_err(|e| e.to_string())?;
    if text.trim().is_empty() {
        return Err("document contains no text".to_string());
    }

    let id = candidate_id.to_string();
    // model inference is CPU bound
    tokio::task::spawn_blocking(move || {
        let profile = analyze(&cascade, &category, &text);
        engine.score_candidate(AnalyzedCandidate { id, text, profile }, &job_text)
    })
    .await
    .map_err(|e| format!("analysis worker failed: {}", e))
}
