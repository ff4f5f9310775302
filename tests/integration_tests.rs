//! Integration tests for the resume screener

use resume_screener::config::Config;
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::InputManager;
use resume_screener::models::ModelProvider;
use resume_screener::processing::classifier::ClassifierStrategy;
use resume_screener::processing::embeddings::{Embedder, SimilarityScorer};
use resume_screener::processing::keywords::KeywordStrategy;
use resume_screener::processing::ner::NerStrategy;
use resume_screener::processing::skills::{SkillExtractionCascade, SkillSet};
use resume_screener::{Candidate, Screener};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Hashed bag-of-words vectors; enough to tell related documents from unrelated ones
struct WordOverlapEmbedder;

impl Embedder for WordOverlapEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; 256];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| w.len() > 2) {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(17u64, |h, b| h.wrapping_mul(31).wrapping_add(b as u64));
            vector[(bucket % 256) as usize] = 1.0;
        }
        Ok(vector)
    }
}

fn fixture(name: &str) -> PathBuf {
    Path::new("tests/fixtures").join(name)
}

fn keyword_only_screener() -> Screener {
    let cascade = SkillExtractionCascade::new(vec![
        Box::new(NerStrategy::disabled()),
        Box::new(ClassifierStrategy::disabled()),
        Box::new(KeywordStrategy::new()),
    ]);
    let scorer = SimilarityScorer::new(ModelProvider::ready(
        "word-overlap",
        Arc::new(WordOverlapEmbedder) as Arc<dyn Embedder>,
    ));
    Screener::new(cascade, scorer, 2)
}

/// Default configuration pointed at an empty models directory
fn offline_config(models_dir: &Path) -> Config {
    let mut config = Config::default();
    config.models.models_dir = models_dir.to_path_buf();
    config
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.txt")).await.unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_markdown() {
    let manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.md")).await.unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
    // markdown syntax is stripped
    assert!(!text.contains("**"));
    assert!(!text.contains("##"));
}

#[tokio::test]
async fn test_text_extraction_from_docx() {
    let manager = InputManager::new();
    let text = manager.extract_text(&fixture("sample_resume.docx")).await.unwrap();

    assert!(text.contains("John Doe"));
    assert!(text.contains("Python, JavaScript, TypeScript, React, Node.js"));
    assert!(text.contains("B.Sc in Computer Science, State University"));
    // paragraphs become lines
    assert!(text.lines().any(|line| line == "SKILLS"));
}

#[tokio::test]
async fn test_docx_and_txt_resumes_analyze_alike() {
    let screener = keyword_only_screener();
    let from_txt = screener.input().extract_text(&fixture("sample_resume.txt")).await.unwrap();
    let from_docx = screener.input().extract_text(&fixture("sample_resume.docx")).await.unwrap();

    let txt_profile = screener.analyze_candidate(&from_txt).unwrap();
    let docx_profile = screener.analyze_candidate(&from_docx).unwrap();
    assert_eq!(docx_profile.skills, txt_profile.skills);
    assert_eq!(docx_profile.contact, txt_profile.contact);
    assert_eq!(docx_profile.experience.as_deref(), Some("6+"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let manager = InputManager::new();
    let path = fixture("sample_resume.txt");

    let text1 = manager.extract_text(&path).await.unwrap();
    assert_eq!(manager.cache_size().await, 1);

    let text2 = manager.extract_text(&path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size().await, 1);
}

#[tokio::test]
async fn test_nonexistent_file() {
    let manager = InputManager::new();
    let result = manager.extract_text(&fixture("nonexistent.txt")).await;
    assert!(matches!(result, Err(ScreenerError::NotFound(_))));
}

#[tokio::test]
async fn test_unknown_extension_read_as_text() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("resume.xyz");
    std::fs::write(&path, "Plain text resume with Rust").unwrap();

    let manager = InputManager::new();
    assert_eq!(manager.extract_text(&path).await.unwrap(), "Plain text resume with Rust");
}

#[test]
fn test_fallback_when_models_are_unavailable() {
    let temp_dir = TempDir::new().unwrap();
    let screener = Screener::from_config(&offline_config(temp_dir.path()));

    let profile = screener.analyze_candidate("I know Python and Java").unwrap();
    let expected: SkillSet = ["python", "java"].into_iter().collect();
    assert_eq!(profile.skills, expected);
    assert!(profile.is_degraded());
    assert_eq!(profile.category, None);

    // the failed loads are remembered, so a second call behaves the same
    let again = screener.analyze_candidate("I know Python and Java").unwrap();
    assert_eq!(again.skills, expected);
}

#[test]
fn test_custom_skills_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = offline_config(temp_dir.path());
    config.extraction.enable_ner = false;
    config.extraction.enable_classifier = false;
    config.extraction.custom_skills = vec!["Snowflake".to_string(), "dbt".to_string()];

    let screener = Screener::from_config(&config);
    let profile = screener.analyze_candidate("Modelled the warehouse in dbt on Snowflake").unwrap();
    assert!(profile.skills.contains("snowflake"));
    assert!(profile.skills.contains("dbt"));
}

#[test]
fn test_category_model_from_models_dir() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("category-model.json"),
        r#"{"vocabulary": {"python": 0, "pandas": 1, "recipes": 2},
            "idf": [1.0, 1.0, 1.0],
            "classes": ["Data Science", "Chef"],
            "class_log_prior": [-0.69, -0.69],
            "feature_log_prob": [[-0.5, -0.5, -5.0], [-5.0, -5.0, -0.2]]}"#,
    )
    .unwrap();

    let screener = Screener::from_config(&offline_config(temp_dir.path()));
    let profile = screener
        .analyze_candidate("Analyst using Python and pandas. https://example.com/portfolio")
        .unwrap();
    assert_eq!(profile.category.as_deref(), Some("Data Science"));

    let cook = screener.analyze_candidate("Seasonal recipes for a bistro").unwrap();
    assert_eq!(cook.category.as_deref(), Some("Chef"));
}

#[tokio::test]
async fn test_analyze_fixture_resume() {
    let screener = keyword_only_screener();
    let text = screener.input().extract_text(&fixture("sample_resume.txt")).await.unwrap();
    let profile = screener.analyze_candidate(&text).unwrap();

    for skill in ["python", "react", "node.js", "docker", "kubernetes", "aws"] {
        assert!(profile.skills.contains(skill), "missing {}", skill);
    }
    // "java" only appears inside "JavaScript"
    assert!(!profile.skills.contains("java"));

    assert_eq!(profile.contact.email.as_deref(), Some("john.doe@example.com"));
    assert_eq!(profile.contact.phone.as_deref(), Some("+1 555-123-4567"));
    assert_eq!(profile.experience.as_deref(), Some("6+"));
    assert!(profile
        .education
        .contains(&"B.Sc in Computer Science, State University".to_string()));
}

#[test]
fn test_contact_extraction_through_facade() {
    let profile = keyword_only_screener()
        .analyze_candidate("Contact me at test@example.com or (123) 456-7890.")
        .unwrap();
    assert_eq!(profile.contact.email.as_deref(), Some("test@example.com"));
    assert_eq!(profile.contact.phone.as_deref(), Some("(123) 456-7890"));
}

#[tokio::test]
async fn test_rank_files_end_to_end() {
    let screener = keyword_only_screener();
    let job_text = screener
        .input()
        .extract_text(&fixture("job_description.txt"))
        .await
        .unwrap();

    let paths = vec![
        fixture("chef_resume.txt"),
        fixture("sample_resume.txt"),
        fixture("missing_resume.pdf"),
        fixture("empty_resume.txt"),
        fixture("sample_resume.md"),
    ];
    let ranking = screener.rank_files(&paths, &job_text).await.unwrap();

    assert_eq!(ranking.entries.len(), 3);
    assert_eq!(ranking.entries[2].candidate_id, "chef_resume.txt");
    assert!(ranking.entries[0].score > ranking.entries[2].score);
    assert!(ranking
        .entries
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));

    let rejected: Vec<&str> = ranking.rejected.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(rejected, vec!["missing_resume.pdf", "empty_resume.txt"]);
}

#[test]
fn test_rank_candidates_in_memory() {
    let screener = keyword_only_screener();
    let job = "Backend engineer: Rust, Docker, Kubernetes, PostgreSQL";
    let candidates = vec![
        Candidate::new("pastry", "Pastry chef with a love of chocolate"),
        Candidate::new("backend", "Backend engineer writing Rust services on Kubernetes with PostgreSQL"),
    ];

    let ranking = screener.rank_candidates(candidates, job).unwrap();
    assert_eq!(ranking.entries[0].candidate_id, "backend");
    assert!(ranking.entries[0].skills.contains("rust"));

    let empty = screener.rank_candidates(Vec::new(), job).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_identical_and_unrelated_scores() {
    let screener = keyword_only_screener();
    let text = "Python developer with machine learning experience";
    assert!(screener.score_against_job(text, text).unwrap() >= 99.0);
    assert!(
        screener
            .score_against_job("Python developer", "Chef cooking food")
            .unwrap()
            < 20.0
    );
}
