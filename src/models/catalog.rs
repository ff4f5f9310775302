//! Known pretrained models the screener can fetch

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelKind {
    /// Model2Vec static sentence embeddings
    Embedding,
    /// BERT token classification for skill entities
    EntityRecognition,
}

#[derive(Debug, Clone, Serialize)]
pub struct KnownModel {
    pub id: &'static str,
    pub name: &'static str,
    pub repo_id: &'static str,
    pub kind: ModelKind,
    pub size_mb: u64,
    pub description: &'static str,
    pub required_files: &'static [&'static str],
    pub optional_files: &'static [&'static str],
}

const KNOWN_MODELS: &[KnownModel] = &[
    KnownModel {
        id: "potion-base-8M",
        name: "Potion Base 8M",
        repo_id: "minishlab/potion-base-8M",
        kind: ModelKind::Embedding,
        size_mb: 33,
        description: "Model2Vec embeddings with 8M parameters (recommended)",
        required_files: &["model.safetensors", "tokenizer.json", "config.json"],
        optional_files: &["README.md"],
    },
    KnownModel {
        id: "m2v-base",
        name: "Model2Vec Base",
        repo_id: "minishlab/M2V_base_output",
        kind: ModelKind::Embedding,
        size_mb: 90,
        description: "Legacy Model2Vec base embeddings model",
        required_files: &["model.safetensors", "tokenizer.json", "config.json"],
        optional_files: &["README.md"],
    },
    KnownModel {
        id: "resume-ner-bert-v2",
        name: "Resume NER BERT v2",
        repo_id: "yashpwr/resume-ner-bert-v2",
        kind: ModelKind::EntityRecognition,
        size_mb: 420,
        description: "BERT token classifier tagging skills in resumes",
        required_files: &["model.safetensors", "tokenizer.json", "config.json"],
        optional_files: &["README.md"],
    },
];

pub fn known_models() -> &'static [KnownModel] {
    KNOWN_MODELS
}

/// Look a model up by catalog id, repo id, or display name
pub fn find(input: &str) -> Option<&'static KnownModel> {
    let lowered = input.to_lowercase();
    KNOWN_MODELS.iter().find(|m| {
        m.id == input || m.repo_id == input || m.name.to_lowercase() == lowered
    })
}

/// Map a catalog id to its hub repo id; anything else is assumed to already be one
pub fn resolve_repo_id(input: &str) -> String {
    find(input)
        .map(|m| m.repo_id.to_string())
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_any_name() {
        assert_eq!(find("potion-base-8M").map(|m| m.id), Some("potion-base-8M"));
        assert_eq!(find("minishlab/potion-base-8M").map(|m| m.id), Some("potion-base-8M"));
        assert_eq!(find("resume ner bert v2").map(|m| m.id), Some("resume-ner-bert-v2"));
        assert!(find("gpt-17").is_none());
    }

    #[test]
    fn test_resolve_repo_id_passthrough() {
        assert_eq!(resolve_repo_id("m2v-base"), "minishlab/M2V_base_output");
        assert_eq!(resolve_repo_id("someone/custom-model"), "someone/custom-model");
    }
}
