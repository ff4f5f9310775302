//! BERT named-entity recognition for skills using Candle

use crate::error::{Result, ScreenerError};
use crate::models::ModelProvider;
use crate::processing::skills::{ExtractionOutcome, SkillSet, SkillStrategy};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use tokenizers::{Tokenizer, TruncationParams};

/// A labelled span of the input text
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpan {
    pub word: String,
    pub group: String,
    pub start: usize,
    pub end: usize,
}

impl EntitySpan {
    /// Skill-bearing groups: anything named like "Skill", or the positive class of a binary tagger
    pub fn is_skill(&self) -> bool {
        self.group.to_lowercase().contains("skill") || self.group == "LABEL_1"
    }
}

pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>>;
}

/// Per-token model output before aggregation
#[derive(Debug, Clone)]
pub struct TokenPrediction {
    pub label: String,
    pub start: usize,
    pub end: usize,
    pub special: bool,
}

/// Split "B-SKILL" into ('B', "SKILL"); labels without a prefix are returned whole
fn split_label(label: &str) -> (Option<char>, &str) {
    match label.split_once('-') {
        Some((prefix, group)) if prefix == "B" || prefix == "I" => (prefix.chars().next(), group),
        _ => (None, label),
    }
}

/// Merge consecutive tokens of the same entity group into spans.
///
/// A `B-` tag always opens a new span, `I-` (or an unprefixed label) extends
/// the open span when the group matches, and `O` closes it.
pub fn aggregate_entities(text: &str, tokens: &[TokenPrediction]) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut current: Option<(String, usize, usize)> = None;

    let flush = |current: &mut Option<(String, usize, usize)>, spans: &mut Vec<EntitySpan>| {
        if let Some((group, start, end)) = current.take() {
            if let Some(word) = text.get(start..end) {
                spans.push(EntitySpan {
                    word: word.trim().to_string(),
                    group,
                    start,
                    end,
                });
            }
        }
    };

    for token in tokens {
        if token.special || token.start >= token.end {
            continue;
        }

        let (prefix, group) = split_label(&token.label);
        if group == "O" {
            flush(&mut current, &mut spans);
            continue;
        }

        let extends_open_span = matches!(
            &current,
            Some((open_group, _, _)) if prefix != Some('B') && open_group == group
        );
        if extends_open_span {
            if let Some((_, _, end)) = current.as_mut() {
                *end = token.end;
            }
        } else {
            flush(&mut current, &mut spans);
            current = Some((group.to_string(), token.start, token.end));
        }
    }
    flush(&mut current, &mut spans);

    spans
}

/// First `budget` characters of `text`
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Get the best available device for inference (GPU if compiled in and present, CPU fallback)
pub fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    {
        if let Ok(device) = Device::new_cuda(0) {
            info!("Using CUDA GPU for NER inference");
            return device;
        }
    }

    #[cfg(feature = "metal")]
    {
        if let Ok(device) = Device::new_metal(0) {
            info!("Using Metal GPU for NER inference");
            return device;
        }
    }

    Device::Cpu
}

/// BERT encoder with a token-classification head, loaded from a local directory
pub struct BertEntityRecognizer {
    model: BertModel,
    classifier: Linear,
    tokenizer: Tokenizer,
    id2label: Vec<String>,
    device: Device,
}

impl BertEntityRecognizer {
    /// Load `config.json`, `tokenizer.json` and `model.safetensors` from `model_dir`
    pub fn load(model_dir: &Path, max_tokens: usize) -> Result<Self> {
        let config_path = model_dir.join("config.json");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let weights_path = model_dir.join("model.safetensors");

        for path in [&config_path, &tokenizer_path, &weights_path] {
            if !path.exists() {
                return Err(ScreenerError::ModelUnavailable(format!(
                    "NER model file missing: {}",
                    path.display()
                )));
            }
        }

        let config_content = std::fs::read_to_string(&config_path)?;
        let config_json: serde_json::Value = serde_json::from_str(&config_content)?;
        let bert_config: BertConfig = serde_json::from_value(config_json.clone())?;

        let hidden_size = config_json["hidden_size"]
            .as_u64()
            .ok_or_else(|| ScreenerError::ModelError("config.json lacks hidden_size".to_string()))?
            as usize;
        let id2label = Self::parse_labels(&config_json)?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ScreenerError::ModelError(format!("Failed to load tokenizer: {}", e)))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                ..Default::default()
            }))
            .map_err(|e| ScreenerError::ModelError(format!("Failed to configure truncation: {}", e)))?;

        let device = select_device();
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? };
        let model = BertModel::load(vb.clone(), &bert_config)?;
        let classifier = candle_nn::linear(hidden_size, id2label.len(), vb.pp("classifier"))?;

        info!(
            "Loaded NER model from {} ({} labels)",
            model_dir.display(),
            id2label.len()
        );

        Ok(Self {
            model,
            classifier,
            tokenizer,
            id2label,
            device,
        })
    }

    /// `id2label` as a dense vector indexed by class id
    fn parse_labels(config: &serde_json::Value) -> Result<Vec<String>> {
        let map = config["id2label"]
            .as_object()
            .ok_or_else(|| ScreenerError::ModelError("config.json lacks id2label".to_string()))?;

        let mut labels = vec![String::from("O"); map.len()];
        for (id, label) in map {
            let idx: usize = id
                .parse()
                .map_err(|_| ScreenerError::ModelError(format!("Invalid label id: {}", id)))?;
            let slot = labels
                .get_mut(idx)
                .ok_or_else(|| ScreenerError::ModelError(format!("Label id out of range: {}", idx)))?;
            *slot = label.as_str().unwrap_or("O").to_string();
        }
        Ok(labels)
    }

    fn predict_tokens(&self, text: &str) -> Result<Vec<TokenPrediction>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ScreenerError::strategy_failure("ner", format!("tokenization failed: {}", e)))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let logits = self.classifier.forward(&hidden)?;
        let class_ids = logits.squeeze(0)?.argmax(D::Minus1)?.to_vec1::<u32>()?;

        let predictions = class_ids
            .iter()
            .zip(encoding.get_offsets())
            .zip(encoding.get_special_tokens_mask())
            .map(|((&class_id, &(start, end)), &special)| TokenPrediction {
                label: self
                    .id2label
                    .get(class_id as usize)
                    .cloned()
                    .unwrap_or_else(|| "O".to_string()),
                start,
                end,
                special: special == 1,
            })
            .collect();

        Ok(predictions)
    }
}

impl EntityRecognizer for BertEntityRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<EntitySpan>> {
        let predictions = self.predict_tokens(text)?;
        Ok(aggregate_entities(text, &predictions))
    }
}

pub struct NerStrategy {
    provider: ModelProvider<dyn EntityRecognizer>,
    char_budget: usize,
}

impl NerStrategy {
    pub fn new(provider: ModelProvider<dyn EntityRecognizer>, char_budget: usize) -> Self {
        Self { provider, char_budget }
    }

    /// Lazily load a BERT model from `model_dir` on first use
    pub fn from_path(model_dir: impl AsRef<Path>, char_budget: usize, max_tokens: usize) -> Self {
        let model_dir = model_dir.as_ref().to_path_buf();
        Self::new(
            ModelProvider::lazy("skill-ner", move || {
                let recognizer: Arc<dyn EntityRecognizer> =
                    Arc::new(BertEntityRecognizer::load(&model_dir, max_tokens)?);
                Ok(recognizer)
            }),
            char_budget,
        )
    }

    pub fn disabled() -> Self {
        Self::new(ModelProvider::disabled("skill-ner"), 0)
    }
}

impl SkillStrategy for NerStrategy {
    fn name(&self) -> &'static str {
        "ner"
    }

    fn extract(&self, text: &str) -> ExtractionOutcome {
        let Some(recognizer) = self.provider.get() else {
            return ExtractionOutcome::Unavailable;
        };

        let prefix = truncate_chars(text, self.char_budget);
        match recognizer.recognize(prefix) {
            Ok(entities) => {
                let skills: SkillSet = entities
                    .iter()
                    .filter(|e| e.is_skill())
                    .map(|e| e.word.as_str())
                    .collect();
                debug!("NER found {} entities, {} skills", entities.len(), skills.len());
                ExtractionOutcome::Available(skills)
            }
            Err(e) => ExtractionOutcome::Failed(e.to_string()),
        }
    }
}
