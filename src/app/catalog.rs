use crate::client::{InputType, PipelineKind};
use serde::{Deserialize, Serialize};

/// One selectable model, as listed to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub input_type: InputType,
    pub pipeline: PipelineKind,
    #[serde(default)]
    pub example: String,
}

/// Which wrapper serves an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Sentiment,
    Text,
    Image,
}

impl ModelEntry {
    pub fn kind(&self) -> ModelKind {
        match (self.input_type, &self.pipeline) {
            (InputType::Image, _) => ModelKind::Image,
            (InputType::Text, PipelineKind::TextClassification) => ModelKind::Sentiment,
            (InputType::Text, _) => ModelKind::Text,
        }
    }
}

pub fn builtin_models() -> Vec<ModelEntry> {
    vec![
        ModelEntry {
            name: "Sentiment Analysis".to_string(),
            id: "distilbert-base-uncased-finetuned-sst-2-english".to_string(),
            category: "Text Classification".to_string(),
            description: "A lightweight BERT model fine-tuned for sentiment analysis. \
                It classifies text as positive or negative sentiment."
                .to_string(),
            input_type: InputType::Text,
            pipeline: PipelineKind::TextClassification,
            example: "I love this new feature, it's amazing!".to_string(),
        },
        ModelEntry {
            name: "Image Recognition".to_string(),
            id: "microsoft/resnet-50".to_string(),
            category: "Image Classification".to_string(),
            description: "A ResNet model that classifies images into 1000 different \
                categories."
                .to_string(),
            input_type: InputType::Image,
            pipeline: PipelineKind::ImageClassification,
            example: "path/to/image.jpg".to_string(),
        },
        ModelEntry {
            name: "Text Generation".to_string(),
            id: "gpt2".to_string(),
            category: "Text Generation".to_string(),
            description: "OpenAI's GPT-2 small model. It continues text from a given prompt."
                .to_string(),
            input_type: InputType::Text,
            pipeline: PipelineKind::TextGeneration,
            example: "Once upon a time in a digital world,".to_string(),
        },
    ]
}

#[derive(Debug, Clone)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn new(entries: Vec<ModelEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Looks an entry up by display name (case-insensitive) or model id.
    pub fn find(&self, name: &str) -> Option<&ModelEntry> {
        self.position(name).map(|i| &self.entries[i])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(name) || e.id == name)
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(builtin_models())
    }
}
