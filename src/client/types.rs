use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

/// Selects how a raw response is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PipelineKind {
    TextClassification,
    ImageClassification,
    TextGeneration,
    Other(String),
}

impl PipelineKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TextClassification => "text-classification",
            Self::ImageClassification => "image-classification",
            Self::TextGeneration => "text-generation",
            Self::Other(label) => label,
        }
    }

    /// Classification-like pipelines produce ranked predictions; everything
    /// else produces a single output string.
    pub fn is_classification(&self) -> bool {
        matches!(self, Self::TextClassification | Self::ImageClassification)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImageClassification)
    }
}

impl FromStr for PipelineKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "text-classification" | "sentiment-analysis" => Self::TextClassification,
            "image-classification" => Self::ImageClassification,
            "text-generation" => Self::TextGeneration,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for PipelineKind {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<PipelineKind> for String {
    fn from(kind: PipelineKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a caller hands to the client: raw text, or a path to an image that
/// is encoded before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InferenceInput {
    Text(String),
    Image(PathBuf),
}

impl InferenceInput {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn image(path: impl Into<PathBuf>) -> Self {
        Self::Image(path.into())
    }
}

/// Body posted to the endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    pub inputs: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Sorted by descending score.
    pub predictions: Vec<Prediction>,
    pub top_prediction: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_predictions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Classification(Classification),
    Generation(Generation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Sentiment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub data: ResponseData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<InputType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<AnalysisKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Category of the failure, e.g. "Invalid input" or an error category name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Uniform result of every processing operation. Serializes as
/// `{"status": "success", "data": {..}}` or
/// `{"status": "error", "message": ".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Envelope {
    Success(Success),
    Error(Failure),
}

impl Envelope {
    pub fn success(data: ResponseData) -> Self {
        Self::Success(Success {
            data,
            input_type: None,
            image_path: None,
            analysis_type: None,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(Failure {
            message: message.into(),
            model: None,
            error: None,
        })
    }

    /// Error envelope attributed to a model, with a failure category.
    pub fn model_error(
        model: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Error(Failure {
            message: message.into(),
            model: Some(model.into()),
            error: Some(category.into()),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&ResponseData> {
        match self {
            Self::Success(s) => Some(&s.data),
            Self::Error(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Error(f) => Some(&f.message),
        }
    }

    /// Applies `f` to the success payload; error envelopes pass through.
    pub fn annotate(mut self, f: impl FnOnce(&mut Success)) -> Self {
        if let Self::Success(ref mut s) = self {
            f(s);
        }
        self
    }

    /// Attributes an error envelope to `model` when it is not yet attributed.
    pub fn attribute_to(mut self, model: &str) -> Self {
        if let Self::Error(ref mut f) = self {
            f.model.get_or_insert_with(|| model.to_string());
        }
        self
    }
}
