use super::traits::Model;
use crate::{
    Result,
    client::{AnalysisKind, Envelope, InferenceClient, InferenceInput, InputType, PipelineKind},
};
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use tracing::info;

/// Text generation or classification: the raw string goes straight to the
/// client.
pub struct TextModel {
    client: Arc<dyn InferenceClient>,
    model_id: String,
    pipeline: PipelineKind,
}

impl TextModel {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        model_id: impl Into<String>,
        pipeline: PipelineKind,
    ) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            pipeline,
        }
    }
}

impl fmt::Debug for TextModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextModel")
            .field("model_id", &self.model_id)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[async_trait]
impl Model for TextModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn input_type(&self) -> InputType {
        InputType::Text
    }

    async fn dispatch(&self, raw: &str) -> Result<Envelope> {
        info!("Processing text with model: {}", self.model_id);
        Ok(self
            .client
            .query(&self.model_id, &InferenceInput::text(raw), &self.pipeline)
            .await)
    }
}

/// A text classifier whose successful envelopes are tagged as sentiment
/// analysis.
#[derive(Debug)]
pub struct SentimentModel {
    inner: TextModel,
}

impl SentimentModel {
    pub fn new(client: Arc<dyn InferenceClient>, model_id: impl Into<String>) -> Self {
        Self {
            inner: TextModel::new(client, model_id, PipelineKind::TextClassification),
        }
    }
}

#[async_trait]
impl Model for SentimentModel {
    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    fn input_type(&self) -> InputType {
        InputType::Text
    }

    async fn dispatch(&self, raw: &str) -> Result<Envelope> {
        info!("Analyzing sentiment with model: {}", self.model_id());
        let envelope = self.inner.dispatch(raw).await?;
        Ok(envelope.annotate(|s| s.analysis_type = Some(AnalysisKind::Sentiment)))
    }
}
