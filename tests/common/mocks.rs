use async_trait::async_trait;
use hf_inference_kit::client::{
    Classification, Envelope, Generation, InferenceClient, InferenceInput, PipelineKind,
    Prediction, ResponseData,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub model_id: String,
    pub input: InferenceInput,
    pub pipeline: PipelineKind,
}

/// Mock inference client for testing
#[derive(Debug, Clone)]
pub struct MockInferenceClient {
    pub calls: Arc<Mutex<Vec<RecordedQuery>>>,
    pub response: Envelope,
}

impl MockInferenceClient {
    pub fn new() -> Self {
        Self::with_response(classification_envelope(&[("POSITIVE", 0.98), ("NEGATIVE", 0.02)]))
    }

    pub fn with_response(response: Envelope) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response,
        }
    }

    pub fn with_error(message: &str) -> Self {
        Self::with_response(Envelope::error(message))
    }

    pub fn get_calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockInferenceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn query(
        &self,
        model_id: &str,
        input: &InferenceInput,
        pipeline: &PipelineKind,
    ) -> Envelope {
        self.calls.lock().unwrap().push(RecordedQuery {
            model_id: model_id.to_string(),
            input: input.clone(),
            pipeline: pipeline.clone(),
        });
        self.response.clone()
    }
}

/// Build a classification envelope from (label, score) pairs, highest first
pub fn classification_envelope(scores: &[(&str, f64)]) -> Envelope {
    let predictions: Vec<Prediction> = scores
        .iter()
        .map(|(label, score)| Prediction {
            label: label.to_string(),
            score: *score,
        })
        .collect();

    Envelope::success(ResponseData::Classification(Classification {
        top_prediction: predictions[0].label.clone(),
        confidence: predictions[0].score,
        predictions,
        all_predictions: Vec::new(),
        model: None,
    }))
}

pub fn generation_envelope(output: &str) -> Envelope {
    Envelope::success(ResponseData::Generation(Generation {
        output: output.to_string(),
    }))
}
