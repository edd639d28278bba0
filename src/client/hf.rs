use super::{
    InferenceClient,
    image::encode_for_transport,
    normalize::{normalize, rank},
    types::*,
};
use crate::{
    Error, Result,
    config::Config,
    decorators::{BoundedCache, CacheInfo, RetryPolicy, log_call},
};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, error, warn};

pub const MOCK_LABEL: &str = "MOCK_LABEL";
pub const MOCK_CONFIDENCE: f64 = 0.95;

const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    model_id: String,
    input: InferenceInput,
    pipeline: PipelineKind,
}

/// Client for the hosted inference endpoint `POST {base_url}/{model_id}`.
///
/// Each query runs as `log_call(retry(cache(send)))`: a retried attempt goes
/// through the cache again, and only a successful normalized response is
/// memoized.
pub struct HfClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    mock_mode: bool,
    default_model: Option<String>,
    max_image_dimension: u32,
    retry: RetryPolicy,
    cache: BoundedCache<CacheKey, ResponseData>,
}

impl HfClient {
    pub fn new(config: &Config, api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.client.timeout())
            .build()?;

        let api_key = api_key.filter(|k| !k.trim().is_empty());
        if api_key.is_none() && !config.client.mock_mode {
            warn!("No API key provided. Some models may not work without authentication.");
        }

        Ok(Self {
            http,
            base_url: config.client.base_url.trim_end_matches('/').to_string(),
            api_key,
            mock_mode: config.client.mock_mode,
            default_model: config
                .client
                .default_model
                .clone()
                .filter(|m| !m.is_empty()),
            max_image_dimension: config.client.max_image_dimension,
            retry: config.retry.policy()?,
            cache: BoundedCache::new("query", config.cache.max_entries),
        })
    }

    pub fn is_mock(&self) -> bool {
        self.mock_mode
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn endpoint(&self, model_id: &str) -> String {
        format!("{}/{}", self.base_url, model_id)
    }

    fn mock_response(model_id: &str) -> Envelope {
        let predictions = vec![
            Prediction {
                label: MOCK_LABEL.to_string(),
                score: MOCK_CONFIDENCE,
            },
            Prediction {
                label: "MOCK_LABEL_2".to_string(),
                score: 1.0 - MOCK_CONFIDENCE,
            },
        ];

        match rank(predictions, None) {
            Ok(mut classification) => {
                classification.model = Some(model_id.to_string());
                Envelope::success(ResponseData::Classification(classification))
            }
            Err(e) => Envelope::error(e.to_string()),
        }
    }

    async fn prepare_inputs(&self, input: &InferenceInput, pipeline: &PipelineKind) -> Result<String> {
        let path = match input {
            InferenceInput::Image(path) => path.clone(),
            InferenceInput::Text(path) if pipeline.is_image() => path.into(),
            InferenceInput::Text(text) => return Ok(text.clone()),
        };

        let max_dimension = self.max_image_dimension;
        tokio::task::spawn_blocking(move || encode_for_transport(&path, max_dimension))
            .await
            .map_err(|e| Error::internal(format!("image encoding task failed: {e}")))?
    }

    /// One attempt: encode, POST, normalize.
    async fn send(
        &self,
        model_id: &str,
        input: &InferenceInput,
        pipeline: &PipelineKind,
    ) -> Result<ResponseData> {
        let payload = RequestEnvelope {
            inputs: self.prepare_inputs(input, pipeline).await?,
        };

        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|_| Error::config("API key contains invalid header characters"))?;
            headers.insert(AUTHORIZATION, value);
        }

        let url = self.endpoint(model_id);
        debug!("POST {} ({})", url, pipeline);

        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(Error::HttpStatus {
                status,
                body: error_detail(&body),
            });
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| Error::normalization(format!("response is not JSON: {e}")))?;
        normalize(pipeline, raw)
    }
}

/// The service reports failures as `{"error": ".."}`; fall back to the raw
/// body, shortened.
fn error_detail(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(msg)) = map.get("error") {
            return Some(msg.clone());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
    }
}

fn failure_message(e: &Error) -> String {
    match e {
        Error::Transport(_) | Error::HttpStatus { .. } => format!("API request failed: {e}"),
        Error::Normalization(_) => format!("Failed to format output: {e}"),
        _ => format!("Error processing query: {e}"),
    }
}

#[async_trait]
impl InferenceClient for HfClient {
    async fn query(
        &self,
        model_id: &str,
        input: &InferenceInput,
        pipeline: &PipelineKind,
    ) -> Envelope {
        let model_id = match (model_id.trim(), &self.default_model) {
            ("", Some(default)) => default.clone(),
            ("", None) if self.mock_mode => "mock-model".to_string(),
            ("", None) => {
                return Envelope::error(
                    "Model ID must be provided either during initialization or in the query call",
                );
            }
            (id, _) => id.to_string(),
        };

        if self.mock_mode {
            debug!("Mock mode: answering {} without network access", model_id);
            return Self::mock_response(&model_id);
        }

        let call_name = format!("query({model_id})");
        let key = CacheKey {
            model_id: model_id.clone(),
            input: input.clone(),
            pipeline: pipeline.clone(),
        };

        let outcome = log_call(
            &call_name,
            self.retry.run_if(
                &call_name,
                || {
                    self.cache.get_or_try_insert_with(key.clone(), || {
                        self.send(&model_id, input, pipeline)
                    })
                },
                Error::is_retryable,
            ),
        )
        .await;

        match outcome {
            Ok(data) => Envelope::success(data),
            Err(e) => {
                error!("Query to {} failed: {}", model_id, e);
                Envelope::error(failure_message(&e))
            }
        }
    }
}
