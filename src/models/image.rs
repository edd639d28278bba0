use super::traits::{Model, Rejection, require_non_empty};
use crate::{
    Result,
    client::{Envelope, InferenceClient, InferenceInput, InputType, PipelineKind},
};
use async_trait::async_trait;
use std::{fmt, io::ErrorKind, path::Path, sync::Arc};
use tracing::{info, warn};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image classification over a local file.
pub struct ImageModel {
    client: Arc<dyn InferenceClient>,
    model_id: String,
    pipeline: PipelineKind,
}

impl ImageModel {
    pub fn new(client: Arc<dyn InferenceClient>, model_id: impl Into<String>) -> Self {
        Self::with_pipeline(client, model_id, PipelineKind::ImageClassification)
    }

    pub fn with_pipeline(
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

    fn not_found(&self, path: &str) -> Envelope {
        let rejection = Rejection::not_found(format!("Image file not found: {path}"));
        Envelope::model_error(&self.model_id, rejection.reason, rejection.message)
    }
}

impl fmt::Debug for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageModel")
            .field("model_id", &self.model_id)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[async_trait]
impl Model for ImageModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn input_type(&self) -> InputType {
        InputType::Image
    }

    fn validate(&self, raw: &str) -> std::result::Result<(), Rejection> {
        require_non_empty(raw, InputType::Image)?;

        let path = Path::new(raw.trim());
        if !has_image_extension(path) {
            warn!("Unsupported image extension: {}", raw);
            return Err(Rejection::invalid(format!(
                "Unsupported image extension: {} (expected one of {})",
                raw.trim(),
                IMAGE_EXTENSIONS.join(", ")
            )));
        }
        Ok(())
    }

    async fn dispatch(&self, raw: &str) -> Result<Envelope> {
        let original = raw.trim();

        match tokio::fs::metadata(original).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(self.not_found(original)),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(self.not_found(original)),
            Err(e) => return Err(e.into()),
        }

        let resolved = tokio::fs::canonicalize(original).await?;
        info!("Processing image with model: {}", self.model_id);

        let envelope = self
            .client
            .query(&self.model_id, &InferenceInput::image(resolved), &self.pipeline)
            .await;

        Ok(envelope.annotate(|s| {
            s.input_type = Some(InputType::Image);
            s.image_path = Some(original.into());
        }))
    }
}
