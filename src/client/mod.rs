mod hf;
pub mod image;
pub mod normalize;
mod types;

pub use hf::{HfClient, MOCK_CONFIDENCE, MOCK_LABEL};
pub use types::*;

use async_trait::async_trait;

/// Anything that can answer an inference query with an [`Envelope`].
///
/// Implementations never fail past this boundary: every failure is reported
/// as an error envelope.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn query(&self, model_id: &str, input: &InferenceInput, pipeline: &PipelineKind)
    -> Envelope;
}
