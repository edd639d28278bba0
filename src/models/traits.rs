use crate::{
    Result,
    client::{Envelope, InputType},
};
use async_trait::async_trait;
use tracing::error;

/// Why an input was refused before reaching the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: &'static str,
    pub message: String,
}

impl Rejection {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            reason: "Invalid input",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            reason: "File not found",
            message: message.into(),
        }
    }
}

/// Shared validation: blank input never reaches the client.
pub fn require_non_empty(raw: &str, input_type: InputType) -> std::result::Result<(), Rejection> {
    if !raw.trim().is_empty() {
        return Ok(());
    }
    Err(Rejection::invalid(match input_type {
        InputType::Text => "Input text cannot be empty",
        InputType::Image => "Image path cannot be empty",
    }))
}

/// A model wrapper: validates raw input, forwards it to an inference client
/// and annotates the resulting envelope.
///
/// Callers use [`Model::process_input`], which never fails: rejections and
/// errors come back as error envelopes tagged with the model id.
#[async_trait]
pub trait Model: Send + Sync {
    fn model_id(&self) -> &str;

    fn input_type(&self) -> InputType;

    fn validate(&self, raw: &str) -> std::result::Result<(), Rejection> {
        require_non_empty(raw, self.input_type())
    }

    /// Sends already validated input to the client.
    async fn dispatch(&self, raw: &str) -> Result<Envelope>;

    async fn process_input(&self, raw: &str) -> Envelope {
        if let Err(rejection) = self.validate(raw) {
            return Envelope::model_error(self.model_id(), rejection.reason, rejection.message);
        }

        match self.dispatch(raw).await {
            Ok(envelope) => envelope.attribute_to(self.model_id()),
            Err(e) => {
                error!("Error processing input for {}: {}", self.model_id(), e);
                Envelope::model_error(self.model_id(), e.category(), e.to_string())
            }
        }
    }
}
