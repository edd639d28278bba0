use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{status}{}", body_suffix(.body))]
    HttpStatus {
        status: reqwest::StatusCode,
        body: Option<String>,
    },

    #[error("{0}")]
    Normalization(String),

    #[error("Failed to process image: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("A run is already in progress")]
    Busy,

    #[error("Internal error: {0}")]
    Internal(String),
}

fn body_suffix(body: &Option<String>) -> String {
    body.as_deref().map(|b| format!(": {b}")).unwrap_or_default()
}

impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Config(s) => Self::Config(s.clone()),
            Self::InvalidInput(s) => Self::InvalidInput(s.clone()),
            Self::HttpStatus { status, body } => Self::HttpStatus {
                status: *status,
                body: body.clone(),
            },
            Self::Normalization(s) => Self::Normalization(s.clone()),
            Self::Busy => Self::Busy,
            Self::Internal(s) => Self::Internal(s.clone()),
            // For errors that can't be cloned, convert to string representation
            Self::Transport(e) => Self::Internal(format!("Transport error: {}", e)),
            Self::Image(e) => Self::Internal(format!("Image error: {}", e)),
            Self::Io(e) => Self::Internal(format!("IO error: {}", e)),
            Self::Serialization(e) => Self::Internal(format!("Serialization error: {}", e)),
            Self::Yaml(e) => Self::Internal(format!("YAML error: {}", e)),
        }
    }
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Stable name of the error's category, reported in error envelopes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::InvalidInput(_) => "InvalidInput",
            Self::Transport(_) => "Transport",
            Self::HttpStatus { .. } => "HttpStatus",
            Self::Normalization(_) => "Normalization",
            Self::Image(_) => "Image",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
            Self::Yaml(_) => "Yaml",
            Self::Busy => "Busy",
            Self::Internal(_) => "Internal",
        }
    }

    /// Only transport-level failures (connection, timeout, non-2xx) are worth
    /// another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }
}
