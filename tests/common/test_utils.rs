use hf_inference_kit::config::Config;
use image::RgbImage;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a test configuration pointed at a mock endpoint, with fast retries
pub fn create_test_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.client.base_url = format!("{server_uri}/models");
    config.client.timeout_secs = 5;
    config.retry.max_attempts = 3;
    config.retry.initial_delay_ms = 1;
    config.retry.backoff_multiplier = 2.0;
    config.cache.max_entries = 8;
    config
}

/// Create an offline configuration
pub fn create_mock_config() -> Config {
    let mut config = Config::default();
    config.client.mock_mode = true;
    config
}

/// Create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Write a small solid-colour image with the given file name
pub fn write_test_image(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    RgbImage::from_pixel(width, height, image::Rgb([20, 120, 220]))
        .save(&path)
        .expect("Failed to write test image");
    path
}

/// Sample configuration YAML for testing
pub const SAMPLE_CONFIG_YAML: &str = r#"
client:
  base_url: "http://localhost:9999/models"
  mock_mode: true
  default_model: "gpt2"
  timeout_secs: 10

retry:
  max_attempts: 2
  initial_delay_ms: 100
  backoff_multiplier: 3.0

cache:
  max_entries: 16

logs:
  level: "debug"

models:
  - name: "Summarizer"
    id: "facebook/bart-large-cnn"
    category: "Summarization"
    input_type: "text"
    pipeline: "summarization"
  - name: "Sentiment Analysis"
    id: "distilbert-base-uncased-finetuned-sst-2-english"
    input_type: "text"
    pipeline: "text-classification"
"#;
