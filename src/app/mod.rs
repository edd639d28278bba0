//! Headless presentation layer: the model catalog, one wrapper per entry,
//! output rendering and the single-flight background runner.

mod catalog;
pub mod format;
mod runner;

pub use catalog::{ModelCatalog, ModelEntry, ModelKind, builtin_models};
pub use runner::{BackgroundRunner, RunHandle};

use crate::{
    Error, Result,
    client::{Envelope, HfClient, InferenceClient},
    config::Config,
    models::{ImageModel, Model, SentimentModel, TextModel},
};
use std::{path::Path, sync::Arc};
use tracing::info;

pub struct App {
    catalog: ModelCatalog,
    models: Vec<Arc<dyn Model>>,
    runner: BackgroundRunner,
}

impl App {
    pub fn new(config: &Config, api_key: Option<String>) -> Result<Self> {
        let client = HfClient::new(config, api_key)?;
        info!(
            "Initializing {} models (mock mode: {})",
            config.models.len(),
            client.is_mock()
        );
        Ok(Self::with_client(
            Arc::new(client),
            ModelCatalog::new(config.models.clone()),
        ))
    }

    pub fn with_client(client: Arc<dyn InferenceClient>, catalog: ModelCatalog) -> Self {
        let models = catalog
            .entries()
            .iter()
            .map(|entry| build_model(entry, Arc::clone(&client)))
            .collect();

        Self {
            catalog,
            models,
            runner: BackgroundRunner::new(),
        }
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn entry(&self, name: &str) -> Result<&ModelEntry> {
        self.catalog
            .find(name)
            .ok_or_else(|| Error::invalid_input(format!("Unknown model: {name}")))
    }

    pub fn model_info(&self, name: &str) -> Result<String> {
        self.entry(name).map(format::model_info_text)
    }

    pub fn model(&self, name: &str) -> Result<Arc<dyn Model>> {
        let index = self
            .catalog
            .position(name)
            .ok_or_else(|| Error::invalid_input(format!("Unknown model: {name}")))?;
        Ok(Arc::clone(&self.models[index]))
    }

    /// Runs a model on the calling task.
    pub async fn run(&self, name: &str, input: &str) -> Result<Envelope> {
        let model = self.model(name)?;
        Ok(model.process_input(input).await)
    }

    /// Runs a model on a background task; refused while another run is
    /// outstanding.
    pub fn run_in_background<F>(&self, name: &str, input: String, on_complete: F) -> Result<RunHandle>
    where
        F: FnOnce(Envelope) + Send + 'static,
    {
        let model = self.model(name)?;
        self.runner.start(model, input, on_complete)
    }

    pub fn is_busy(&self) -> bool {
        self.runner.is_busy()
    }
}

fn build_model(entry: &ModelEntry, client: Arc<dyn InferenceClient>) -> Arc<dyn Model> {
    match entry.kind() {
        ModelKind::Sentiment => Arc::new(SentimentModel::new(client, entry.id.clone())),
        ModelKind::Text => Arc::new(TextModel::new(
            client,
            entry.id.clone(),
            entry.pipeline.clone(),
        )),
        ModelKind::Image => Arc::new(ImageModel::with_pipeline(
            client,
            entry.id.clone(),
            entry.pipeline.clone(),
        )),
    }
}

pub async fn read_input_file(path: impl AsRef<Path>) -> Result<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}

pub async fn save_output(path: impl AsRef<Path>, output: &str) -> Result<()> {
    let path = path.as_ref();
    tokio::fs::write(path, output).await?;
    info!("Saved output to {}", path.display());
    Ok(())
}
