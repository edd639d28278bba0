mod types;

pub use types::*;

use crate::Result;
use std::{
    collections::BTreeMap,
    env,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const API_KEY_ENV: &str = "HF_API_KEY";

pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());
    load_from(config_path).await
}

/// Reads a YAML config file. A missing file yields the defaults so that
/// offline mode works without any setup.
pub async fn load_from(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from: {}", path.display());

    let config_str = match tokio::fs::read_to_string(path).await {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        Err(e) => return Err(e.into()),
    };

    // An empty document deserializes to unit, not to a map
    if config_str.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_yaml::from_str(&config_str)?;
    Ok(config)
}

pub fn credentials_path() -> PathBuf {
    env::var("CREDENTIALS_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("credentials.yaml"))
}

/// Persists a credential to the local key-value file, replacing any previous one.
pub async fn save_api_key(path: impl AsRef<Path>, api_key: &str) -> Result<()> {
    let path = path.as_ref();
    let mut values = read_credentials(path).await?;
    values.insert(API_KEY_ENV.to_string(), api_key.to_string());

    let contents = serde_yaml::to_string(&values)?;
    tokio::fs::write(path, contents).await?;

    info!("Saved API key to {}", path.display());
    Ok(())
}

pub async fn load_api_key(path: impl AsRef<Path>) -> Result<Option<String>> {
    let values = read_credentials(path.as_ref()).await?;
    Ok(values.get(API_KEY_ENV).cloned().filter(|k| !k.trim().is_empty()))
}

/// Picks the credential from, in order: the environment, the config file,
/// the persisted credential file.
pub async fn resolve_api_key(
    env_value: Option<String>,
    client: &ClientConfig,
    credentials: impl AsRef<Path>,
) -> Result<Option<String>> {
    let non_empty = |v: &String| !v.trim().is_empty();

    if let Some(key) = env_value.filter(non_empty) {
        debug!("Using API key from {}", API_KEY_ENV);
        return Ok(Some(key));
    }
    if let Some(key) = client.api_key.clone().filter(non_empty) {
        debug!("Using API key from configuration file");
        return Ok(Some(key));
    }
    load_api_key(credentials).await
}

async fn read_credentials(path: &Path) -> Result<BTreeMap<String, String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
        Ok(s) => Ok(serde_yaml::from_str(&s)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}
