//! Configuration loader for the Smart Chatbot.
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional
//! `smartchat.toml`, a `.env` file in the working directory, then process
//! environment variables. CLI flags are applied by the binary on top.
//! A missing or malformed file falls back to the layer below it.

use std::path::Path;

use smartchat_types::config::RelayConfig;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "smartchat.toml";

/// Result of [`load_config`].
///
/// Loading runs before the tracing subscriber exists, so problems are
/// collected in `warnings` for the caller to log.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: RelayConfig,
    pub warnings: Vec<String>,
}

/// Load the configuration from `path` (or [`DEFAULT_CONFIG_FILE`]), `.env`
/// and the process environment.
pub async fn load_config(path: Option<&Path>) -> LoadedConfig {
    let mut warnings = Vec::new();
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let mut config = load_file(path, explicit, &mut warnings).await;

    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => warnings.push(format!("Failed to read .env: {err}")),
    }

    warnings.extend(apply_env_overrides(&mut config, |key| std::env::var(key).ok()));
    LoadedConfig { config, warnings }
}

async fn load_file(path: &Path, explicit: bool, warnings: &mut Vec<String>) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            if explicit {
                warnings.push(format!("Config file {} not found, using defaults", path.display()));
            }
            return RelayConfig::default();
        }
        Err(err) => {
            warnings.push(format!("Failed to read {}: {err}, using defaults", path.display()));
            return RelayConfig::default();
        }
    };

    match toml::from_str::<RelayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {err}, using defaults", path.display()));
            RelayConfig::default()
        }
    }
}

/// Overlay environment variables onto `config`.
///
/// `lookup` returns the raw value of a variable. Values that fail to parse
/// are skipped; one warning is returned for each.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string());
    let mut warnings = Vec::new();

    if let Some(v) = get("HOST") {
        config.host = v;
    }
    if let Some(v) = parsed(&get, &mut warnings, "PORT") {
        config.port = v;
    }
    if let Some(v) = get("DEBUG") {
        config.debug = v.eq_ignore_ascii_case("true") || v == "1";
    }
    if let Some(v) = get("OLLAMA_BASE_URL") {
        config.ollama_base_url = v;
    }
    if let Some(v) = parsed(&get, &mut warnings, "OLLAMA_TIMEOUT") {
        config.ollama_timeout_secs = v;
    }
    if let Some(v) = parsed(&get, &mut warnings, "OLLAMA_LIST_TIMEOUT") {
        config.ollama_list_timeout_secs = v;
    }
    if let Some(v) = get("OLLAMA_DEFAULT_MODEL") {
        config.preferred_model = v;
    }
    if let Some(v) = get("GITHUB_TOKEN") {
        config.github_token = Some(v).filter(|t| !t.is_empty());
    }
    if let Some(v) = get("GITHUB_ACCOUNT") {
        config.github_account = Some(v).filter(|a| !a.is_empty());
    }
    if let Some(v) = get("GITHUB_API_BASE") {
        config.github_api_base = v;
    }
    if let Some(v) = parsed(&get, &mut warnings, "GITHUB_TIMEOUT") {
        config.github_timeout_secs = v;
    }
    if let Some(v) = parsed(&get, &mut warnings, "MAX_MESSAGE_LENGTH") {
        config.max_message_length = v;
    }
    if let Some(v) = get("CORS_ORIGINS") {
        config.cors_origins = v
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = get("LOG_LEVEL") {
        config.log_level = v;
    }
    warnings
}

fn parsed<T, G>(get: &G, warnings: &mut Vec<String>, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warnings.push(format!("Ignoring {key}={raw:?}: {err}"));
            None
        }
    }
}
