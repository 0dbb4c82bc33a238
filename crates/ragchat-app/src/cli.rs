//! CLI argument definitions for the RagChat binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use ragchat_core::config::RagChatConfig;

/// RagChat: ask a retrieval-augmented-generation backend questions from the
/// terminal.
#[derive(Parser, Debug)]
#[command(name = "ragchat", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the RAG backend (e.g. http://localhost:8000).
    #[arg(short = 'u', long = "base-url")]
    pub base_url: Option<String>,

    /// Model to request.
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 2.0).
    #[arg(short = 't', long = "temperature")]
    pub temperature: Option<f64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Ask this question, print the answer and exit instead of starting the
    /// interactive session.
    pub question: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RAGCHAT_CONFIG env var > ~/.ragchat/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RAGCHAT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --base-url flag > RAGCHAT_BASE_URL env var > config file value.
    pub fn resolve_base_url(&self, config_value: &str) -> String {
        self.resolve_base_url_from(std::env::var("RAGCHAT_BASE_URL").ok(), config_value)
    }

    fn resolve_base_url_from(&self, env_value: Option<String>, config_value: &str) -> String {
        if let Some(ref url) = self.base_url {
            return url.clone();
        }
        match env_value {
            Some(url) if !url.trim().is_empty() => url,
            _ => config_value.to_string(),
        }
    }

    /// Resolve the log filter directive.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_value: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_value.to_string())
    }

    /// Fold CLI and environment overrides into a loaded configuration.
    pub fn apply_overrides(&self, config: &mut RagChatConfig) {
        config.backend.base_url = self.resolve_base_url(&config.backend.base_url);
        if let Some(ref model) = self.model {
            config.chat.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            config.chat.temperature = temperature;
        }
        config.general.log_level = self.resolve_log_level(&config.general.log_level);
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".ragchat").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".ragchat").join("config.toml");
    }
    PathBuf::from("config.toml")
}
