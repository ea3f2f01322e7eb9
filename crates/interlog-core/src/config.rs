//! Configuration loading for interlog
//!
//! Layering: built-in defaults, then `config.toml`, then the environment.
//! The summarizer credential is the only value read from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variables consulted for the summarizer credential, in order
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Interlog configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Override for the data directory
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Summarizer settings
    #[serde(default)]
    pub summarizer: SummarizerConfig,
}

/// Settings for the hosted text-generation service
#[derive(Debug, Clone, Deserialize)]
pub struct SummarizerConfig {
    /// API credential; absent means the summarizer is unavailable
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the REST API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// How many recent sessions are sent in the prompt
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_sample_size() -> usize {
    20
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            sample_size: default_sample_size(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (if present) and the process environment
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env(path, |name| std::env::var(name).ok())
    }

    /// Load configuration using `env` to resolve environment variables
    pub fn load_with_env<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;

            toml::from_str::<Config>(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Config::default()
        };

        if let Some(key) = API_KEY_VARS
            .iter()
            .find_map(|name| env(name).filter(|v| !v.trim().is_empty()))
        {
            config.summarizer.api_key = Some(key);
        }

        // An empty key in the file means "not configured"
        if config
            .summarizer
            .api_key
            .as_deref()
            .is_some_and(|k| k.trim().is_empty())
        {
            config.summarizer.api_key = None;
        }

        Ok(config)
    }
}
