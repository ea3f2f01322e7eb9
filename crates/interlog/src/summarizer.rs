//! AI commentary on recent sessions
//!
//! The summarizer sends a short prompt built from the most recent sessions to a
//! hosted text-generation service and returns whatever text comes back. It
//! never fails: a missing credential, an empty log or a transport error all
//! degrade to a fixed message.

use async_trait::async_trait;
use interlog_core::SummarizerConfig;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::session::Session;

pub const MSG_UNAVAILABLE: &str = "API Key missing. Cannot generate analysis.";
pub const MSG_NO_DATA: &str = "No data to analyze yet. You are safe... for now.";
pub const MSG_EMPTY_RESPONSE: &str = "Could not generate analysis.";
pub const MSG_FAILED: &str =
    "Failed to contact the AI consultant. Maybe they are also chatting with a colleague.";

/// Errors from the text-generation transport
#[derive(Error, Debug, Clone)]
pub enum SummarizerError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// A request/response text completion service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizerError>;
}

/// Client for the Gemini `generateContent` REST endpoint
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizerError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizerError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SummarizerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = resp
            .json()
            .await
            .map_err(|e| SummarizerError::Malformed(e.to_string()))?;
        Ok(extract_text(&value))
    }
}

/// Concatenate the text parts of the first candidate
fn extract_text(value: &Value) -> String {
    value["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// Build the prompt from the `limit` most recent sessions
pub fn build_prompt(sessions: &[Session], limit: usize) -> String {
    let mut recent: Vec<&Session> = sessions.iter().collect();
    recent.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let lines: Vec<String> = recent
        .into_iter()
        .take(limit)
        .map(|s| {
            let topic = if s.note.trim().is_empty() {
                "No topic recorded"
            } else {
                s.note.as_str()
            };
            format!(
                "- Date: {}, Duration: {} mins, Topic: {}",
                s.date,
                s.rounded_minutes(),
                topic
            )
        })
        .collect();

    format!(
        r#"You are a witty, slightly sarcastic corporate productivity consultant.
Analyze the following log of interruptions by an "idle colleague" who keeps coming to my desk to chat.

Data:
{}

Please provide:
1. A summary of the total time wasted recently.
2. A sarcastic comment on the most frequent topics.
3. A brief "productivity impact score" from 1 to 10 (10 being catastrophic).
4. Advice on how to politely make them leave next time.

Keep it concise and funny."#,
        lines.join("\n")
    )
}

/// Summarizer front end; holds no generator when no credential is configured
#[derive(Clone)]
pub struct Summarizer {
    generator: Option<Arc<dyn TextGenerator>>,
    sample_size: usize,
}

impl Summarizer {
    /// Build from configuration; without an API key the summarizer is unavailable
    pub fn from_config(config: &SummarizerConfig) -> Self {
        let generator = config.api_key.as_ref().map(|key| {
            Arc::new(GeminiClient::new(
                key.clone(),
                config.model.clone(),
                config.endpoint.clone(),
            )) as Arc<dyn TextGenerator>
        });
        if generator.is_none() {
            tracing::warn!("summarizer API key missing, AI analysis disabled");
        }

        Self {
            generator,
            sample_size: config.sample_size,
        }
    }

    /// Use a specific generator (or none)
    pub fn with_generator(generator: Option<Arc<dyn TextGenerator>>, sample_size: usize) -> Self {
        Self {
            generator,
            sample_size,
        }
    }

    pub fn is_available(&self) -> bool {
        self.generator.is_some()
    }

    /// Produce commentary on `sessions`. Always returns displayable text.
    pub async fn summarize(&self, sessions: &[Session]) -> String {
        let Some(generator) = &self.generator else {
            return MSG_UNAVAILABLE.to_string();
        };

        if sessions.is_empty() {
            return MSG_NO_DATA.to_string();
        }

        let prompt = build_prompt(sessions, self.sample_size);
        tracing::debug!(sessions = sessions.len().min(self.sample_size), "requesting analysis");

        match generator.generate(&prompt).await {
            Ok(text) if text.trim().is_empty() => MSG_EMPTY_RESPONSE.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "summarizer request failed");
                MSG_FAILED.to_string()
            }
        }
    }
}
