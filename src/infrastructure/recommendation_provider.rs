//! Optional audit recommendations from an OpenAI-compatible chat service
//!
//! The service is best-effort: any failure is logged and replaced with the
//! fixed fallback recommendations, so callers never see an error.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::analysis::PageAnalysis;
use crate::domain::recommendations::{AuditRecommendations, build_prompt};
use crate::infrastructure::config::RecommendationConfig;

const SYSTEM_PROMPT: &str =
    "You are an SEO and web accessibility auditor. Reply with a single JSON object and nothing else.";

#[derive(Error, Debug)]
pub enum RecommendationError {
    #[error("API key variable {variable} is not set")]
    MissingApiKey { variable: String },

    #[error("Invalid API key: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Request to recommendation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Recommendation service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Recommendation service returned no choices")]
    EmptyResponse,

    #[error("Recommendation payload is not valid JSON: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    async fn recommend(&self, analysis: &PageAnalysis) -> Result<AuditRecommendations, RecommendationError>;
}

/// Ask `provider` for recommendations, substituting the fallback on any failure
pub async fn recommend_or_fallback(
    provider: &dyn RecommendationProvider,
    analysis: &PageAnalysis,
) -> AuditRecommendations {
    match provider.recommend(analysis).await {
        Ok(recommendations) => recommendations,
        Err(e) => {
            warn!("Recommendation service failed, using fallback: {}", e);
            AuditRecommendations::fallback()
        }
    }
}

pub struct ChatCompletionsProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
}

impl ChatCompletionsProvider {
    pub fn new(config: &RecommendationConfig, api_key: String) -> Result<Self, RecommendationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    /// Read the API key from the configured environment variable
    pub fn from_env(config: &RecommendationConfig) -> Result<Self, RecommendationError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| RecommendationError::MissingApiKey {
                variable: config.api_key_env.clone(),
            })?;
        Self::new(config, api_key)
    }

    fn headers(&self) -> Result<HeaderMap, RecommendationError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.api_key.trim());
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl RecommendationProvider for ChatCompletionsProvider {
    async fn recommend(&self, analysis: &PageAnalysis) -> Result<AuditRecommendations, RecommendationError> {
        let prompt = build_prompt(analysis);
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        debug!(model = %self.model, "Requesting audit recommendations");
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(RecommendationError::HttpStatus { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(RecommendationError::EmptyResponse)?;

        parse_recommendations(&content)
    }
}

/// Parse the model's reply, tolerating a fenced code block around the JSON
pub fn parse_recommendations(content: &str) -> Result<AuditRecommendations, RecommendationError> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|inner| inner.strip_suffix("```"))
        .unwrap_or(trimmed);

    Ok(serde_json::from_str(json.trim())?)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}
