//! Celebratory quotes for the couple.
//!
//! The quote is decoration: it never blocks the page and never fails. Any
//! backend problem degrades to a fixed fallback line.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use guestconf::QuoteConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Served when the backend answered but produced no text.
pub const EMPTY_RESPONSE_QUOTE: &str =
    "Mendaki bersama menuju puncak ketaatan, merajut rida-Nya dalam setiap langkah petualangan cinta.";

/// Served when the backend could not be reached or misbehaved.
pub const FALLBACK_QUOTE: &str =
    "Cinta adalah perjalanan mendaki menuju satu rida-Nya, di mana doa adalah bekal dan sabar adalah kompasnya.";

/// Source of a short quote for the couple. Infallible by contract.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn quote(&self, groom: &str, bride: &str) -> String;
}

/// Always returns the same text.
#[derive(Debug, Clone)]
pub struct StaticQuoteProvider {
    text: String,
}

impl StaticQuoteProvider {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticQuoteProvider {
    fn default() -> Self {
        Self::new(FALLBACK_QUOTE)
    }
}

#[async_trait]
impl QuoteProvider for StaticQuoteProvider {
    async fn quote(&self, _groom: &str, _bride: &str) -> String {
        self.text.clone()
    }
}

/// Quotes from the Gemini `generateContent` API.
pub struct GeminiQuoteProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiQuoteProvider {
    pub fn new(config: &QuoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// One round trip. `Ok(None)` when the response carried no text.
    async fn generate(&self, prompt: String) -> Result<Option<String>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: Some(prompt) }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to reach quote backend")?;

        if !response.status().is_success() {
            anyhow::bail!("Quote backend returned status {}", response.status());
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .context("Failed to parse quote response")?;

        Ok(body.text())
    }
}

#[async_trait]
impl QuoteProvider for GeminiQuoteProvider {
    async fn quote(&self, groom: &str, bride: &str) -> String {
        match self.generate(prompt(groom, bride)).await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::warn!(model = %self.model, "quote backend returned no text");
                EMPTY_RESPONSE_QUOTE.to_string()
            }
            Err(e) => {
                tracing::warn!(model = %self.model, error = %format!("{e:#}"), "quote backend failed");
                FALLBACK_QUOTE.to_string()
            }
        }
    }
}

/// Pick a provider for the configuration: Gemini when a key is set.
pub fn provider_for(config: &QuoteConfig) -> Result<Box<dyn QuoteProvider>> {
    if config.has_api_key() {
        Ok(Box::new(GeminiQuoteProvider::new(config)?))
    } else {
        tracing::info!("no quote API key configured, serving the fallback quote");
        Ok(Box::new(StaticQuoteProvider::default()))
    }
}

fn prompt(groom: &str, bride: &str) -> String {
    format!(
        "Buatkan kutipan (quote) pernikahan islami puitis untuk pasangan {groom} dan {bride}. \
         Gunakan metafora pendakian gunung, petualangan, perjalanan alam, atau mencapai puncak bersama. \
         Bahasa Indonesia yang sangat indah, romantis, dan bermakna. Maksimal 2 kalimat pendek."
    )
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated and trimmed.
    fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}
