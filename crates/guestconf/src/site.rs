//! Site configuration: who is getting married, and where quotes come from.

use serde::{Deserialize, Serialize};

/// Site-level sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub event: EventConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
}

/// The couple, as shown in greetings and deep links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    #[serde(default = "EventConfig::default_groom")]
    pub groom: String,

    #[serde(default = "EventConfig::default_bride")]
    pub bride: String,

    /// WhatsApp number receiving guest greetings, international format
    /// without `+` (e.g. 6285156684814).
    #[serde(default = "EventConfig::default_phone")]
    pub phone: String,
}

impl EventConfig {
    fn default_groom() -> String {
        "Yamin".to_string()
    }

    fn default_bride() -> String {
        "Anisa".to_string()
    }

    fn default_phone() -> String {
        "6285156684814".to_string()
    }
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            groom: Self::default_groom(),
            bride: Self::default_bride(),
            phone: Self::default_phone(),
        }
    }
}

/// Generative quote backend (Gemini `generateContent`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteConfig {
    /// API key. Empty means the fallback quote is always served.
    #[serde(default)]
    pub api_key: String,

    /// Default: gemini-3-flash-preview
    #[serde(default = "QuoteConfig::default_model")]
    pub model: String,

    /// Base URL of the API, without the `/models/...` suffix.
    #[serde(default = "QuoteConfig::default_endpoint")]
    pub endpoint: String,

    /// Request timeout.
    /// Default: 10000
    #[serde(default = "QuoteConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl QuoteConfig {
    fn default_model() -> String {
        "gemini-3-flash-preview".to_string()
    }

    fn default_endpoint() -> String {
        "https://generativelanguage.googleapis.com/v1beta".to_string()
    }

    fn default_timeout_ms() -> u64 {
        10_000
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: Self::default_model(),
            endpoint: Self::default_endpoint(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}
