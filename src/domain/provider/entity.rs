//! Provider entities

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Vendors whose API keys can be stored and tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Claude,
    Gemini,
    Grok,
    Perplexity,
    Cohere,
    Mistral,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Self::OpenAi,
        Self::Claude,
        Self::Gemini,
        Self::Grok,
        Self::Perplexity,
        Self::Cohere,
        Self::Mistral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
            Self::Perplexity => "perplexity",
            Self::Cohere => "cohere",
            Self::Mistral => "mistral",
        }
    }

    /// Vendor name as shown to users and in connection errors
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::Grok => "Grok",
            Self::Perplexity => "Perplexity",
            Self::Cohere => "Cohere",
            Self::Mistral => "Mistral",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "claude" | "anthropic" => Ok(Self::Claude),
            "gemini" | "google" => Ok(Self::Gemini),
            "grok" | "xai" => Ok(Self::Grok),
            "perplexity" => Ok(Self::Perplexity),
            "cohere" => Ok(Self::Cohere),
            "mistral" => Ok(Self::Mistral),
            other => Err(DomainError::validation(format!(
                "Unsupported provider: {}",
                other
            ))),
        }
    }
}

/// One priced model; prices are USD per 1M tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModel {
    pub name: String,
    pub model_id: String,
    pub input_price: f64,
    pub output_price: f64,
    /// Display string such as `128K`
    pub context: String,
}

impl AiModel {
    pub fn average_price(&self) -> f64 {
        (self.input_price + self.output_price) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiProvider {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub models: Vec<AiModel>,
    pub avg_cost_per_1m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs_url: Option<String>,
    pub enabled: bool,
}
