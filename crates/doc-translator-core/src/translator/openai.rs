use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{Translator, TranslatorInfo};
use crate::config::{Lang, TranslatorConfig};
use crate::error::{Error, Result};
use async_trait::async_trait;

/// OpenAI-compatible API translator
/// Works with: llama.cpp server, Ollama, DeepSeek, OpenAI, etc.
///
/// Translation is strictly one-shot: a failed request surfaces as an error
/// and the caller decides whether to fall back to the original text. There
/// is deliberately no retry loop here.
pub struct OpenAiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "http://localhost:8080/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

impl OpenAiTranslator {
    /// Create a new OpenAI translator.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be created, which should only happen
    /// in extreme circumstances (e.g., TLS backend unavailable on the system).
    #[allow(clippy::expect_used)]
    pub fn new(
        api_base: String,
        api_key: Option<String>,
        model: String,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_base,
            api_key,
            model,
        }
    }

    /// Create from a translator config section.
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(
            config.api_base.clone(),
            config.api_key.clone(),
            config.model.clone(),
            config.timeout_secs,
        )
    }

    /// Create translation prompt
    fn create_prompt(text: &str, source: &Lang, target: &Lang) -> String {
        let source_hint = if source.is_auto() {
            String::new()
        } else {
            format!(" from {}", language_name(source))
        };
        format!(
            "Translate the following text{} into {}. Output only the translation, no explanations.\n\nText: \"{}\"",
            source_hint,
            language_name(target),
            text
        )
    }

    /// Make a single API request.
    async fn request(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let prompt = Self::create_prompt(text, source, target);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature: Some(0.3), // Lower temperature for more consistent translations
            max_tokens: None,
        };

        debug!("Translation request to {}", url);

        let mut req = self.client.post(&url).json(&request);

        // Add API key if configured
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request failed: {}", e);
                if e.is_timeout() {
                    return Err(Error::TranslationTimeout);
                }
                return Err(Error::TranslationRequest(e.to_string()));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("API error: {} - {}", status, body);
            return Err(Error::TranslationRequest(format!("HTTP {status}: {body}")));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse response: {}", e);
            Error::TranslationInvalidResponse(e.to_string())
        })?;

        let choice = chat_response.choices.first().ok_or_else(|| {
            Error::TranslationInvalidResponse("No choices in response".to_string())
        })?;

        let translated = choice.message.content.trim();
        // Remove quotes if the model wrapped the response
        Ok(translated
            .trim_start_matches('"')
            .trim_end_matches('"')
            .to_string())
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
            requires_api_key: false, // Optional for local servers
            supports_auto_detect: true,
        }
    }

    async fn translate(&self, text: &str, source: &Lang, target: &Lang) -> Result<String> {
        // Skip empty text without touching the backend
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        // Skip if source and target are the same
        if source.as_str() == target.as_str() && !source.is_auto() {
            return Ok(text.to_string());
        }

        self.request(text, source, target).await
    }

    fn is_available(&self) -> bool {
        // For local servers, we don't require an API key
        true
    }
}

/// Convert language code to human-readable name for prompts
fn language_name(lang: &Lang) -> &'static str {
    match lang.as_str() {
        "en" => "English",
        "zh-CN" => "Simplified Chinese",
        "zh-TW" => "Traditional Chinese",
        "ja" => "Japanese",
        "ko" => "Korean",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ar" => "Arabic",
        "hi" => "Hindi",
        "th" => "Thai",
        "vi" => "Vietnamese",
        // For unknown languages, the LLM should still understand most ISO codes
        _ => "the specified language",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_name() {
        assert_eq!(language_name(&Lang::new("en")), "English");
        assert_eq!(language_name(&Lang::new("zh-CN")), "Simplified Chinese");
        assert_eq!(language_name(&Lang::new("unknown")), "the specified language");
    }

    #[tokio::test]
    async fn empty_input_is_returned_unchanged_without_a_request() {
        // Unroutable base URL: a real request would error, so success here
        // proves the guard short-circuits.
        let translator =
            OpenAiTranslator::new("http://127.0.0.1:1/v1".to_string(), None, "m".to_string(), 1);

        let out = translator
            .translate("   \n ", &Lang::auto(), &Lang::new("es"))
            .await
            .expect("empty input must not hit the backend");
        assert_eq!(out, "   \n ");
    }

    #[tokio::test]
    async fn same_language_pair_is_returned_unchanged() {
        let translator =
            OpenAiTranslator::new("http://127.0.0.1:1/v1".to_string(), None, "m".to_string(), 1);

        let out = translator
            .translate("Bonjour", &Lang::new("fr"), &Lang::new("fr"))
            .await
            .expect("same-language input must not hit the backend");
        assert_eq!(out, "Bonjour");
    }
}
