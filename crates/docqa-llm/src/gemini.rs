//! Gemini generation client.
//!
//! Single-shot `generateContent` calls against the Generative Language
//! API, falling through the configured model list on rate-limit or
//! temporary unavailability. Failure is a typed `Error::Llm` — never a
//! sentinel string mixed into generated text.

use docqa_core::{Error, Result};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::TextGenerator;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    /// Model names tried in order; later entries are rate-limit
    /// fallbacks.
    models: Vec<String>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, models: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            models,
        }
    }

    async fn generate_with_model(
        &self,
        model: &str,
        prompt: &str,
        role: Option<&str>,
        temperature: f64,
    ) -> Result<Attempt> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_BASE_URL, model, self.api_key
        );

        let mut body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {"temperature": temperature},
        });
        if let Some(role) = role {
            body["system_instruction"] = json!({"parts": [{"text": role}]});
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("request failed: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 429 || status.as_u16() == 503 {
            return Ok(Attempt::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!("API error {}: {}", status, detail)));
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("invalid response body: {}", e)))?;

        let text = extract_candidate_text(&parsed)
            .ok_or_else(|| Error::Llm("response contained no candidate text".into()))?;
        Ok(Attempt::Text(text))
    }
}

enum Attempt {
    Text(String),
    RateLimited,
}

/// Concatenate all text parts of the first candidate.
fn extract_candidate_text(value: &serde_json::Value) -> Option<String> {
    let parts = value["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str, role: Option<&str>, temperature: f64) -> Result<String> {
        for model in &self.models {
            debug!("Generating with model {}", model);
            match self
                .generate_with_model(model, prompt, role, temperature)
                .await?
            {
                Attempt::Text(text) => return Ok(text),
                Attempt::RateLimited => {
                    warn!("Model {} rate-limited, trying next fallback", model);
                }
            }
        }
        Err(Error::Llm("all configured models are rate-limited".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_candidate_text() {
        let value = json!({
            "candidates": [{
                "content": {"parts": [{"text": "안녕"}, {"text": "하세요"}]}
            }]
        });
        assert_eq!(extract_candidate_text(&value).as_deref(), Some("안녕하세요"));
    }

    #[test]
    fn test_extract_candidate_text_empty() {
        assert!(extract_candidate_text(&json!({})).is_none());
        assert!(extract_candidate_text(&json!({"candidates": []})).is_none());
    }
}
