//! GreenPT backend — OpenAI-compatible chat completions over HTTPS.
//!
//! `POST {base}/chat/completions` with a bearer key; the reply text lives at
//! `choices[0].message.content`.  A missing API key fails the individual
//! request, not startup — the tree keeps working, it just can't tell jokes.

use async_trait::async_trait;
use rand::thread_rng;

use crate::config::GreenPtConfig;

use super::prompt;
use super::provider::{LlmError, LlmProvider};

/// Per-request deadline; remote inference can be slow but not this slow.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

// ---------------------------------------------------------------------------
// GreenPt
// ---------------------------------------------------------------------------

pub struct GreenPt {
    client: reqwest::Client,
    config: GreenPtConfig,
}

impl GreenPt {
    pub fn from_config(config: &GreenPtConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// One chat-completions round trip.
    async fn infer(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey("GREENPT_API_KEY"))?;

        let url = format!("{}/chat/completions", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": prompt::MAX_TOKENS,
            "temperature": temperature,
        });

        log::debug!("GreenPT request (temperature {temperature:.2})");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Request(format!(
                "GreenPT returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::Parse("no choices[0].message.content".into()))?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for GreenPt {
    async fn joke(&self, history: &[String]) -> Result<String, LlmError> {
        let (prompt, temperature) = prompt::joke_prompt(history, &mut thread_rng());
        self.infer(&prompt, temperature).await
    }

    async fn flattery(&self, history: &[String]) -> Result<String, LlmError> {
        let prompt = prompt::flattery_prompt(history);
        self.infer(&prompt, prompt::DEFAULT_TEMPERATURE).await
    }

    fn provider_name(&self) -> &'static str {
        "GreenPT"
    }

    fn model_name(&self) -> String {
        self.config.model.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_a_per_call_error() {
        let provider = GreenPt::from_config(&GreenPtConfig::default()); // no key
        let err = provider.joke(&[]).await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey("GREENPT_API_KEY")));
    }

    #[test]
    fn summary_accessors() {
        let provider = GreenPt::from_config(&GreenPtConfig::default());
        assert_eq!(provider.provider_name(), "GreenPT");
        assert_eq!(provider.model_name(), "gemma-3-27b-it");
    }
}
