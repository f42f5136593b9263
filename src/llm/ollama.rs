//! Ollama backend — local daemon, no authentication.
//!
//! `POST {base}/api/chat` with `stream: false`; the reply text lives at
//! `message.content`.  Connection-refused errors carry a hint that the
//! daemon probably isn't running, since that is by far the common cause.

use async_trait::async_trait;
use rand::thread_rng;

use crate::config::OllamaConfig;

use super::prompt;
use super::provider::{LlmError, LlmProvider};

/// Local inference on a small model can still take a while on a Pi.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

pub struct Ollama {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl Ollama {
    pub fn from_config(config: &OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    async fn infer(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.config.base_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": prompt::MAX_TOKENS,
            },
        });

        log::debug!("Ollama request (temperature {temperature:.2})");

        let response = self.client.post(&url).json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::Request(format!(
                    "cannot reach Ollama at {} — is it running? (`ollama serve`): {e}",
                    self.config.base_url
                ))
            } else {
                LlmError::from(e)
            }
        })?;

        if !response.status().is_success() {
            return Err(LlmError::Request(format!(
                "Ollama returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| LlmError::Parse("no message.content".into()))?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl LlmProvider for Ollama {
    async fn joke(&self, history: &[String]) -> Result<String, LlmError> {
        let (prompt, temperature) = prompt::joke_prompt(history, &mut thread_rng());
        self.infer(&prompt, temperature).await
    }

    async fn flattery(&self, history: &[String]) -> Result<String, LlmError> {
        let prompt = prompt::flattery_prompt(history);
        self.infer(&prompt, prompt::DEFAULT_TEMPERATURE).await
    }

    fn provider_name(&self) -> &'static str {
        "Ollama"
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
    async fn unreachable_daemon_reports_hint() {
        // A port nothing listens on; connection is refused immediately.
        let provider = Ollama::from_config(&OllamaConfig {
            base_url: "http://127.0.0.1:1".into(),
            model: "llama3.2:3b".into(),
        });
        let err = provider.flattery(&[]).await.unwrap_err();
        match err {
            LlmError::Request(msg) => assert!(msg.contains("ollama serve"), "got: {msg}"),
            other => panic!("expected Request error, got {other}"),
        }
    }

    #[test]
    fn summary_accessors() {
        let provider = Ollama::from_config(&OllamaConfig::default());
        assert_eq!(provider.provider_name(), "Ollama");
        assert_eq!(provider.model_name(), "llama3.2:3b");
    }
}
