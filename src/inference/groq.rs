use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::InferenceError;
use crate::inference::InferenceService;
use crate::inference::retry::{Attempt, RetryPolicy};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
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
    content: Option<String>,
}

/// Chat-completion client for an OpenAI-compatible endpoint (Groq by default).
pub struct GroqClient {
    client: Client,
    url: String,
    api_key: SecretString,
    model: String,
    temperature: f64,
    policy: RetryPolicy,
}

impl GroqClient {
    pub fn new(
        url: impl Into<String>,
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
            model: model.into(),
            temperature: 0.7,
            policy: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            config.inference_url.clone(),
            config.groq_api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_temperature(config.temperature)
        .with_retry_policy(RetryPolicy::new(config.max_retries, config.backoff_factor)))
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn attempt(&self, request: &ChatRequest<'_>) -> Attempt<String> {
        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!("❌ Inference request failed: {}", e);
                return Attempt::Failed(e.into());
            }
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::RateLimited;
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Attempt::Failed(e.into()),
        };
        if !status.is_success() {
            warn!("❌ Inference service responded [{}]", status);
            return Attempt::Failed(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        match extract_content(&body) {
            Ok(text) => Attempt::Done(text),
            Err(e) => Attempt::Failed(e),
        }
    }
}

/// Message text of the first completion.
fn extract_content(body: &str) -> Result<String, InferenceError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| InferenceError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| InferenceError::MalformedResponse("no completion content".into()))
}

#[async_trait::async_trait]
impl InferenceService for GroqClient {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(InferenceError::MissingCredential);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
        };

        info!("🤖 Requesting analysis from {} ({} prompt chars)", self.model, prompt.chars().count());
        let text = self.policy.run(|_| self.attempt(&request)).await?;
        info!("✅ Analysis received ({} chars)", text.chars().count());
        Ok(text)
    }
}
