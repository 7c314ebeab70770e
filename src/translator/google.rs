use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::TranslationError;
use crate::translator::{Translator, chunk_text};

/// Upper bound the free endpoint accepts per request.
const MAX_CHUNK_CHARS: usize = 5000;

/// Client for Google's public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: Client,
    url: String,
}

impl GoogleTranslator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    async fn translate_chunk(&self, chunk: &str, source: &str, target: &str) -> Result<String, TranslationError> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("client", "gtx"), ("sl", source), ("tl", target), ("dt", "t")])
            .form(&[("q", chunk)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("❌ Translation service responded [{}]", status);
            return Err(TranslationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_translation(&body)
    }
}

/// Joins the translated segments of a `[[[translated, original, ...], ...], ...]` payload.
fn parse_translation(body: &str) -> Result<String, TranslationError> {
    let value: Value = serde_json::from_str(body).map_err(|e| TranslationError::Malformed(e.to_string()))?;
    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::Malformed("missing translation segments".into()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

#[async_trait::async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String, TranslationError> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        info!("🌐 Translating {} chunk(s) {} -> {}", chunks.len(), source, target);

        let mut translated = String::with_capacity(text.len());
        for chunk in chunks {
            let part = self.translate_chunk(chunk, source, target).await?;
            translated.push_str(&part);
            if chunk.ends_with('\n') && !part.ends_with('\n') {
                translated.push('\n');
            }
        }
        Ok(translated)
    }
}
