pub mod groq;
pub mod retry;

pub use groq::GroqClient;
pub use retry::{Attempt, RetryPolicy};

use crate::errors::InferenceError;

/// Hosted language model that turns a prompt into analysis text.
#[async_trait::async_trait]
pub trait InferenceService: Send + Sync {
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError>;
}
