//! Chat-style language-model access.
//!
//! The generator talks to a [`LanguageModel`]; production wires in
//! [`OpenAiClient`], tests use [`MockLanguageModel`].

pub mod mock;
pub mod openai;

pub use mock::MockLanguageModel;
pub use openai::OpenAiClient;

use crate::error::Result;
use async_trait::async_trait;

/// One chat completion: a system instruction plus one user message.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Returns the raw text of the first completion choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
