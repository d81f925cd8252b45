use super::{CompletionRequest, LanguageModel};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Canned language model that records every request it receives.
#[derive(Clone)]
pub struct MockLanguageModel {
    reply: std::result::Result<String, String>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockLanguageModel {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());

        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(AppError::Llm(message.clone())),
        }
    }
}
