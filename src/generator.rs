//! Headline/subheadline generation that keeps the page's tag structure.
//!
//! A single completion is requested. Its text is read as a JSON object when
//! possible, otherwise scanned line by line. Any error along the way degrades
//! to the original fragments so callers always get a result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::llm::{CompletionRequest, LanguageModel};
use crate::markup::wrap;
use crate::prompt::{build_prompt, OriginalHeadline, COPYWRITER_SYSTEM};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 300;

const AI_HEADLINE: &str = "AI Generated Headline";
const AI_SUBHEADLINE: &str = "AI Generated Subheadline";
const FALLBACK_NEEDLE: &str = "First Marathon Journey Begins.";
const FALLBACK_REPLACEMENT: &str = "Your Personalized Marathon Adventure Starts Now!";

/// The pair returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedHeadline {
    pub headline: String,
    pub subheadline: String,
}

/// How a [`GeneratedHeadline`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The model replied with a JSON object.
    Parsed(GeneratedHeadline),
    /// The model replied with free text that was scanned for lines.
    Scanned(GeneratedHeadline),
    /// The call or its handling failed; original fragments are returned.
    Fallback(GeneratedHeadline),
}

impl Generation {
    pub fn into_headline(self) -> GeneratedHeadline {
        match self {
            Generation::Parsed(h) | Generation::Scanned(h) | Generation::Fallback(h) => h,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback(_))
    }
}

pub struct HeadlineGenerator {
    model: Arc<dyn LanguageModel>,
}

impl HeadlineGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Never fails: errors are logged and replaced by [`fallback`].
    pub async fn generate(
        &self,
        description: &str,
        insights: &[String],
        original: &OriginalHeadline,
    ) -> Generation {
        match self.try_generate(description, insights, original).await {
            Ok(generation) => generation,
            Err(e) => {
                tracing::warn!("Text generation failed, using original fragments: {}", e);
                Generation::Fallback(fallback(original))
            }
        }
    }

    async fn try_generate(
        &self,
        description: &str,
        insights: &[String],
        original: &OriginalHeadline,
    ) -> Result<Generation> {
        let request = CompletionRequest {
            system: COPYWRITER_SYSTEM.to_string(),
            user: build_prompt(description, insights, original),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let reply = self.model.complete(&request).await?;
        parse_reply(reply.trim(), original.headline_tag(), original.subheadline_tag())
    }
}

/// Interprets raw model text. Valid JSON that is not an object is an error.
pub fn parse_reply(text: &str, headline_tag: &str, subheadline_tag: &str) -> Result<Generation> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => {
            let field = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
            Ok(Generation::Parsed(GeneratedHeadline {
                headline: field("headline").unwrap_or_else(|| wrap(headline_tag, AI_HEADLINE)),
                subheadline: field("subheadline")
                    .unwrap_or_else(|| wrap(subheadline_tag, AI_SUBHEADLINE)),
            }))
        }
        Ok(other) => Err(AppError::Llm(format!(
            "Expected a JSON object from the model, got: {}",
            other
        ))),
        Err(_) => {
            tracing::debug!("Model reply is not JSON, scanning lines");
            Ok(Generation::Scanned(scan_lines(text, headline_tag, subheadline_tag)))
        }
    }
}

/// Picks headline and subheadline lines out of free text. The headline rule
/// is tested first, so a line mentioning both lands in the headline.
pub fn scan_lines(text: &str, headline_tag: &str, subheadline_tag: &str) -> GeneratedHeadline {
    let mut headline = wrap(headline_tag, AI_HEADLINE);
    let mut subheadline = wrap(subheadline_tag, AI_SUBHEADLINE);

    for line in text.split('\n') {
        let lower = line.to_lowercase();
        if lower.contains("headline") || lower.contains("title") {
            headline = wrap(headline_tag, line.trim());
        } else if lower.contains("subheadline") || lower.contains("subtitle") {
            subheadline = wrap(subheadline_tag, line.trim());
        }
    }

    GeneratedHeadline {
        headline,
        subheadline,
    }
}

/// Original fragments with the fixed headline substitution. The subheadline
/// comes back untouched.
pub fn fallback(original: &OriginalHeadline) -> GeneratedHeadline {
    GeneratedHeadline {
        headline: original
            .headline()
            .replace(FALLBACK_NEEDLE, FALLBACK_REPLACEMENT),
        subheadline: original.subheadline().to_string(),
    }
}
