use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use once_cell::sync::OnceCell;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Captioner, Description};
use crate::config::Config;
use crate::error::{AppError, Result};

pub const NUM_BEAMS: u32 = 5;
pub const MAX_LENGTH: u32 = 50;

// Process-wide captioner, initialised on first use.
static SHARED: OnceCell<Arc<BlipCaptioner>> = OnceCell::new();

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    generate_kwargs: GenerateKwargs,
}

#[derive(Serialize)]
struct GenerateKwargs {
    num_beams: u32,
    max_length: u32,
}

#[derive(Deserialize)]
struct CaptionCandidate {
    generated_text: String,
}

/// BLIP image captioning served by a Hugging Face style inference endpoint.
pub struct BlipCaptioner {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl BlipCaptioner {
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token,
        })
    }

    /// Returns the process-wide captioner, creating it on the first call.
    /// Later calls ignore `config` and hand back the same instance.
    pub fn shared(config: &Config) -> Result<Arc<BlipCaptioner>> {
        SHARED
            .get_or_try_init(|| {
                tracing::info!(endpoint = %config.caption_endpoint, "Initialising image captioner");
                BlipCaptioner::new(
                    config.caption_endpoint.clone(),
                    config.caption_api_token.clone(),
                )
                .map(Arc::new)
            })
            .cloned()
    }

    async fn try_caption(&self, image: &[u8]) -> Result<String> {
        let png = normalize(image.to_vec()).await?;

        let body = InferenceRequest {
            inputs: base64::engine::general_purpose::STANDARD.encode(png),
            parameters: InferenceParameters {
                generate_kwargs: GenerateKwargs {
                    num_beams: NUM_BEAMS,
                    max_length: MAX_LENGTH,
                },
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let res = request.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let error_text = res.text().await?;
            return Err(AppError::Caption(format!(
                "Inference error (status {}): {}",
                status, error_text
            )));
        }

        let candidates: Vec<CaptionCandidate> = res
            .json()
            .await
            .map_err(|e| AppError::Caption(format!("Invalid inference response: {}", e)))?;

        candidates
            .into_iter()
            .next()
            .map(|c| c.generated_text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| AppError::Caption("Inference returned an empty caption".to_string()))
    }
}

#[async_trait]
impl Captioner for BlipCaptioner {
    async fn caption(&self, image: &[u8]) -> Description {
        match self.try_caption(image).await {
            Ok(text) => {
                tracing::debug!(caption = %text, "Image captioned");
                Description::Captioned(text)
            }
            Err(e) => {
                tracing::warn!("Image analysis failed, using placeholder description: {}", e);
                Description::Placeholder
            }
        }
    }
}

/// Decodes any supported format and re-encodes it as an RGB PNG.
async fn normalize(bytes: Vec<u8>) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || encode_rgb_png(&bytes))
        .await
        .map_err(|e| AppError::Internal(format!("Image decode task join error: {}", e)))?
}

fn encode_rgb_png(bytes: &[u8]) -> Result<Vec<u8>> {
    let rgb = image::load_from_memory(bytes)?.to_rgb8();
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(rgb).write_to(&mut Cursor::new(&mut out), ImageFormat::Png)?;
    Ok(out)
}
