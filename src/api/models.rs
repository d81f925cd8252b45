use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::prompt::OriginalHeadline;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

pub struct UploadedImage {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("image/"))
    }
}

/// Raw multipart fields of a generate request, before validation.
pub struct GenerateForm {
    pub image: UploadedImage,
    pub marketing_insights: String,
    pub original_headline: String,
}

/// A request that passed validation.
pub struct GenerateRequest {
    pub image: UploadedImage,
    pub insights: Vec<String>,
    pub original: OriginalHeadline,
}

impl TryFrom<GenerateForm> for GenerateRequest {
    type Error = AppError;

    fn try_from(form: GenerateForm) -> Result<Self> {
        if !form.image.is_image() {
            return Err(AppError::BadRequest("File must be an image".to_string()));
        }

        let insights = parse_json(&form.marketing_insights)?;
        let original = parse_json(&form.original_headline)?;

        Ok(GenerateRequest {
            image: form.image,
            insights: insights_from(insights)?,
            original: original_from(original)?,
        })
    }
}

fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON format: {}", e)))
}

fn insights_from(value: Value) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(AppError::BadRequest(
            "marketing_insights must be an array".to_string(),
        ));
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            _ => Err(AppError::BadRequest(
                "marketing_insights must be an array of strings".to_string(),
            )),
        })
        .collect()
}

fn original_from(value: Value) -> Result<OriginalHeadline> {
    let missing_keys = || {
        AppError::BadRequest(
            "original_headline must contain 'headline' and 'subheadline' keys".to_string(),
        )
    };

    let Value::Object(fields) = value else {
        return Err(missing_keys());
    };
    let headline = fields.get("headline").and_then(Value::as_str).ok_or_else(missing_keys)?;
    let subheadline = fields
        .get("subheadline")
        .and_then(Value::as_str)
        .ok_or_else(missing_keys)?;

    Ok(OriginalHeadline::new(headline, subheadline))
}
