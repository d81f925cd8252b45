use axum::{
    routing::{get, post},
    Router,
    extract::{DefaultBodyLimit, Json, Multipart, State},
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use std::time::Instant;

use crate::error::{Result, AppError};
use crate::api::models::{GenerateForm, GenerateRequest, RootResponse, UploadedImage};
use crate::generator::{GeneratedHeadline, Generation};
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/", get(root_handler))
        .route("/generate-headline", post(generate_headline_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root_handler() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Optimeleon Headline Generator API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn generate_headline_handler(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<GeneratedHeadline>> {
    let multipart = multipart.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let start_time = Instant::now();

    let result = tokio::time::timeout(
        state.config.request_timeout,
        process_generate_request(&state, multipart),
    )
    .await;

    tracing::info!("Request processing took: {:?}", start_time.elapsed());

    match result {
        Ok(result) => result.map(Json),
        Err(_) => {
            tracing::warn!("Request timed out after {:?}", state.config.request_timeout);
            Err(AppError::Timeout)
        }
    }
}

async fn process_generate_request(
    state: &AppState,
    multipart: Multipart,
) -> Result<GeneratedHeadline> {
    let request = GenerateRequest::try_from(read_form(multipart).await?)?;

    tracing::info!(
        "Analyzing image: {}",
        request.image.file_name.as_deref().unwrap_or("<unnamed>")
    );
    let description = state.captioner.caption(&request.image.bytes).await;
    if description.is_placeholder() {
        tracing::warn!("Using placeholder image description");
    }

    tracing::info!("Generating headline and subheadline");
    let generation = state
        .generator
        .generate(description.as_str(), &request.insights, &request.original)
        .await;

    match &generation {
        Generation::Parsed(_) => tracing::info!("Successfully generated headline and subheadline"),
        Generation::Scanned(_) => tracing::warn!("Model reply was not JSON; scanned lines instead"),
        Generation::Fallback(_) => tracing::warn!("Returning fallback headline and subheadline"),
    }

    Ok(generation.into_headline())
}

async fn read_form(mut multipart: Multipart) -> Result<GenerateForm> {
    let mut image = None;
    let mut marketing_insights = None;
    let mut original_headline = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        let read_error = |e| multipart_error("Failed to read field", e);

        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(read_error)?.to_vec();
                image = Some(UploadedImage {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("marketing_insights") => {
                marketing_insights = Some(field.text().await.map_err(read_error)?);
            }
            Some("original_headline") => {
                original_headline = Some(field.text().await.map_err(read_error)?);
            }
            _ => {}
        }
    }

    Ok(GenerateForm {
        image: image.ok_or_else(|| missing_field("image"))?,
        marketing_insights: marketing_insights.ok_or_else(|| missing_field("marketing_insights"))?,
        original_headline: original_headline.ok_or_else(|| missing_field("original_headline"))?,
    })
}

// Body-limit overruns surface here as 413.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    let message = format!("{}: {}", context, e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

fn missing_field(name: &str) -> AppError {
    AppError::Unprocessable(format!("Missing field: {}", name))
}
