use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use headline_generator::{
    caption::BlipCaptioner,
    config::Config,
    generator::HeadlineGenerator,
    llm::OpenAiClient,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "headline_generator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; every request will return fallback copy");
    }

    let captioner = BlipCaptioner::shared(&config)?;
    let generator = HeadlineGenerator::new(Arc::new(OpenAiClient::from_config(&config)));

    let app_state = AppState {
        config: Arc::new(config),
        captioner,
        generator: Arc::new(generator),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
