pub mod api;
pub mod caption;
pub mod config;
pub mod error;
pub mod generator;
pub mod llm;
pub mod markup;
pub mod prompt;

use std::sync::Arc;
use caption::Captioner;
use config::Config;
use generator::HeadlineGenerator;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub captioner: Arc<dyn Captioner>,
    pub generator: Arc<HeadlineGenerator>,
}
