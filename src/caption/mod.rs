//! Image captioning.
//!
//! Captioning never fails from the caller's point of view: any decode or
//! inference error yields [`Description::Placeholder`].

pub mod blip;
pub mod mock;

pub use blip::BlipCaptioner;
pub use mock::MockCaptioner;

use async_trait::async_trait;

pub const PLACEHOLDER_DESCRIPTION: &str =
    "A woman running, determined expression, text: 'First Marathon Journey Begins.'";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Description {
    Captioned(String),
    Placeholder,
}

impl Description {
    pub fn as_str(&self) -> &str {
        match self {
            Description::Captioned(text) => text,
            Description::Placeholder => PLACEHOLDER_DESCRIPTION,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Description::Placeholder)
    }
}

#[async_trait]
pub trait Captioner: Send + Sync {
    async fn caption(&self, image: &[u8]) -> Description;
}
