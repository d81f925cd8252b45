use super::{Captioner, Description};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub struct MockCaptioner {
    description: Description,
    call_count: Arc<Mutex<usize>>,
}

impl MockCaptioner {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            description: Description::Captioned(text.into()),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            description: Description::Placeholder,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl Captioner for MockCaptioner {
    async fn caption(&self, _image: &[u8]) -> Description {
        *self.call_count.lock().unwrap() += 1;
        self.description.clone()
    }
}
