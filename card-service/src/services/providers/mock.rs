//! Mock provider implementation for testing.

use super::{ProviderError, VisionProvider};
use crate::services::upload::UploadedImage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

enum MockReply {
    Text(String),
    Error(fn() -> ProviderError),
}

/// Mock vision provider that answers every call the same way and counts
/// how often it was invoked.
pub struct MockVisionProvider {
    reply: MockReply,
    calls: AtomicUsize,
}

impl MockVisionProvider {
    /// Reply with the given raw model text.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Text(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fail every call with the error produced by `error`.
    pub fn failing(error: fn() -> ProviderError) -> Self {
        Self {
            reply: MockReply::Error(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `extract` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionProvider for MockVisionProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn extract(
        &self,
        _prompt: &str,
        _image: &UploadedImage,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::Error(error) => Err(error()),
        }
    }
}
