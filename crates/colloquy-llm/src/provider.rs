use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{ChatCompletionRequest, Completion};

/// Completion endpoint reached without blocking the calling task.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion>;
}

/// Completion endpoint reached by blocking the calling thread.
pub trait BlockingCompletionBackend: Send + Sync {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<Completion>;
}
