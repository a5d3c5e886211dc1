use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::{Builder, Runtime};

use super::errors::ServiceError;
use super::traits::Generator;
use super::types::{GenerationOutput, GenerationRequest};

/// Generation backend that is naturally asynchronous (HTTP inference servers,
/// engines running on their own task pool).
#[async_trait]
pub trait AsyncGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError>;
}

/// Drives an [`AsyncGenerator`] to completion on a private current-thread runtime so
/// it can be used where a synchronous [`Generator`] is expected.
///
/// This is the place to put a deadline on generation: the environment itself never
/// times out. Must not be called from inside another tokio runtime.
pub struct BlockingGenerator<G> {
    inner: G,
    runtime: Runtime,
    timeout: Option<Duration>,
}

impl<G: AsyncGenerator> BlockingGenerator<G> {
    pub fn new(inner: G) -> Result<Self, ServiceError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ServiceError::Other(Box::new(e)))?;
        Ok(Self {
            inner,
            runtime,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G: AsyncGenerator> Generator for BlockingGenerator<G> {
    fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, ServiceError> {
        self.runtime.block_on(async {
            match self.timeout {
                Some(limit) => match tokio::time::timeout(limit, self.inner.generate(request)).await
                {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!(?limit, "generation timed out");
                        Err(ServiceError::Timeout {
                            millis: saturating_millis(limit),
                        })
                    }
                },
                None => self.inner.generate(request).await,
            }
        })
    }
}

fn saturating_millis(limit: Duration) -> u64 {
    u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)
}
