use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::llm_client::ModelGateway;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model boundary. `GeminiClient` in production, a stub in tests.
    pub gateway: Arc<dyn ModelGateway>,
    /// One permit per analysis allowed to run at once; requests that find none are rejected.
    pub in_flight: Arc<Semaphore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        max_concurrent_analyses: usize,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            gateway,
            in_flight: Arc::new(Semaphore::new(max_concurrent_analyses)),
            max_upload_bytes,
        }
    }
}
