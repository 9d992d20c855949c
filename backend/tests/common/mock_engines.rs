use std::sync::atomic::{AtomicUsize, Ordering};

use backend::engine::{AuthEngine, EngineError, EngineRequest, EngineResponse};

/// Fails every request with the given error
pub struct FailingEngine(pub fn() -> EngineError);

#[async_trait::async_trait]
impl AuthEngine for FailingEngine {
    async fn handle(&self, _request: EngineRequest) -> Result<EngineResponse, EngineError> {
        Err((self.0)())
    }
}

/// Panics on every request, optionally with a non-string payload
pub struct PanickingEngine {
    pub message: Option<&'static str>,
}

#[async_trait::async_trait]
impl AuthEngine for PanickingEngine {
    async fn handle(&self, _request: EngineRequest) -> Result<EngineResponse, EngineError> {
        match self.message {
            Some(message) => panic!("{message}"),
            None => std::panic::panic_any(42_u32),
        }
    }
}

/// Answers with a fixed response and counts how often it was asked
pub struct StaticEngine {
    pub response: EngineResponse,
    pub calls: AtomicUsize,
}

impl StaticEngine {
    pub fn new(response: EngineResponse) -> Self {
        Self {
            response,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthEngine for StaticEngine {
    async fn handle(&self, _request: EngineRequest) -> Result<EngineResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}
