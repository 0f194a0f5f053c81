use async_trait::async_trait;

use crate::error::ClientError;
use crate::http::{OutgoingRequest, RequestSummary};
use crate::pipeline::{RequestStage, StageRing};

/// Request/failure logging
#[derive(Debug, Default)]
pub struct TraceStage;

#[async_trait]
impl RequestStage for TraceStage {
    fn name(&self) -> &'static str {
        "trace"
    }

    fn ring(&self) -> StageRing {
        StageRing::Preparation
    }

    async fn on_request(&self, request: &mut OutgoingRequest) -> Result<(), ClientError> {
        tracing::debug!("→ {} {}", request.method, request.url);
        Ok(())
    }

    async fn on_error(&self, request: &RequestSummary, error: &ClientError) {
        match error.status_code() {
            Some(status) if status >= 500 => tracing::error!("{} failed: {}", request, error),
            Some(_) => tracing::warn!("{} failed: {}", request, error),
            None => tracing::warn!("{} transport failure: {}", request, error),
        }
    }
}
