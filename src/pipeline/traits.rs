use async_trait::async_trait;
use std::time::Duration;

use crate::error::ClientError;
use crate::http::{OutgoingRequest, RequestSummary};

/// Pipeline rings; stages run in ring order, then by priority within a ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StageRing {
    Preparation = 0, // Request logging, correlation
    Security = 2,    // Credentials
    Response = 7,    // Response inspection
    Notification = 9, // User-facing notices, redirects
}

/// A single step of the request pipeline.
///
/// `on_request` runs before dispatch and may mutate the request. `on_error`
/// observes a failed request once; it cannot swallow or replace the error.
#[async_trait]
pub trait RequestStage: Send + Sync {
    /// Stage name for logging and debugging
    fn name(&self) -> &'static str;

    fn ring(&self) -> StageRing;

    /// Priority within ring (lower numbers execute first)
    fn priority(&self) -> u8 {
        50
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn on_request(&self, _request: &mut OutgoingRequest) -> Result<(), ClientError> {
        Ok(())
    }

    async fn on_error(&self, _request: &RequestSummary, _error: &ClientError) {}
}
