use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ClientError;
use crate::http::OutgoingRequest;
use crate::pipeline::{RequestStage, StageRing};
use crate::session::SessionStore;

/// Attaches `Authorization: Bearer <token>` when the session holds an access token
pub struct AuthStage {
    session: Arc<SessionStore>,
}

impl AuthStage {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl RequestStage for AuthStage {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn ring(&self) -> StageRing {
        StageRing::Security
    }

    async fn on_request(&self, request: &mut OutgoingRequest) -> Result<(), ClientError> {
        // No refresh-on-401 here; an expired token surfaces as a failed request
        if let Some(token) = self.session.get_token() {
            request.set_header("Authorization", format!("Bearer {}", token));
        }
        Ok(())
    }
}
