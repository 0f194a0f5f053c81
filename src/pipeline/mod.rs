// Ordered request pipeline: every REST call passes through the registered stages

pub mod stages;
pub mod traits;

use std::collections::BTreeMap;
use std::time::Instant;
use tokio::time::timeout;

use crate::error::ClientError;
use crate::http::{OutgoingRequest, RequestSummary};

pub use stages::{AuthStage, ErrorStage, TraceStage};
pub use traits::{RequestStage, StageRing};

/// Stage registry keyed by ring; a `BTreeMap` keeps ring iteration ordered
#[derive(Default)]
pub struct RequestPipeline {
    stages: BTreeMap<StageRing, Vec<Box<dyn RequestStage>>>,
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_stage(&mut self, stage: Box<dyn RequestStage>) {
        let ring = stage.ring();
        let name = stage.name();
        let ring_stages = self.stages.entry(ring).or_default();
        ring_stages.push(stage);
        ring_stages.sort_by_key(|s| s.priority());

        tracing::debug!("Registered stage '{}' for ring {:?}", name, ring);
    }

    pub fn with_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.register_stage(Box::new(stage));
        self
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.ordered().map(|s| s.name()).collect()
    }

    fn ordered(&self) -> impl Iterator<Item = &dyn RequestStage> {
        self.stages.values().flatten().map(|s| &**s)
    }

    /// Run every stage's request hook in order. The first failing stage aborts the request.
    pub async fn prepare(&self, request: &mut OutgoingRequest) -> Result<(), ClientError> {
        for stage in self.ordered() {
            let started = Instant::now();
            match timeout(stage.timeout(), stage.on_request(request)).await {
                Ok(Ok(())) => {
                    tracing::debug!("Stage: {} prepared request in {:?}", stage.name(), started.elapsed());
                }
                Ok(Err(error)) => {
                    tracing::warn!("Stage: {} rejected request: {}", stage.name(), error);
                    return Err(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Stage: {} timed out after {:?}", stage.name(), stage.timeout());
                    return Err(ClientError::Timeout(stage.name().to_string()));
                }
            }
        }
        Ok(())
    }

    /// Let every stage observe a failed request, exactly once each
    pub async fn fail(&self, request: &RequestSummary, error: &ClientError) {
        for stage in self.ordered() {
            if timeout(stage.timeout(), stage.on_error(request, error))
                .await
                .is_err()
            {
                tracing::error!("Stage: {} timed out handling error", stage.name());
            }
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
