use serde_json::Value;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{Label, LabelRequest};

#[derive(Debug, Clone)]
pub struct LabelsClient {
    api: ApiClient,
}

impl LabelsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_for_project(&self, project_id: i64) -> Result<Envelope<Vec<Label>>, ClientError> {
        self.api.get(&format!("/projects/{}/labels", project_id)).await
    }

    pub async fn create(&self, project_id: i64, request: &LabelRequest) -> Result<Envelope<Label>, ClientError> {
        self.api
            .post(&format!("/projects/{}/labels", project_id), request)
            .await
    }

    pub async fn update(&self, label_id: i64, request: &LabelRequest) -> Result<Envelope<Label>, ClientError> {
        self.api.put(&format!("/labels/{}", label_id), request).await
    }

    pub async fn delete(&self, label_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/labels/{}", label_id)).await
    }
}
