use serde_json::Value;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::{ApiClient, FileUpload};
use crate::models::Attachment;

#[derive(Debug, Clone)]
pub struct AttachmentsClient {
    api: ApiClient,
}

impl AttachmentsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_for_task(&self, task_id: i64) -> Result<Envelope<Vec<Attachment>>, ClientError> {
        self.api.get(&format!("/tasks/{}/attachments", task_id)).await
    }

    pub async fn upload(&self, task_id: i64, file: FileUpload) -> Result<Envelope<Attachment>, ClientError> {
        self.api
            .upload(&format!("/tasks/{}/attachments", task_id), file)
            .await
    }

    /// File contents; the download endpoint is not enveloped
    pub async fn download(&self, attachment_id: i64) -> Result<Vec<u8>, ClientError> {
        self.api
            .download(&format!("/attachments/{}/download", attachment_id))
            .await
    }

    pub async fn delete(&self, attachment_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/attachments/{}", attachment_id)).await
    }
}
