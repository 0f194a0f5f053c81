use serde_json::Value;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{Board, BoardRequest, ColumnRequest};

#[derive(Debug, Clone)]
pub struct BoardsClient {
    api: ApiClient,
}

impl BoardsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_for_project(&self, project_id: i64) -> Result<Envelope<Vec<Board>>, ClientError> {
        self.api.get(&format!("/projects/{}/boards", project_id)).await
    }

    /// Board with its columns and their tasks
    pub async fn get(&self, board_id: i64) -> Result<Envelope<Board>, ClientError> {
        self.api.get(&format!("/boards/{}", board_id)).await
    }

    pub async fn create(&self, project_id: i64, request: &BoardRequest) -> Result<Envelope<Board>, ClientError> {
        self.api
            .post(&format!("/projects/{}/boards", project_id), request)
            .await
    }

    /// Answers with the whole board, new column included
    pub async fn add_column(&self, board_id: i64, request: &ColumnRequest) -> Result<Envelope<Board>, ClientError> {
        self.api
            .post(&format!("/boards/{}/columns", board_id), request)
            .await
    }

    pub async fn remove_column(&self, column_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/columns/{}", column_id)).await
    }

    /// New column order, as column ids left to right
    pub async fn reorder_columns(&self, board_id: i64, column_ids: &[i64]) -> Result<Envelope<Value>, ClientError> {
        self.api
            .put(&format!("/boards/{}/columns/reorder", board_id), column_ids)
            .await
    }
}
