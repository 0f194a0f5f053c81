use serde_json::Value;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{Comment, CommentRequest, Task, TaskMoveRequest, TaskQuery, TaskRequest};

#[derive(Debug, Clone)]
pub struct TasksClient {
    api: ApiClient,
}

impl TasksClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, project_id: i64, request: &TaskRequest) -> Result<Envelope<Task>, ClientError> {
        self.api
            .post(&format!("/projects/{}/tasks", project_id), request)
            .await
    }

    pub async fn get(&self, task_id: i64) -> Result<Envelope<Task>, ClientError> {
        self.api.get(&format!("/tasks/{}", task_id)).await
    }

    pub async fn list_for_project(&self, project_id: i64, query: &TaskQuery) -> Result<Envelope<Vec<Task>>, ClientError> {
        self.api
            .get_with_query(&format!("/projects/{}/tasks", project_id), query.to_pairs())
            .await
    }

    /// Tasks assigned to the signed-in user
    pub async fn my_tasks(&self) -> Result<Envelope<Vec<Task>>, ClientError> {
        self.api.get("/tasks/my").await
    }

    pub async fn update(&self, task_id: i64, request: &TaskRequest) -> Result<Envelope<Task>, ClientError> {
        self.api.put(&format!("/tasks/{}", task_id), request).await
    }

    pub async fn move_task(&self, task_id: i64, request: &TaskMoveRequest) -> Result<Envelope<Task>, ClientError> {
        self.api
            .patch(&format!("/tasks/{}/move", task_id), request)
            .await
    }

    pub async fn delete(&self, task_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/tasks/{}", task_id)).await
    }

    pub async fn assign(&self, task_id: i64, user_id: i64) -> Result<Envelope<Task>, ClientError> {
        self.api
            .post_empty(&format!("/tasks/{}/assign/{}", task_id, user_id))
            .await
    }

    pub async fn unassign(&self, task_id: i64, user_id: i64) -> Result<Envelope<Task>, ClientError> {
        self.api
            .delete(&format!("/tasks/{}/assign/{}", task_id, user_id))
            .await
    }

    pub async fn comments(&self, task_id: i64) -> Result<Envelope<Vec<Comment>>, ClientError> {
        self.api.get(&format!("/tasks/{}/comments", task_id)).await
    }

    pub async fn add_comment(&self, task_id: i64, request: &CommentRequest) -> Result<Envelope<Comment>, ClientError> {
        self.api
            .post(&format!("/tasks/{}/comments", task_id), request)
            .await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/comments/{}", comment_id)).await
    }

    pub async fn add_label(&self, task_id: i64, label_id: i64) -> Result<Envelope<Task>, ClientError> {
        self.api
            .post_empty(&format!("/tasks/{}/labels/{}", task_id, label_id))
            .await
    }

    pub async fn remove_label(&self, task_id: i64, label_id: i64) -> Result<Envelope<Task>, ClientError> {
        self.api
            .delete(&format!("/tasks/{}/labels/{}", task_id, label_id))
            .await
    }
}
