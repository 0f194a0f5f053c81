use serde_json::Value;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{AddMemberRequest, Member, Project, ProjectRequest, ProjectRole};

#[derive(Debug, Clone)]
pub struct ProjectsClient {
    api: ApiClient,
}

impl ProjectsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Envelope<Vec<Project>>, ClientError> {
        self.api.get("/projects").await
    }

    pub async fn get(&self, id: i64) -> Result<Envelope<Project>, ClientError> {
        self.api.get(&format!("/projects/{}", id)).await
    }

    pub async fn create(&self, request: &ProjectRequest) -> Result<Envelope<Project>, ClientError> {
        self.api.post("/projects", request).await
    }

    pub async fn update(&self, id: i64, request: &ProjectRequest) -> Result<Envelope<Project>, ClientError> {
        self.api.put(&format!("/projects/{}", id), request).await
    }

    pub async fn delete(&self, id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api.delete(&format!("/projects/{}", id)).await
    }

    pub async fn members(&self, project_id: i64) -> Result<Envelope<Vec<Member>>, ClientError> {
        self.api.get(&format!("/projects/{}/members", project_id)).await
    }

    /// Add a member; `role` defaults to `MEMBER`
    pub async fn add_member(
        &self,
        project_id: i64,
        user_id: i64,
        role: Option<ProjectRole>,
    ) -> Result<Envelope<Member>, ClientError> {
        let request = AddMemberRequest {
            user_id,
            role: role.unwrap_or_default(),
        };
        self.api
            .post(&format!("/projects/{}/members", project_id), &request)
            .await
    }

    pub async fn remove_member(&self, project_id: i64, member_id: i64) -> Result<Envelope<Value>, ClientError> {
        self.api
            .delete(&format!("/projects/{}/members/{}", project_id, member_id))
            .await
    }
}
