use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{ActivityLog, Dashboard};

#[derive(Debug, Clone)]
pub struct DashboardClient {
    api: ApiClient,
}

impl DashboardClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn user_dashboard(&self) -> Result<Envelope<Dashboard>, ClientError> {
        self.api.get("/dashboard").await
    }

    pub async fn project_dashboard(&self, project_id: i64) -> Result<Envelope<Dashboard>, ClientError> {
        self.api.get(&format!("/dashboard/projects/{}", project_id)).await
    }

    pub async fn project_activities(&self, project_id: i64) -> Result<Envelope<Vec<ActivityLog>>, ClientError> {
        self.api
            .get(&format!("/dashboard/projects/{}/activities", project_id))
            .await
    }

    pub async fn user_activities(&self) -> Result<Envelope<Vec<ActivityLog>>, ClientError> {
        self.api.get("/dashboard/activities").await
    }
}
