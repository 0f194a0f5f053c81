use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::User;

#[derive(Debug, Clone)]
pub struct UsersClient {
    api: ApiClient,
}

impl UsersClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn search(&self, email: &str) -> Result<Envelope<Vec<User>>, ClientError> {
        self.api
            .get_with_query("/users/search", vec![("email".to_string(), email.to_string())])
            .await
    }
}
