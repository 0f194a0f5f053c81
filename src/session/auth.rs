use serde_json::Value;
use std::sync::Arc;

use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::auth::{ForgotPasswordRequest, RefreshRequest, ResetPasswordRequest};
use crate::models::{AuthRequest, AuthResponse, ProfileUpdate, RegisterRequest, User};
use crate::session::SessionStore;

/// Authentication endpoints. Successful token responses are stored in the session.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl AuthClient {
    pub fn new(api: ApiClient, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn login(&self, request: &AuthRequest) -> Result<Envelope<AuthResponse>, ClientError> {
        let envelope = self.api.post("/auth/login", request).await?;
        self.store_if_success(&envelope)?;
        Ok(envelope)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Envelope<AuthResponse>, ClientError> {
        let envelope = self.api.post("/auth/register", request).await?;
        self.store_if_success(&envelope)?;
        Ok(envelope)
    }

    /// Exchange the stored refresh token for a new pair
    pub async fn refresh_token(&self) -> Result<Envelope<AuthResponse>, ClientError> {
        let refresh_token = self
            .session
            .get_refresh_token()
            .ok_or_else(|| ClientError::unauthenticated("no refresh token stored"))?;

        let envelope = self
            .api
            .post("/auth/refresh", &RefreshRequest { refresh_token })
            .await?;
        self.store_if_success(&envelope)?;
        Ok(envelope)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<Envelope<Value>, ClientError> {
        self.api
            .post(
                "/auth/forgot-password",
                &ForgotPasswordRequest {
                    email: email.to_string(),
                },
            )
            .await
    }

    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<Envelope<Value>, ClientError> {
        self.api
            .post(
                "/auth/reset-password",
                &ResetPasswordRequest {
                    token: token.to_string(),
                    new_password: new_password.to_string(),
                },
            )
            .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Envelope<User>, ClientError> {
        let envelope: Envelope<User> = self.api.put("/users/me", update).await?;
        if let Some(user) = envelope.data() {
            self.session.update_current_user(user.clone())?;
        }
        Ok(envelope)
    }

    pub fn logout(&self) {
        self.session.logout();
    }

    fn store_if_success(&self, envelope: &Envelope<AuthResponse>) -> Result<(), ClientError> {
        if let Some(auth) = envelope.data() {
            self.session.store_auth(auth)?;
        }
        Ok(())
    }
}
