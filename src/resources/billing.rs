use crate::api::Envelope;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::models::{CheckoutPlan, CheckoutRequest, PlanDto, SessionUrl};

#[derive(Debug, Clone)]
pub struct BillingClient {
    api: ApiClient,
}

impl BillingClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn plan(&self) -> Result<Envelope<PlanDto>, ClientError> {
        self.api.get("/billing/plan").await
    }

    pub async fn checkout_session(&self, plan: CheckoutPlan, yearly: bool) -> Result<Envelope<SessionUrl>, ClientError> {
        self.api
            .post("/billing/checkout-session", &CheckoutRequest { plan, yearly })
            .await
    }

    pub async fn portal_session(&self) -> Result<Envelope<SessionUrl>, ClientError> {
        self.api.get("/billing/portal-session").await
    }
}
