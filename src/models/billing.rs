use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plan {
    Free,
    Pro,
    Business,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    Gantt,
    Reports,
    CustomFields,
    TimeLog,
    ApiAccess,
}

/// Paid plans that can be purchased through checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutPlan {
    Pro,
    Business,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDto {
    pub plan: Plan,
    #[serde(default)]
    pub subscription_status: Option<String>,
    #[serde(default)]
    pub current_period_end: Option<NaiveDateTime>,
    #[serde(default)]
    pub max_projects: i64,
    #[serde(default)]
    pub max_members_per_project: i64,
    #[serde(default)]
    pub current_project_count: i64,
    #[serde(default)]
    pub current_members_in_project: i64,
    #[serde(default)]
    pub enabled_features: Vec<Feature>,
}

impl PlanDto {
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.enabled_features.contains(&feature)
    }

    /// Negative limits mean unlimited
    pub fn can_create_project(&self) -> bool {
        self.max_projects < 0 || self.current_project_count < self.max_projects
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub plan: CheckoutPlan,
    pub yearly: bool,
}

/// Hosted checkout or billing portal URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUrl {
    pub url: String,
}
