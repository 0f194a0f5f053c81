use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    pub action: String,
    pub entity_type: String,
    #[serde(default)]
    pub entity_id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
