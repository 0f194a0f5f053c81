use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    pub file_name: String,
    pub file_size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub uploaded_by: Option<User>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}
