use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::Task;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: i64,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

impl Board {
    pub fn column(&self, column_id: i64) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn column_mut(&mut self, column_id: i64) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == column_id)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub wip_limit: i32,
    #[serde(default)]
    pub is_done_column: bool,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    /// WIP limit of 0 means unlimited
    pub fn over_wip_limit(&self) -> bool {
        self.wip_limit > 0 && self.tasks.len() as i32 > self.wip_limit
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
