use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ActivityLog, Task};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(default)]
    pub total_projects: u64,
    #[serde(default)]
    pub total_tasks: u64,
    #[serde(default)]
    pub completed_tasks: u64,
    #[serde(default)]
    pub overdue_tasks: u64,
    #[serde(default)]
    pub in_progress_tasks: u64,
    #[serde(default)]
    pub tasks_by_status: HashMap<String, u64>,
    #[serde(default)]
    pub tasks_by_priority: HashMap<String, u64>,
    #[serde(default)]
    pub recent_activities: Vec<ActivityLog>,
    #[serde(default)]
    pub upcoming_deadlines: Option<Vec<Task>>,
    #[serde(default)]
    pub my_tasks: Option<Vec<Task>>,
}

impl Dashboard {
    /// Completed share of all tasks, 0.0 when there are none
    pub fn completion_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64
        }
    }
}
