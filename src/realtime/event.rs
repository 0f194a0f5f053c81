use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardEventType {
    TaskMoved,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
}

/// Server-pushed change on a board topic: `{ "type": ..., "data": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardEvent {
    #[serde(rename = "type")]
    pub kind: BoardEventType,
    /// Opaque payload; a task for created/updated, a move or id map otherwise
    #[serde(default)]
    pub data: Value,
    /// Board whose topic delivered the event
    #[serde(skip)]
    pub board_id: i64,
}

impl BoardEvent {
    pub fn task_id(&self) -> Option<i64> {
        self.data
            .get("taskId")
            .or_else(|| self.data.get("id"))
            .and_then(Value::as_i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_event_from_wire() {
        let event: BoardEvent =
            serde_json::from_str(r#"{"type":"TASK_DELETED","data":{"taskId":42}}"#).unwrap();
        assert_eq!(event.kind, BoardEventType::TaskDeleted);
        assert_eq!(event.task_id(), Some(42));
        assert_eq!(event.board_id, 0);

        assert!(serde_json::from_str::<BoardEvent>(r#"{"type":"BOARD_RENAMED","data":{}}"#).is_err());
    }
}
