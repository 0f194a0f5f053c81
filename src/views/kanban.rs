use serde_json::json;
use std::sync::Arc;

use crate::api::ApiOutcome;
use crate::error::ClientError;
use crate::models::{Board, TaskMoveRequest};
use crate::realtime::{BoardEvent, RealtimeChannel};
use crate::resources::{BoardsClient, TasksClient};

/// Live kanban board: local optimistic moves, server reload on conflict or remote change
pub struct KanbanBoard {
    board_id: i64,
    boards: BoardsClient,
    tasks: TasksClient,
    realtime: Arc<RealtimeChannel>,
    board: Option<Board>,
}

impl KanbanBoard {
    pub fn new(board_id: i64, boards: BoardsClient, tasks: TasksClient, realtime: Arc<RealtimeChannel>) -> Self {
        Self {
            board_id,
            boards,
            tasks,
            realtime,
            board: None,
        }
    }

    pub fn board_id(&self) -> i64 {
        self.board_id
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    /// Fetch the board; an unsuccessful envelope keeps the current copy
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let envelope = self.boards.get(self.board_id).await?;
        if let ApiOutcome::Ok(board) = envelope.outcome {
            self.board = Some(board);
        }
        Ok(())
    }

    pub async fn open(&mut self) -> Result<(), ClientError> {
        self.load().await?;
        self.realtime.subscribe_to_board(self.board_id);
        Ok(())
    }

    pub fn close(&self) {
        self.realtime.unsubscribe_from_board(self.board_id);
    }

    /// Move a task locally, then persist. A rejected move reloads the board.
    pub async fn move_task(&mut self, task_id: i64, column_id: i64, index: usize) -> Result<(), ClientError> {
        let board = self
            .board
            .as_mut()
            .ok_or_else(|| ClientError::invalid_input("board is not loaded"))?;
        let position = splice_task(board, task_id, column_id, index).ok_or_else(|| {
            ClientError::invalid_input(format!(
                "task {} or column {} is not on board {}",
                task_id, column_id, self.board_id
            ))
        })?;

        let request = TaskMoveRequest {
            column_id,
            position: position as i32,
        };

        let result = self
            .tasks
            .move_task(task_id, &request)
            .await
            .and_then(|envelope| envelope.into_result());

        match result {
            Ok(_) => {
                self.realtime.send_task_moved(
                    self.board_id,
                    &json!({ "taskId": task_id, "columnId": column_id, "position": request.position }),
                );
                Ok(())
            }
            Err(error) => {
                tracing::warn!("Move of task {} failed, reloading board: {}", task_id, error);
                if let Err(reload) = self.load().await {
                    tracing::warn!("Board {} reload failed: {}", self.board_id, reload);
                }
                Err(error)
            }
        }
    }

    /// Reload when the event concerns this board. Returns whether it did.
    pub async fn apply_event(&mut self, event: &BoardEvent) -> Result<bool, ClientError> {
        if event.board_id != self.board_id {
            return Ok(false);
        }
        self.load().await?;
        Ok(true)
    }
}

/// Move `task_id` to `column_id` at `index` (clamped), renumbering positions
/// of the touched columns. Returns the final index, or `None` when the task or
/// column is not on the board (the board is left untouched).
pub fn splice_task(board: &mut Board, task_id: i64, column_id: i64, index: usize) -> Option<usize> {
    board.column(column_id)?;

    let (source, from) = board.columns.iter().enumerate().find_map(|(ci, column)| {
        column
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .map(|ti| (ci, ti))
    })?;
    let target = board.columns.iter().position(|c| c.id == column_id)?;

    let mut task = board.columns[source].tasks.remove(from);
    task.column_id = Some(column_id);

    let tasks = &mut board.columns[target].tasks;
    let index = index.min(tasks.len());
    tasks.insert(index, task);

    for ci in [source, target] {
        for (position, task) in board.columns[ci].tasks.iter_mut().enumerate() {
            task.position = position as i32;
        }
    }

    Some(index)
}
