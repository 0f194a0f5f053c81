use clap::Subcommand;
use serde_json::json;
use std::time::Duration;

use crate::cli::utils::{expect_data, output_data, output_empty_collection, output_success};
use crate::cli::CliContext;
use crate::models::Board;

const CONNECT_WAIT: Duration = Duration::from_secs(5);

#[derive(Subcommand)]
pub enum BoardCommands {
    #[command(about = "List boards of a project")]
    List {
        #[arg(help = "Project id")]
        project_id: i64,
    },

    #[command(about = "Show a board with its columns and tasks")]
    Show {
        #[arg(help = "Board id")]
        board_id: i64,
    },

    #[command(about = "Move a task to a column position and announce it to watchers")]
    MoveTask {
        #[arg(help = "Board id")]
        board_id: i64,
        #[arg(help = "Task id")]
        task_id: i64,
        #[arg(long, help = "Target column id")]
        column: i64,
        #[arg(long, default_value_t = 0, help = "Target index within the column")]
        position: usize,
    },
}

pub async fn handle(cmd: BoardCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;

    match cmd {
        BoardCommands::List { project_id } => {
            let boards = expect_data(ctx.client.boards().list_for_project(project_id).await?)?;
            if boards.is_empty() {
                return output_empty_collection(format, "boards", "No boards");
            }
            output_data(format, &boards, |boards| {
                for b in boards {
                    let default = if b.is_default { " (default)" } else { "" };
                    println!("{:>5}  {}{}", b.id, b.name, default);
                }
            })
        }
        BoardCommands::Show { board_id } => {
            let board = expect_data(ctx.client.boards().get(board_id).await?)?;
            output_data(format, &board, print_board)
        }
        BoardCommands::MoveTask {
            board_id,
            task_id,
            column,
            position,
        } => {
            // Announcing the move needs a live connection; the move itself does not
            let realtime = ctx.client.realtime();
            realtime.connect();
            if let Err(e) = realtime.wait_connected(CONNECT_WAIT).await {
                tracing::warn!("Realtime unavailable, move will not be broadcast: {}", e);
            }

            let mut kanban = ctx.client.kanban(board_id);
            kanban.load().await?;
            let result = kanban.move_task(task_id, column, position).await;
            realtime.disconnect().await;
            result?;

            output_success(
                format,
                &format!("Moved task {} to column {} at {}", task_id, column, position),
                Some(json!({ "taskId": task_id, "columnId": column, "position": position })),
            )
        }
    }
}

pub fn print_board(board: &Board) {
    println!("{} (board {})", board.name, board.id);
    for column in &board.columns {
        let limit = if column.wip_limit > 0 {
            format!(" [{}/{}]", column.tasks.len(), column.wip_limit)
        } else {
            String::new()
        };
        let warn = if column.over_wip_limit() { " !" } else { "" };
        println!("\n== {} (column {}){}{}", column.name, column.id, limit, warn);
        for task in &column.tasks {
            println!("  {:>3}. {:<10} {}", task.position, task.task_key, task.title);
        }
    }
}
