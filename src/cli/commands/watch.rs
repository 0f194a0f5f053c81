use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

use crate::cli::commands::board::print_board;
use crate::cli::utils::output_data;
use crate::cli::{CliContext, OutputFormat};
use crate::realtime::BoardEvent;

const CONNECT_WAIT: Duration = Duration::from_secs(10);

/// Follow a board until Ctrl-C. Reconnects are handled by the channel.
pub async fn handle(board_id: i64, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;
    let realtime = ctx.client.realtime();

    let mut events = realtime.events();
    let mut state = realtime.watch_state();
    realtime.connect();
    realtime.wait_connected(CONNECT_WAIT).await?;

    let mut kanban = ctx.client.kanban(board_id);
    kanban.open().await?;
    if let (OutputFormat::Text, Some(board)) = (format, kanban.board()) {
        print_board(board);
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *state.borrow_and_update();
                tracing::info!("Realtime connection {}", current);
                eprintln!("~ {}", current);
            }
            received = events.recv() => match received {
                Ok(event) => {
                    print_event(format, &event)?;
                    if kanban.apply_event(&event).await? {
                        if let (OutputFormat::Text, Some(board)) = (format, kanban.board()) {
                            print_board(board);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Dropped {} board events, reloading", skipped);
                    kanban.load().await?;
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    kanban.close();
    realtime.disconnect().await;
    Ok(())
}

fn print_event(format: &OutputFormat, event: &BoardEvent) -> anyhow::Result<()> {
    let line = json!({ "boardId": event.board_id, "type": event.kind, "data": event.data });
    output_data(format, &line, |_| match event.task_id() {
        Some(task_id) => println!("\n>> {:?} task {}", event.kind, task_id),
        None => println!("\n>> {:?}", event.kind),
    })
}
