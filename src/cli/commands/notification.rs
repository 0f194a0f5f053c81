use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{expect_data, output_data, output_empty_collection, output_success};
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum NotificationCommands {
    #[command(about = "List notifications, newest first")]
    List {
        #[arg(long, help = "Page number (0-based)")]
        page: Option<u32>,
        #[arg(long, help = "Page size")]
        size: Option<u32>,
    },

    #[command(about = "Show the unread count")]
    Unread,

    #[command(about = "Mark one notification as read")]
    Read {
        #[arg(help = "Notification id")]
        id: i64,
    },

    #[command(about = "Mark every notification as read")]
    ReadAll,
}

pub async fn handle(cmd: NotificationCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;
    let notifications = ctx.client.notifications();

    match cmd {
        NotificationCommands::List { page, size } => {
            let list = expect_data(notifications.list(page, size).await?)?;
            if list.is_empty() {
                return output_empty_collection(format, "notifications", "No notifications");
            }
            output_data(format, &list, |list| {
                for n in list {
                    let marker = if n.is_read { ' ' } else { '*' };
                    println!("{} {:>5}  {}: {}", marker, n.id, n.title, n.message);
                }
            })
        }
        NotificationCommands::Unread => {
            let count = expect_data(notifications.unread_count().await?)?;
            output_data(format, &count, |c| println!("{} unread", c.count))
        }
        NotificationCommands::Read { id } => {
            expect_data(notifications.mark_as_read(id).await?)?;
            output_success(format, &format!("Notification {} marked as read", id), None)
        }
        NotificationCommands::ReadAll => {
            expect_data(notifications.mark_all_as_read().await?)?;
            output_success(
                format,
                "All notifications marked as read",
                Some(json!({ "unread": notifications.unread().get() })),
            )
        }
    }
}
