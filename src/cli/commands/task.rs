use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{expect_data, output_data, output_empty_collection, output_success};
use crate::cli::CliContext;
use crate::models::{CommentRequest, Task};

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "Tasks assigned to you")]
    Mine,

    #[command(about = "Show one task with its comments")]
    Show {
        #[arg(help = "Task id")]
        id: i64,
    },

    #[command(about = "Add a comment to a task")]
    Comment {
        #[arg(help = "Task id")]
        id: i64,
        #[arg(help = "Comment text")]
        content: String,
    },
}

pub async fn handle(cmd: TaskCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;
    let tasks = ctx.client.tasks();

    match cmd {
        TaskCommands::Mine => {
            let mine = expect_data(tasks.my_tasks().await?)?;
            if mine.is_empty() {
                return output_empty_collection(format, "tasks", "No tasks assigned to you");
            }
            output_data(format, &mine, |mine| {
                for task in mine {
                    print_task_line(task);
                }
            })
        }
        TaskCommands::Show { id } => {
            let task = expect_data(tasks.get(id).await?)?;
            let comments = expect_data(tasks.comments(id).await?)?;
            let body = json!({ "task": task, "comments": comments });
            output_data(format, &body, |_| {
                print_task_line(&task);
                if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
                    println!("\n{}", description);
                }
                if let Some(due) = task.due_date {
                    println!("Due: {}", due);
                }
                for c in &comments {
                    let author = c.author.as_ref().map(|a| a.full_name()).unwrap_or_default();
                    println!("\n  {}: {}", author, c.content);
                }
            })
        }
        TaskCommands::Comment { id, content } => {
            let request = CommentRequest {
                content,
                parent_comment_id: None,
            };
            let comment = expect_data(tasks.add_comment(id, &request).await?)?;
            output_success(
                format,
                &format!("Comment {} added to task {}", comment.id, id),
                Some(json!({ "comment": comment })),
            )
        }
    }
}

fn print_task_line(task: &Task) {
    println!(
        "{:<10} {:<12} {:<9} {}",
        task.task_key,
        task.status.as_str(),
        task.priority.as_str(),
        task.title
    );
}
