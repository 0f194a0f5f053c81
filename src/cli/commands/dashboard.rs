use crate::cli::utils::{expect_data, output_data};
use crate::cli::CliContext;
use crate::models::Dashboard;

pub async fn handle(project: Option<i64>, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let dashboard = ctx.client.dashboard();

    let stats = match project {
        Some(project_id) => expect_data(dashboard.project_dashboard(project_id).await?)?,
        None => expect_data(dashboard.user_dashboard().await?)?,
    };

    output_data(&ctx.format, &stats, print_dashboard)
}

fn print_dashboard(d: &Dashboard) {
    println!("Projects:     {}", d.total_projects);
    println!("Tasks:        {}", d.total_tasks);
    println!("In progress:  {}", d.in_progress_tasks);
    println!("Completed:    {} ({:.0}%)", d.completed_tasks, d.completion_rate() * 100.0);
    println!("Overdue:      {}", d.overdue_tasks);

    if !d.tasks_by_status.is_empty() {
        let mut by_status: Vec<_> = d.tasks_by_status.iter().collect();
        by_status.sort();
        println!("\nBy status:");
        for (status, count) in by_status {
            println!("  {:<12} {}", status, count);
        }
    }

    if let Some(deadlines) = d.upcoming_deadlines.as_ref().filter(|t| !t.is_empty()) {
        println!("\nUpcoming deadlines:");
        for task in deadlines {
            let due = task.due_date.map(|d| d.to_string()).unwrap_or_default();
            println!("  {:<10} {:<10} {}", due, task.task_key, task.title);
        }
    }
}
