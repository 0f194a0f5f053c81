use clap::Subcommand;

use crate::cli::utils::{expect_data, output_data, output_empty_collection};
use crate::cli::CliContext;

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects you belong to")]
    List,

    #[command(about = "Show one project")]
    Show {
        #[arg(help = "Project id")]
        id: i64,
    },

    #[command(about = "List project members")]
    Members {
        #[arg(help = "Project id")]
        id: i64,
    },
}

pub async fn handle(cmd: ProjectCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;
    let projects = ctx.client.projects();

    match cmd {
        ProjectCommands::List => {
            let list = expect_data(projects.list().await?)?;
            if list.is_empty() {
                return output_empty_collection(format, "projects", "No projects");
            }
            output_data(format, &list, |list| {
                for p in list {
                    println!("{:>5}  {:<8} {}", p.id, p.prefix, p.name);
                }
            })
        }
        ProjectCommands::Show { id } => {
            let project = expect_data(projects.get(id).await?)?;
            output_data(format, &project, |p| {
                println!("{} ({})", p.name, p.prefix);
                if let Some(description) = p.description.as_deref().filter(|d| !d.is_empty()) {
                    println!("Description: {}", description);
                }
            })
        }
        ProjectCommands::Members { id } => {
            let members = expect_data(projects.members(id).await?)?;
            output_data(format, &members, |members| {
                for m in members {
                    println!("{:<10} {} {} <{}>", format!("{:?}", m.role), m.first_name, m.last_name, m.email);
                }
            })
        }
    }
}
