pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::client::CirqueClient;
use crate::config::config;
use crate::navigation::{auth_guard, Route, Router};

#[derive(Parser)]
#[command(name = "cirque")]
#[command(about = "Cirque CLI - Command-line client for the CirqueTask API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out and account recovery")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Projects and their members")]
    Project {
        #[command(subcommand)]
        cmd: commands::project::ProjectCommands,
    },

    #[command(about = "Kanban boards")]
    Board {
        #[command(subcommand)]
        cmd: commands::board::BoardCommands,
    },

    #[command(about = "Tasks and comments")]
    Task {
        #[command(subcommand)]
        cmd: commands::task::TaskCommands,
    },

    #[command(about = "Notification inbox")]
    Notification {
        #[command(subcommand)]
        cmd: commands::notification::NotificationCommands,
    },

    #[command(about = "Subscription plan and checkout")]
    Billing {
        #[command(subcommand)]
        cmd: commands::billing::BillingCommands,
    },

    #[command(about = "Task statistics for the signed-in user or a project")]
    Dashboard {
        #[arg(long, help = "Project id (defaults to the personal dashboard)")]
        project: Option<i64>,
    },

    #[command(about = "Light/dark preference")]
    Theme {
        #[command(subcommand)]
        cmd: commands::theme::ThemeCommands,
    },

    #[command(about = "Stream live events of a board until interrupted")]
    Watch {
        #[arg(help = "Board id")]
        board_id: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Everything a command needs: the wired client and the router it navigates
pub struct CliContext {
    pub client: CirqueClient,
    pub router: Arc<Router>,
    pub format: OutputFormat,
}

impl CliContext {
    /// Route guard for commands that need a session
    pub fn require_session(&self) -> anyhow::Result<()> {
        if auth_guard(self.client.session().as_ref(), self.router.as_ref()) {
            Ok(())
        } else {
            anyhow::bail!("Not signed in. Run `cirque auth login <email>` first")
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let format = OutputFormat::from_cli(&cli);
    let router = Arc::new(Router::new(Route::Dashboard));
    let client = CirqueClient::new(config().clone(), router.clone(), Arc::new(utils::ConsoleNotifier))?;
    let ctx = CliContext { client, router, format };

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx).await,
        Commands::Project { cmd } => commands::project::handle(cmd, &ctx).await,
        Commands::Board { cmd } => commands::board::handle(cmd, &ctx).await,
        Commands::Task { cmd } => commands::task::handle(cmd, &ctx).await,
        Commands::Notification { cmd } => commands::notification::handle(cmd, &ctx).await,
        Commands::Billing { cmd } => commands::billing::handle(cmd, &ctx).await,
        Commands::Dashboard { project } => commands::dashboard::handle(project, &ctx).await,
        Commands::Theme { cmd } => commands::theme::handle(cmd, &ctx),
        Commands::Watch { board_id } => commands::watch::handle(board_id, &ctx).await,
    }
}
