use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::CliContext;
use crate::theme::Theme;

#[derive(Subcommand)]
pub enum ThemeCommands {
    #[command(about = "Show the stored theme")]
    Show,

    #[command(about = "Store a theme")]
    Set {
        #[arg(help = "light or dark")]
        theme: String,
    },

    #[command(about = "Switch between light and dark")]
    Toggle,
}

pub fn handle(cmd: ThemeCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let store = ctx.client.theme();

    let theme = match cmd {
        ThemeCommands::Show => store.theme(),
        ThemeCommands::Set { theme } => {
            let theme: Theme = theme.parse().map_err(anyhow::Error::msg)?;
            store.set_theme(theme)?;
            theme
        }
        ThemeCommands::Toggle => store.toggle()?,
    };

    output_success(&ctx.format, &format!("Theme: {}", theme), Some(json!({ "theme": theme.as_str() })))
}
