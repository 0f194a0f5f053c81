use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{expect_data, output_data, output_success};
use crate::cli::CliContext;
use crate::models::CheckoutPlan;

#[derive(Subcommand)]
pub enum BillingCommands {
    #[command(about = "Show the current plan and its limits")]
    Plan,

    #[command(about = "Start a checkout session for a paid plan")]
    Checkout {
        #[arg(help = "Plan: pro or business")]
        plan: String,
        #[arg(long, help = "Bill yearly instead of monthly")]
        yearly: bool,
    },

    #[command(about = "Open the billing portal")]
    Portal,
}

pub async fn handle(cmd: BillingCommands, ctx: &CliContext) -> anyhow::Result<()> {
    ctx.require_session()?;
    let format = &ctx.format;
    let billing = ctx.client.billing();

    match cmd {
        BillingCommands::Plan => {
            let plan = expect_data(billing.plan().await?)?;
            output_data(format, &plan, |p| {
                println!("Plan: {:?}", p.plan);
                if let Some(status) = &p.subscription_status {
                    println!("Status: {}", status);
                }
                println!("Projects: {}/{}", p.current_project_count, limit(p.max_projects));
                println!("Members per project: {}", limit(p.max_members_per_project));
                if !p.enabled_features.is_empty() {
                    println!("Features: {:?}", p.enabled_features);
                }
            })
        }
        BillingCommands::Checkout { plan, yearly } => {
            let plan = parse_plan(&plan)?;
            let session = expect_data(billing.checkout_session(plan, yearly).await?)?;
            output_success(format, &session.url, Some(json!({ "url": session.url })))
        }
        BillingCommands::Portal => {
            let session = expect_data(billing.portal_session().await?)?;
            output_success(format, &session.url, Some(json!({ "url": session.url })))
        }
    }
}

fn parse_plan(value: &str) -> anyhow::Result<CheckoutPlan> {
    match value.to_ascii_lowercase().as_str() {
        "pro" => Ok(CheckoutPlan::Pro),
        "business" => Ok(CheckoutPlan::Business),
        other => anyhow::bail!("Unknown plan '{}', expected pro or business", other),
    }
}

/// Negative limits mean unlimited
fn limit(value: i64) -> String {
    if value < 0 {
        "unlimited".to_string()
    } else {
        value.to_string()
    }
}
