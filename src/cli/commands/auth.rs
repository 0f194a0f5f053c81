use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{expect_data, output_data, output_error, output_success, resolve_secret};
use crate::cli::CliContext;
use crate::models::RegisterRequest;
use crate::views::LoginOutcome;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in with email and password")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Create an account and sign in")]
    Register {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "First name")]
        first_name: String,
        #[arg(long, help = "Last name")]
        last_name: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Sign out and forget stored tokens")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Exchange the refresh token for a new token pair")]
    Refresh,

    #[command(about = "Show current user information")]
    Whoami,

    #[command(about = "Request a password reset email")]
    ForgotPassword {
        #[arg(help = "Email")]
        email: String,
    },

    #[command(about = "Set a new password with a reset token")]
    ResetPassword {
        #[arg(help = "Reset token from the email")]
        token: String,
        #[arg(long, help = "New password (will prompt if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext) -> anyhow::Result<()> {
    let format = &ctx.format;

    match cmd {
        AuthCommands::Login { email, password } => {
            let password = resolve_secret(password, "Password")?;
            let mut view = ctx.client.login_view();

            match view.submit(&email, &password).await {
                LoginOutcome::SignedIn => {
                    let user = ctx.client.session().current_user();
                    output_success(
                        format,
                        &format!("Signed in as {}", email),
                        Some(json!({ "user": user })),
                    )
                }
                LoginOutcome::Invalid => {
                    for (field, error) in view.form().errors() {
                        output_error(format, &format!("{}: {}", field, error), Some("INVALID_INPUT"))?;
                    }
                    anyhow::bail!("Login form is invalid")
                }
                LoginOutcome::Failed(message) => {
                    for (field, error) in view.form().errors() {
                        output_error(format, &format!("{}: {}", field, error), Some("REJECTED"))?;
                    }
                    anyhow::bail!("Login failed: {}", message)
                }
            }
        }
        AuthCommands::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = resolve_secret(password, "Password")?;
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                password,
            };
            let auth = expect_data(ctx.client.auth().register(&request).await?)?;
            output_success(
                format,
                &format!("Registered {}", auth.user.email),
                Some(json!({ "user": auth.user })),
            )
        }
        AuthCommands::Logout => {
            ctx.client.sign_out().await;
            output_success(format, "Signed out", None)
        }
        AuthCommands::Status => {
            let session = ctx.client.session().session();
            let status = json!({
                "authenticated": session.is_some(),
                "email": session.as_ref().map(|s| s.user.email.clone()),
            });
            output_data(format, &status, |_| match &session {
                Some(s) => println!("Signed in as {} ({})", s.user.full_name(), s.user.email),
                None => println!("Not signed in"),
            })
        }
        AuthCommands::Refresh => {
            expect_data(ctx.client.auth().refresh_token().await?)?;
            output_success(format, "Token refreshed", None)
        }
        AuthCommands::Whoami => {
            ctx.require_session()?;
            let user = ctx
                .client
                .session()
                .current_user()
                .ok_or_else(|| anyhow::anyhow!("No current user"))?;
            output_data(format, &user, |u| {
                println!("{} <{}>", u.full_name(), u.email);
                println!("ID: {}", u.id);
                if let Some(bio) = &u.bio {
                    println!("Bio: {}", bio);
                }
            })
        }
        AuthCommands::ForgotPassword { email } => {
            expect_data(ctx.client.auth().forgot_password(&email).await?)?;
            output_success(format, &format!("Reset link sent to {}", email), None)
        }
        AuthCommands::ResetPassword { token, password } => {
            let password = resolve_secret(password, "New password")?;
            expect_data(ctx.client.auth().reset_password(&token, &password).await?)?;
            output_success(format, "Password updated", None)
        }
    }
}
