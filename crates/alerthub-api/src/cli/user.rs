//! User account CLI commands.

use anyhow::Result;
use clap::Subcommand;
use console::style;
use dialoguer::Password;

use alerthub_types::user::SignupRequest;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommand {
    /// Create an account (prompts for the password).
    Create {
        #[arg(long)]
        email: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Password for scripted use; prompted for when omitted.
        #[arg(long, hide = true)]
        password: Option<String>,
    },
}

pub async fn handle_user_command(cmd: UserCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        UserCommand::Create {
            email,
            first_name,
            last_name,
            phone,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => Password::new()
                    .with_prompt(format!("Password for {}", style(&email).bold()))
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?,
            };

            let response = state
                .auth_service
                .signup(SignupRequest {
                    email: Some(email),
                    password: Some(password),
                    first_name,
                    last_name,
                    phone_number: phone,
                })
                .await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            println!();
            println!("  {} User created", style("✓").green().bold());
            println!();
            println!("  {}  {}", style("Email:").bold(), style(&response.user.email).cyan());
            println!(
                "  {}     {}",
                style("ID:").bold(),
                style(response.user.user_id.to_string()).dim()
            );
            println!();
        }
    }

    Ok(())
}
