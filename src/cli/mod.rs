pub mod commands;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "profiles-api")]
#[command(about = "Profiles API - user profiles, login tokens and status feed")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve,

    #[command(about = "Provision an identity and its profile")]
    CreateUser {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login password")]
        password: String,
        #[arg(long, help = "Mark the identity as staff")]
        staff: bool,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle().await,
        Commands::CreateUser {
            email,
            name,
            password,
            staff,
        } => commands::user::create(email, name, password, staff, output_format).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["profiles-api"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_create_user() {
        let cli = Cli::parse_from([
            "profiles-api",
            "create-user",
            "--email",
            "admin@example.com",
            "--name",
            "Admin",
            "--password",
            "secret",
            "--staff",
        ]);
        match cli.command {
            Some(Commands::CreateUser { email, staff, .. }) => {
                assert_eq!(email, "admin@example.com");
                assert!(staff);
            }
            _ => panic!("expected create-user"),
        }
    }
}
