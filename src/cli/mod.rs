//! Command-line interface for the CountyConnect server.

use clap::{Parser, Subcommand};
use std::path::Path;

use crate::config::Config;
use crate::db::{NewAccount, Store};
use crate::entities::accounts::Role;

/// CountyConnect - county government services backend
#[derive(Parser)]
#[command(name = "countyconnect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the API server (default)
    Serve,

    /// Create an active administrator account, bypassing email verification
    CreateAdmin {
        /// Email address for the administrator
        email: String,

        /// Password (minimum 8 characters)
        password: String,

        /// Optional username
        #[arg(long)]
        username: Option<String>,

        /// First name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Last name
        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Create a default config file in the current directory
    #[command(alias = "--init")]
    Init,
}

/// Provisioning path for the first administrator. Registration can never
/// produce an Admin, so this is how a deployment gets one.
pub async fn create_admin(
    config: &Config,
    email: String,
    password: String,
    username: Option<String>,
    first_name: String,
    last_name: String,
) -> anyhow::Result<()> {
    if password.len() < crate::services::account_service::MIN_PASSWORD_LENGTH {
        anyhow::bail!(
            "Password must be at least {} characters",
            crate::services::account_service::MIN_PASSWORD_LENGTH
        );
    }

    let store = Store::new(&config.general.database_path, config.security.clone()).await?;

    let account = store
        .create_account(NewAccount {
            email,
            username,
            first_name,
            last_name,
            password,
            role: Role::Admin,
            is_active: true,
            is_staff: true,
            is_superuser: true,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create administrator: {e}"))?;

    println!("Administrator created: {} (id {})", account.email, account.id);
    Ok(())
}

pub fn init_config() -> anyhow::Result<()> {
    let path = Path::new("config.toml");
    if path.exists() {
        println!("config.toml already exists, leaving it untouched");
        return Ok(());
    }

    Config::default().save_to_path(path)?;
    println!("Created default config.toml");
    println!("Set [security] signing_secret before starting the server.");
    Ok(())
}
