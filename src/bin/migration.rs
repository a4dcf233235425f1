use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm_migration::MigratorTrait;
use tracing::info;
use uuid::Uuid;

use oms_portal::{
    auth::{AuthConfig, AuthService, Role},
    config,
    db,
    migrator::Migrator,
    services::profiles::ProfileService,
};

/// Schema and account maintenance for the portal database
#[derive(Parser, Debug)]
#[command(name = "migration", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations
    Up,
    /// Roll back the most recent migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// List applied and pending migrations
    Status,
    /// Create a profile with an explicit role
    CreateProfile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: Option<String>,
        /// admin, sales, ops, finance or client
        #[arg(long, default_value = "admin")]
        role: Role,
        /// Customer to link when the role is client
        #[arg(long)]
        customer_id: Option<Uuid>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(&cfg.log_level, cfg.log_json);

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;

    match cli.command {
        Command::Up => {
            db::run_migrations(&pool).await?;
        }
        Command::Down { steps } => {
            Migrator::down(&pool, Some(steps))
                .await
                .context("rollback failed")?;
            info!(steps, "Rolled back migrations");
        }
        Command::Status => {
            Migrator::status(&pool).await.context("status check failed")?;
        }
        Command::CreateProfile {
            email,
            password,
            full_name,
            role,
            customer_id,
        } => {
            let auth = Arc::new(AuthService::new(AuthConfig::from_app_config(&cfg)));
            let profiles = ProfileService::new(Arc::new(pool), auth);
            let profile = profiles
                .create_profile(&email, &password, full_name, role)
                .await
                .context("failed to create profile")?;
            if let Some(customer_id) = customer_id {
                profiles
                    .link_customer(profile.id, customer_id)
                    .await
                    .context("failed to link customer")?;
            }
            info!(profile_id = %profile.id, role = %role, "Profile created");
        }
    }

    Ok(())
}
