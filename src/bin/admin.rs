//! CLI administration tool for snaplink.
//!
//! Provides commands for managing owner tokens and checking the database
//! without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # Create a new owner token
//! cargo run --bin admin -- token create
//!
//! # List all owners
//! cargo run --bin admin -- token list
//!
//! # Revoke an owner's tokens
//! cargo run --bin admin -- token revoke "Production API"
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `TOKEN_SIGNING_SECRET` (required for `token create`): HMAC key,
//!   must match the server's

use snaplink::application::services::{generate_token, hash_token};
use snaplink::domain::repositories::OwnerRepository;
use snaplink::infrastructure::persistence::PgOwnerRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage owner tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new owner token
    Create {
        /// Owner name (prompted interactively if omitted)
        #[arg(long)]
        name: Option<String>,
    },

    /// List all owners
    List,

    /// Revoke every token registered under a name
    Revoke {
        /// Owner name
        name: String,
    },
}

/// Database subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Verify the database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let owners = PgOwnerRepository::new(Arc::new(pool.clone()));

    match cli.command {
        Commands::Token { action } => match action {
            TokenAction::Create { name } => create_token(&owners, name).await?,
            TokenAction::List => list_owners(&owners).await?,
            TokenAction::Revoke { name } => revoke_owner(&owners, &name).await?,
        },
        Commands::Db { action } => match action {
            DbAction::Check => db_check(&pool).await?,
        },
    }

    Ok(())
}

async fn create_token(owners: &PgOwnerRepository, name: Option<String>) -> Result<()> {
    let signing_secret = std::env::var("TOKEN_SIGNING_SECRET")
        .context("TOKEN_SIGNING_SECRET must be set to mint tokens")?;

    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Owner name")
            .interact_text()
            .context("Failed to read owner name")?,
    };

    let token = generate_token();
    let token_hash = hash_token(&signing_secret, &token);

    let owner = owners
        .register(&name, &token_hash)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create owner: {e}"))?;

    println!("{}", "Owner created.".green().bold());
    println!("  id:    {}", owner.id);
    println!("  name:  {}", owner.name);
    println!();
    println!(
        "{} {}",
        "Token (shown once, store it now):".yellow().bold(),
        token.cyan()
    );

    Ok(())
}

async fn list_owners(owners: &PgOwnerRepository) -> Result<()> {
    let all = owners
        .list()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list owners: {e}"))?;

    if all.is_empty() {
        println!("{}", "No owners registered.".yellow());
        return Ok(());
    }

    for owner in all {
        let status = if owner.revoked {
            "revoked".red()
        } else {
            "active".green()
        };
        let last_used = owner
            .last_used_at
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{:>6}  {:<24} {:<8} created {}  last used {}",
            owner.id,
            owner.name,
            status,
            owner.created_at.to_rfc3339(),
            last_used
        );
    }

    Ok(())
}

async fn revoke_owner(owners: &PgOwnerRepository, name: &str) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(format!("Revoke all tokens for '{name}'?"))
        .default(false)
        .interact()
        .context("Failed to read confirmation")?;

    if !confirmed {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    let revoked = owners
        .revoke(name)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to revoke: {e}"))?;

    if revoked {
        println!("{}", format!("Revoked tokens for '{name}'.").green());
    } else {
        println!(
            "{}",
            format!("No active tokens found for '{name}'.").yellow()
        );
    }

    Ok(())
}

async fn db_check(pool: &PgPool) -> Result<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database check query failed")?;

    println!("{}", "Database connection OK.".green().bold());
    Ok(())
}
