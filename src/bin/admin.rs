//! CLI administration tool for link-shortener.
//!
//! Provides commands for managing accounts, inspecting links, viewing
//! statistics, and performing database operations without HTTP access.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! cargo run --bin admin -- user create
//!
//! # List an account's links
//! cargo run --bin admin -- user links ana@example.com
//!
//! # Resolve a slug straight from the store
//! cargo run --bin admin -- link show 099a8057
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required): PostgreSQL connection string
//! - `STORE_TIMEOUT_MS` (optional): per-query deadline, default 2000

use link_shortener::application::services::AccountService;
use link_shortener::domain::repositories::{LinkRepository, UserRepository};
use link_shortener::infrastructure::persistence::{PgLinkRepository, PgUserRepository};
use link_shortener::utils::slug_generator::is_valid_slug;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input, Password};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for managing link-shortener.
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
    /// Manage accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Inspect links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create an account
    Create {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List the links an account registered
    Links {
        email: String,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// Show the record behind a slug
    Show { slug: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let store_timeout = std::env::var("STORE_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(2));

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    let shared = Arc::new(pool.clone());
    let links = PgLinkRepository::new(shared.clone(), store_timeout);
    let users = Arc::new(PgUserRepository::new(shared));

    match cli.command {
        Commands::User { action } => handle_user_action(action, users, &links).await?,
        Commands::Link { action } => handle_link_action(action, &links).await?,
        Commands::Stats => handle_stats(users.as_ref(), &links).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_user_action(
    action: UserAction,
    users: Arc<PgUserRepository>,
    links: &PgLinkRepository,
) -> Result<()> {
    match action {
        UserAction::Create { name, email, yes } => create_user(users, name, email, yes).await,
        UserAction::Links { email } => list_user_links(users.as_ref(), links, &email).await,
    }
}

/// Creates an account with interactive prompts.
///
/// The password is always read from the terminal, never from arguments.
async fn create_user(
    users: Arc<PgUserRepository>,
    name: Option<String>,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create Account".bright_blue().bold());
    println!();

    let name = match name {
        Some(n) => n,
        None => Input::new().with_prompt("Name").interact_text()?,
    };
    let email: String = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new()
        .with_prompt("Password (min 8 characters)")
        .with_confirmation("Repeat password", "Passwords do not match")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.len() >= 8 {
                Ok(())
            } else {
                Err("Password must be at least 8 characters")
            }
        })
        .interact()?;

    println!();
    println!("  Name:  {}", name.cyan());
    println!("  Email: {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this account?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let user = AccountService::new(users)
        .sign_up(&name, &email, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create account: {}", e))?;

    println!();
    println!("{}", "✅ Account created".green().bold());
    println!("  ID: {}", user.id.to_string().bright_black());
    println!();

    Ok(())
}

/// Lists an account's links, newest first.
///
/// # Output Format
///
/// ```text
/// 🔗 Links for ana@example.com
///
///   Slug      Created           Original URL
///   ──────────────────────────────────────────────────────────
///   099a8057  2025-06-01 12:00  https://example.com/x
/// ```
async fn list_user_links(
    users: &PgUserRepository,
    links: &PgLinkRepository,
    email: &str,
) -> Result<()> {
    let email = email.trim().to_lowercase();
    let user = users
        .find_by_email(&email)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .context("Account not found")?;

    println!("{} {}", "🔗 Links for".bright_blue().bold(), email.cyan());
    println!();

    let owned = links
        .list_by_owner(&user.id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    if owned.is_empty() {
        println!("{}", "  No links yet".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<9} {:<17} {}",
        "Slug".bright_white().bold(),
        "Created".bright_white().bold(),
        "Original URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for link in &owned {
        println!(
            "  {:<9} {:<17} {}",
            link.slug.cyan(),
            link.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            link.original_url
        );
    }

    println!();
    println!("  Total: {}", owned.len().to_string().bright_white().bold());
    println!();

    Ok(())
}

async fn handle_link_action(action: LinkAction, links: &PgLinkRepository) -> Result<()> {
    match action {
        LinkAction::Show { slug } => {
            if !is_valid_slug(&slug) {
                anyhow::bail!("'{}' is not a valid slug (8 lowercase hex characters)", slug);
            }

            let link = links
                .find_by_slug(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .context("Slug not found")?;

            println!("  Slug:      {}", link.slug.cyan());
            println!("  Short URL: {}", link.shortened_url.bright_yellow());
            println!("  Original:  {}", link.original_url);
            println!("  Owner:     {}", link.owner_id.to_string().bright_black());
            println!(
                "  Created:   {}",
                link.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
            );
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Total number of accounts
/// - Total number of links
async fn handle_stats(users: &PgUserRepository, links: &PgLinkRepository) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let users_count = users
        .count()
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;
    let links_count = links
        .count(None)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    println!(
        "  Accounts: {}",
        users_count.to_string().bright_green().bold()
    );
    println!(
        "  Links:    {}",
        links_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
