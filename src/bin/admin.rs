//! CLI administration tool for registration-service.
//!
//! Provides commands for inspecting registrations, purging stale pending
//! entries, and performing database operations without requiring HTTP API
//! access.
//!
//! # Usage
//!
//! ```bash
//! # List recent registrations
//! cargo run --bin admin -- registrations list
//!
//! # List only registrations awaiting confirmation
//! cargo run --bin admin -- registrations list --step email_confirmation
//!
//! # Purge pending registrations older than 48 hours
//! cargo run --bin admin -- registrations purge --hours 48
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
//!
//! # Features
//!
//! - **Registration Management**: List and purge registrations
//! - **Statistics**: Counts per wizard step
//! - **Database Tools**: Connection checks and info queries
//! - **Interactive Prompts**: Confirmation dialogs for destructive commands
//! - **Colored Output**: Terminal-friendly formatting using `colored` crate

use registration_service::domain::entities::RegistrationStep;
use registration_service::domain::repositories::RegistrationRepository;
use registration_service::infrastructure::persistence::PgRegistrationRepository;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing registration-service.
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
    /// Manage registrations
    Registrations {
        #[command(subcommand)]
        action: RegistrationAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Registration management subcommands.
#[derive(Subcommand)]
enum RegistrationAction {
    /// List registrations, newest first
    List {
        /// Page number (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        /// Items per page
        #[arg(short = 'n', long, default_value_t = 25)]
        page_size: i64,

        /// Filter by wizard step (e.g. email_confirmation, profile_setup)
        #[arg(short, long)]
        step: Option<String>,
    },

    /// Delete unfinished registrations older than a cutoff
    Purge {
        /// Age threshold in hours
        #[arg(long, default_value_t = 48)]
        hours: i64,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
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
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Connect to database
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Registrations { action } => handle_registration_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches registration management commands.
async fn handle_registration_action(action: RegistrationAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgRegistrationRepository::new(Arc::new(pool.clone())));

    match action {
        RegistrationAction::List {
            page,
            page_size,
            step,
        } => {
            list_registrations(repo, page, page_size, step).await?;
        }
        RegistrationAction::Purge { hours, yes } => {
            purge_registrations(repo, hours, yes).await?;
        }
    }

    Ok(())
}

/// Lists registrations with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 Registrations
///
///   ID  Email                          Step                 Created            Status
///   ─────────────────────────────────────────────────────────────────────────────────
///   1   user@example.com               profile_setup        2026-08-01 10:30   PENDING
///   2   done@example.com               submitting           2026-08-02 14:20   COMPLETED
/// ```
async fn list_registrations(
    repo: Arc<PgRegistrationRepository>,
    page: i64,
    page_size: i64,
    step: Option<String>,
) -> Result<()> {
    println!("{}", "📋 Registrations".bright_blue().bold());
    println!();

    let step = step
        .map(|s| {
            s.parse::<RegistrationStep>()
                .map_err(|e| anyhow::anyhow!("{}", e))
        })
        .transpose()?;

    let registrations = repo
        .list(page, page_size, step)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list registrations: {}", e))?;

    if registrations.is_empty() {
        println!("  {}", "No registrations found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<5} {:<30} {:<20} {:<18} {:<10}",
        "ID".bright_white().bold(),
        "Email".bright_white().bold(),
        "Step".bright_white().bold(),
        "Created".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(85).bright_black());

    for reg in &registrations {
        let status = if reg.is_completed() {
            "COMPLETED".green()
        } else if reg.is_confirmed() {
            "CONFIRMED".cyan()
        } else {
            "PENDING".yellow()
        };

        println!(
            "  {:<5} {:<30} {:<20} {:<18} {}",
            reg.id.to_string().bright_black(),
            reg.email.cyan(),
            reg.step.as_str(),
            reg.created_at
                .format("%Y-%m-%d %H:%M")
                .to_string()
                .bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Shown: {}",
        registrations.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Deletes unfinished registrations older than the cutoff, with confirmation.
///
/// Completed registrations are never removed.
async fn purge_registrations(
    repo: Arc<PgRegistrationRepository>,
    hours: i64,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🧹 Purge Stale Registrations".bright_blue().bold());
    println!();

    let cutoff = Utc::now() - Duration::hours(hours);

    println!(
        "  Removing unfinished registrations created before {}",
        cutoff
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
            .bright_white()
    );
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Proceed with purge?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let removed = repo
        .delete_stale(cutoff)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to purge registrations: {}", e))?;

    println!();
    println!(
        "{} {}",
        "✅ Removed".green().bold(),
        removed.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Displays system statistics.
///
/// Shows registration counts per wizard step plus the total.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let repo = PgRegistrationRepository::new(Arc::new(pool.clone()));

    let steps = [
        RegistrationStep::EmailEntry,
        RegistrationStep::EmailConfirmation,
        RegistrationStep::ProfileSetup,
        RegistrationStep::Submitting,
    ];

    for step in steps {
        let count = repo
            .count(Some(step))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to count registrations: {}", e))?;

        println!(
            "  {:<20} {}",
            step.as_str(),
            count.to_string().bright_green().bold()
        );
    }

    let total = repo
        .count(None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count registrations: {}", e))?;

    println!();
    println!("  Total: {}", total.to_string().bright_white().bold());
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
