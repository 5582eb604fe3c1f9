use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vitrine_core::models::ContactStatus;
use vitrine_core::storage::{self, CANONICAL_TOKEN_VAR, FALLBACK_TOKEN_VAR, StorageSettings};
use vitrine_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "vitrine", version, about = "Operator tools for the Vitrine backend")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Administrator accounts
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Blob storage configuration
    Storage {
        #[command(subcommand)]
        command: StorageCommand,
    },

    /// Contact form inbox
    Contact {
        #[command(subcommand)]
        command: ContactCommand,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    /// List administrators (password hashes are never shown)
    List,
}

#[derive(Subcommand)]
enum StorageCommand {
    /// Show whether a blob storage token is configured and under which name
    Status,
}

#[derive(Subcommand)]
enum ContactCommand {
    /// List contact messages, newest first
    List {
        /// Only show messages with this status (new, read, replied, archived)
        #[arg(short, long)]
        status: Option<ContactStatus>,

        /// Print the messages as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("vitrine=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let database_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Migrate => {
            let db = connect_db(database_url).await?;
            db.migrate().await.map_err(|e| anyhow!(e))?;
            tracing::info!("Migrations applied");
        }
        Commands::Users {
            command: UsersCommand::List,
        } => cmd_users_list(&connect_db(database_url).await?).await?,
        Commands::Storage {
            command: StorageCommand::Status,
        } => cmd_storage_status(),
        Commands::Contact {
            command: ContactCommand::List { status, json },
        } => cmd_contact_list(&connect_db(database_url).await?, status, json).await?,
    }

    Ok(())
}

/// Connect to PostgreSQL. One-shot commands need only a couple of connections.
async fn connect_db(database_url: Option<&str>) -> Result<Database> {
    let url = database_url.context("DATABASE_URL not set. Pass --database-url or set the variable.")?;
    let config = DatabaseConfig {
        url: url.to_string(),
        max_connections: 2,
        acquire_timeout: Duration::from_secs(30),
    };
    Database::connect(&config).await.map_err(|e| anyhow!(e))
}

async fn cmd_users_list(db: &Database) -> Result<()> {
    let users = db.user_repo().list().await.map_err(|e| anyhow!(e))?;

    if users.is_empty() {
        println!("No administrators found");
        return Ok(());
    }

    for user in &users {
        println!(
            "  {} <{}> {} (created {})",
            user.username,
            user.email,
            user.id,
            user.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        );
    }
    println!("\nTotal: {} administrators", users.len());

    Ok(())
}

fn cmd_storage_status() {
    let settings = StorageSettings::from_env();

    // Report the name the token was found under without printing the token itself.
    let source = [CANONICAL_TOKEN_VAR, FALLBACK_TOKEN_VAR]
        .into_iter()
        .find(|key| std::env::var(key).is_ok_and(|v| !v.trim().is_empty()));

    match (storage::resolve_storage_token(), source) {
        (Some(_), Some(key)) => println!("Blob storage: available (token from {key})"),
        _ => println!("Blob storage: unavailable (set {CANONICAL_TOKEN_VAR} or {FALLBACK_TOKEN_VAR})"),
    }
    println!(
        "Single video upload only: {}",
        if settings.single_video_upload_only { "yes" } else { "no" }
    );
}

async fn cmd_contact_list(db: &Database, status: Option<ContactStatus>, json: bool) -> Result<()> {
    let messages = db
        .contact_repo()
        .list(status)
        .await
        .map_err(|e| anyhow!(e))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("No contact messages found");
        return Ok(());
    }

    for message in &messages {
        println!(
            "  [{}] {} {} <{}> {}",
            message.status,
            message.created_at.format("%Y-%m-%d %H:%M"),
            message.name,
            message.email,
            message.project_title.as_deref().unwrap_or("-"),
        );
    }
    println!("\nTotal: {} messages", messages.len());

    Ok(())
}
