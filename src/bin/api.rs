//! Famille API server binary.
//!
//! Opens the concrete database and hands it to the API server, which stays
//! agnostic of the storage backend.

use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;
use clap::Parser;
use famille::api::{self, ApiError, Config};
use famille::calendar::SyncConfig;
use famille::db::{Database, DbError, SqliteDatabase};
use famille::paths;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
enum BinaryError {
    #[error("Database error: {0}")]
    #[diagnostic(code(famille::binary::database))]
    Database(#[from] DbError),

    #[error("Failed to create data directory: {0}")]
    #[diagnostic(code(famille::binary::io))]
    Io(#[from] std::io::Error),

    #[error("Unknown timezone '{0}'")]
    #[diagnostic(
        code(famille::binary::timezone),
        help("Use an IANA name such as Europe/Paris or America/Montreal")
    )]
    Timezone(String),

    #[error("API server error: {0}")]
    #[diagnostic(code(famille::binary::api))]
    Api(#[from] ApiError),
}

#[derive(Parser)]
#[command(name = "famille-api")]
#[command(author, version, about = "Famille API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "3737")]
    port: u16,

    /// Database file path (defaults to $XDG_DATA_HOME/famille/famille.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Timezone calendar feeds are converted into
    #[arg(long, env = "FAMILLE_TIMEZONE", default_value = "Europe/Paris")]
    timezone: String,

    /// Timeout for downloading a calendar feed
    #[arg(long, default_value = "30")]
    fetch_timeout_secs: u64,

    /// Reconcile all subscriptions at this interval (disabled when omitted)
    #[arg(long)]
    sync_interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), BinaryError> {
    let cli = Cli::parse();

    // reqwest is built without a default crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let timezone: Tz = cli
        .timezone
        .parse()
        .map_err(|_| BinaryError::Timezone(cli.timezone.clone()))?;

    let db_path = cli.db.unwrap_or_else(paths::db_path);
    println!("Opening database at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = SqliteDatabase::open(&db_path).await?;
    db.migrate().await?;
    println!("Database migrations complete");

    api::run(
        Config {
            host: cli.host,
            port: cli.port,
            sync: SyncConfig {
                timezone,
                fetch_timeout: Duration::from_secs(cli.fetch_timeout_secs),
            },
            sync_interval: cli
                .sync_interval_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        },
        db,
    )
    .await?;

    Ok(())
}
