//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, worker spawning, and Axum server lifecycle.

use crate::application::services::RegistrationService;
use crate::config::Config;
use crate::domain::confirmation_worker::run_confirmation_worker;
use crate::domain::validation::EmailValidator;
use crate::infrastructure::notify::{ConfirmationNotifier, LogNotifier};
use crate::infrastructure::persistence::PgRegistrationRepository;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use chrono::Duration;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Confirmation delivery worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(StdDuration::from_secs(config.db_connect_timeout))
        .idle_timeout(StdDuration::from_secs(config.db_idle_timeout))
        .max_lifetime(StdDuration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate");

    let (confirmation_tx, confirmation_rx) = mpsc::channel(config.confirmation_queue_capacity);

    let notifier: Arc<dyn ConfirmationNotifier> = Arc::new(LogNotifier::new());
    tokio::spawn(run_confirmation_worker(confirmation_rx, notifier.clone()));
    tracing::info!("Confirmation worker started");

    let repository = Arc::new(PgRegistrationRepository::new(Arc::new(pool)));
    let registration_service = Arc::new(RegistrationService::new(
        repository,
        Arc::new(EmailValidator::new()),
        confirmation_tx.clone(),
        config.code_signing_secret.clone(),
        Duration::seconds(config.code_ttl_seconds as i64),
    ));

    let state = AppState::new(registration_service, confirmation_tx, notifier);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
