//! The Supervisor module manages the lifecycle of the Vigil application.
//!
//! It is the top-level owner of the long-running services: the sweep loop
//! and the admin HTTP server.
//!
//! ## Responsibilities
//!
//! - **Initialization**: the `SupervisorBuilder` constructs and wires the
//!   services together, injecting configuration, the repository and the
//!   presence/notification adapters.
//! - **Lifecycle management**: the `Supervisor` starts all services and
//!   manages their lifetimes through a `JoinSet`.
//! - **Graceful shutdown**: it listens for shutdown signals (Ctrl+C or
//!   SIGTERM), cancels the shared token, waits for the in-flight sweep
//!   cycle to finish and then cleans up the repository under a timeout.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;

use crate::{
    actions::traits::NotificationSink,
    config::AppConfig,
    engine::Sweeper,
    http_server,
    persistence::{error::PersistenceError, traits::WatchRepository},
    presence::traits::PresenceSource,
};

/// Represents the set of errors that can occur during the supervisor's
/// operation.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A watch repository was not provided to the `SupervisorBuilder`.
    #[error("Missing watch repository for Supervisor")]
    MissingRepository,

    /// A presence source was not provided to the `SupervisorBuilder`.
    #[error("Missing presence source for Supervisor")]
    MissingPresenceSource,

    /// A notification sink was not provided to the `SupervisorBuilder`.
    #[error("Missing notification sink for Supervisor")]
    MissingNotificationSink,

    /// An error occurred while interacting with the watch repository.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
}

/// The primary runtime manager for the application.
///
/// The Supervisor owns the major components and is responsible for their
/// startup, shutdown, and health monitoring. Once `run` is called, it
/// becomes the main process loop for the entire application.
pub struct Supervisor<R: WatchRepository + 'static> {
    /// Shared application configuration.
    config: Arc<AppConfig>,

    /// The persistent watch repository.
    repo: Arc<R>,

    /// The presence source queried by the sweep.
    presence: Arc<dyn PresenceSource>,

    /// The sink notifications are dispatched through.
    sink: Arc<dyn NotificationSink>,

    /// A token used to signal a graceful shutdown to all supervised tasks.
    cancellation_token: tokio_util::sync::CancellationToken,

    /// A set of all spawned tasks that the supervisor is actively managing.
    join_set: tokio::task::JoinSet<()>,
}

impl<R: WatchRepository + Send + Sync + 'static> Supervisor<R> {
    /// Creates a new Supervisor instance with all its required components.
    ///
    /// This is typically called by the `SupervisorBuilder` after it has
    /// assembled all the necessary dependencies.
    pub fn new(
        config: AppConfig,
        repo: Arc<R>,
        presence: Arc<dyn PresenceSource>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repo,
            presence,
            sink,
            cancellation_token: tokio_util::sync::CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    ///
    /// This is the public entry point for creating a supervisor.
    pub fn builder() -> SupervisorBuilder<R> {
        SupervisorBuilder::<R>::new()
    }

    /// Starts the supervisor and all its managed services.
    ///
    /// This method is the main entry point for the application's runtime.
    /// It spawns a signal handler, the admin HTTP server (when enabled)
    /// and the sweep loop, then supervises them until shutdown.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        // Clone the token for the signal handler task.
        let cancellation_token = self.cancellation_token.clone();

        // Spawn a task to listen for shutdown signals.
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("Failed to register SIGTERM handler")
                    .recv()
                    .await;
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
            }

            // Notify all other tasks to begin shutting down.
            cancellation_token.cancel();
        });

        // Spawn the admin HTTP server as a background task if enabled.
        if self.config.server.enabled {
            let server_config = Arc::clone(&self.config);
            let server_repo: Arc<dyn WatchRepository> = self.repo.clone();
            let http_cancellation_token = self.cancellation_token.clone();
            self.join_set.spawn(async move {
                tokio::select! {
                    _ = http_server::run_server_from_config(server_config, server_repo) => {},
                    _ = http_cancellation_token.cancelled() => {
                        tracing::info!("Admin API server received shutdown signal.");
                    }
                }
            });
        }

        // Spawn the Sweeper service.
        let sweeper = Sweeper::new(
            Arc::clone(&self.config),
            Arc::clone(&self.repo),
            Arc::clone(&self.presence),
            Arc::clone(&self.sink),
            self.cancellation_token.clone(),
        );
        self.join_set.spawn(async move {
            sweeper.run().await;
        });

        // --- Main Supervisor Loop ---
        // Only responsible for monitoring task health and shutdown signals.

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(_)) => {
                            // Task completed successfully, continue monitoring.
                        }
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => {
                            // All tasks have completed.
                            break;
                        }
                    }
                }
                _ = self.cancellation_token.cancelled() => {
                    // Cancellation requested externally, break the loop.
                    break;
                }
            }
        }

        // --- Graceful Shutdown ---

        // Ensure all spawned tasks are properly awaited before cleanup.
        self.join_set.shutdown().await;
        tracing::info!("All supervised tasks have completed.");

        // Perform final cleanup of resources, with a timeout.
        tracing::info!("Starting graceful resource cleanup...");
        let shutdown_timeout = self.config.shutdown_timeout;

        let cleanup_logic = async {
            if let Err(e) = self.repo.flush().await {
                tracing::error!(error = %e, "Failed to flush pending writes, but continuing cleanup.");
            }
            if let Err(e) = self.repo.cleanup().await {
                tracing::error!(error = %e, "Failed to perform repository cleanup, but continuing.");
            }
        };

        if tokio::time::timeout(shutdown_timeout, cleanup_logic).await.is_err() {
            tracing::warn!(
                "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        } else {
            tracing::info!("Cleanup completed successfully.");
        }

        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }
}
