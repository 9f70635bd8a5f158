//! Runs exactly one sweep cycle with alerts printed to stdout.
//!
//! Useful for validating configuration and the current debounce state
//! without delivering anything through the messenger gateway.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::StdoutSink,
    config::AppConfig,
    engine::Sweeper,
    persistence::sqlite::SqliteStateRepository,
    presence::HttpPresenceSource,
};

/// Arguments for the sweep-once subcommand.
#[derive(Parser, Debug)]
pub struct SweepOnceArgs {
    /// Path to the configuration directory.
    #[arg(short, long)]
    pub config_dir: Option<String>,
}

/// Executes a single sweep cycle and exits.
pub async fn execute(args: SweepOnceArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::new(args.config_dir.as_deref())?;

    let repo = Arc::new(SqliteStateRepository::new(&config.database_url).await?);
    repo.run_migrations().await?;

    let presence = Arc::new(HttpPresenceSource::new(
        config.presence_base_url.clone(),
        config.request_timeout,
    )?);
    let sink = Arc::new(StdoutSink::new());

    let sweeper =
        Sweeper::new(Arc::new(config), repo, presence, sink, CancellationToken::new());
    sweeper.sweep_cycle().await?;

    tracing::info!("Sweep-once completed.");
    Ok(())
}
