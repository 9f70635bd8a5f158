use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vigil::{
    actions::MessengerSink,
    cmd::sweep_once::{self, SweepOnceArgs},
    config::AppConfig,
    persistence::sqlite::SqliteStateRepository,
    presence::HttpPresenceSource,
    supervisor::Supervisor,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the main monitoring supervisor.
    Run(RunArgs),
    /// Performs a single sweep cycle with alerts printed to stdout.
    SweepOnce(SweepOnceArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// Path to the configuration directory.
    #[arg(short, long)]
    config_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    let subscriber =
        FmtSubscriber::builder().with_env_filter(EnvFilter::from_default_env()).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run_supervisor(args).await?,
        Commands::SweepOnce(args) => sweep_once::execute(args).await?,
    }

    Ok(())
}

async fn run_supervisor(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(args.config_dir.as_deref())?;
    tracing::debug!(
        database_url = %config.database_url,
        presence_base_url = %config.presence_base_url,
        sweep_interval = ?config.sweep_interval,
        "Configuration loaded."
    );

    tracing::debug!("Initializing watch repository...");
    let repo = Arc::new(SqliteStateRepository::new(&config.database_url).await?);
    repo.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    tracing::debug!(presence_base_url = %config.presence_base_url, "Initializing presence source...");
    let presence = Arc::new(HttpPresenceSource::new(
        config.presence_base_url.clone(),
        config.request_timeout,
    )?);

    tracing::debug!(messenger_base_url = %config.messenger_base_url, "Initializing notification sink...");
    let sink = Arc::new(MessengerSink::new(
        config.messenger_base_url.clone(),
        config.messenger_token.clone(),
        config.request_timeout,
    )?);

    let supervisor = Supervisor::builder()
        .config(config)
        .repository(repo)
        .presence_source(presence)
        .notification_sink(sink)
        .build()?;

    tracing::info!("Supervisor initialized, starting monitoring...");

    supervisor.run().await?;

    Ok(())
}
