mod fetch_commands;

use std::{path::PathBuf, sync::Arc};

use {
    clap::{Parser, Subcommand},
    instarelay_config::RelayConfig,
    instarelay_instagram::InstagramClient,
    tracing::{info, warn},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(
    name = "instarelay",
    version,
    about = "Instarelay: Telegram bot that sends back Instagram posts"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "INSTARELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for per-request scratch directories (overrides config).
    #[arg(long, global = true, env = "INSTARELAY_WORK_DIR")]
    work_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default when no subcommand is provided).
    Run,
    /// Download one post without Telegram and list the files found.
    Fetch {
        /// Instagram post or Reel link.
        link: String,
        /// Directory to download into (defaults to `./<shortcode>`).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the config file, then layer env and CLI overrides on top.
fn load_config(cli: &Cli) -> anyhow::Result<RelayConfig> {
    let mut config = match &cli.config {
        Some(path) => instarelay_config::load_config(path)?,
        None => instarelay_config::discover_and_load()?,
    };
    instarelay_config::apply_env_overrides(&mut config);
    if let Some(dir) = &cli.work_dir {
        config.storage.work_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn run_bot(config: RelayConfig) -> anyhow::Result<()> {
    instarelay_config::validate(&config)?;

    let work_root = config.storage.work_root();
    let fetcher = Arc::new(InstagramClient::new(config.instagram)?);
    let handle = instarelay_telegram::start_polling(config.telegram, fetcher, work_root).await?;
    info!(username = ?handle.bot_username(), "bot is running, press Ctrl-C to stop");

    let stopped = handle.cancellation_token();
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
            info!("shutting down");
        },
        () = stopped.cancelled() => {
            warn!("polling stopped on its own");
        },
    }

    handle.shutdown().await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "instarelay starting");

    let config = load_config(&cli)?;
    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Fetch { link, output }) => {
            fetch_commands::fetch(&config, &link, output).await
        },
    }
}
