//! # ReviewBot
//!
//! Watches the latest homework submission and reports review status changes
//! to a Telegram chat.
//!
//! Usage:
//!   PRACTICUM_TOKEN=... TELEGRAM_TOKEN=... TELEGRAM_CHAT_ID=... reviewbot
//!
//! Variables may also come from a `.env` file in the working directory.
//! Optional tuning lives in `~/.reviewbot/config.toml` (or `$REVIEWBOT_CONFIG`).

use anyhow::Result;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

use reviewbot_channels::TelegramNotifier;
use reviewbot_core::config::load_env_file;
use reviewbot_core::{ReviewBotConfig, Secrets};
use reviewbot_providers::PracticumClient;
use reviewbot_scheduler::PollLoop;

const CRATES: [&str; 5] = [
    "reviewbot",
    "reviewbot_core",
    "reviewbot_providers",
    "reviewbot_channels",
    "reviewbot_scheduler",
];

fn init_logging(config: &ReviewBotConfig) -> Result<()> {
    let default_filter = CRATES
        .iter()
        .map(|c| format!("{c}={}", config.log_level))
        .collect::<Vec<_>>()
        .join(",");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_file = load_env_file(None);
    let config = ReviewBotConfig::load()?;
    init_logging(&config)?;
    if let Some(path) = env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let secrets = match Secrets::from_env() {
        Ok(secrets) => secrets,
        Err(e) => {
            tracing::error!("🔑 {e}");
            return Err(e.into());
        }
    };

    tracing::info!("🚀 ReviewBot starting, endpoint: {}", config.endpoint);

    let api = PracticumClient::from_config(&config, &secrets);
    let notifier = TelegramNotifier::from_config(&config, &secrets);

    PollLoop::new(api, notifier, secrets.chat_id.clone(), config.retry_period())
        .run()
        .await;

    Ok(())
}
