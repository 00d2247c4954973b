use anyhow::{Context, Result};
use clap::Parser;
use goldbot::api::{GoldApiClient, LiveMarketData, TelegramClient, TwelveDataClient};
use goldbot::execution::{SessionConfig, SessionDeps, SignalSession};
use goldbot::persistence::CsvJournal;
use goldbot::scheduler::{wait_for_shutdown, Scheduler};
use goldbot::Settings;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "goldbot")]
#[command(about = "XAU/USD trend signal bot with Telegram alerts")]
struct Args {
    /// Path to a TOML config file (defaults to ./goldbot.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let args = Args::parse();

    tracing::info!("🚀 Gold signal bot starting");

    let settings = Settings::load(args.config.as_deref()).context("Failed to load configuration")?;
    settings.log_summary();

    let prices = GoldApiClient::with_base_url(&settings.gold_api_base_url)
        .context("Failed to build gold-api client")?;
    let series = TwelveDataClient::with_base_url(
        settings.twelve_data_api_key.clone(),
        &settings.twelve_data_base_url,
        settings.twelve_data_rate_limit_rpm,
    )
    .context("Failed to build Twelve Data client")?;
    let telegram = TelegramClient::with_base_url(
        settings.telegram_bot_token.clone(),
        &settings.telegram_base_url,
    )
    .context("Failed to build Telegram client")?;

    let strategy = settings.strategy.build(settings.strategy_config());
    tracing::info!("✅ Strategy: {}", strategy.name());

    let journal = CsvJournal::new(&settings.journal_path);
    tracing::info!("✅ Journaling signals to {}", journal.path().display());

    let deps = SessionDeps {
        market: Arc::new(LiveMarketData::new(prices, series)),
        notifier: Arc::new(telegram),
        journal: Arc::new(journal),
        strategy,
    };
    let session = SignalSession::new(
        SessionConfig::from(&settings),
        deps,
        settings.cooldown(),
    );

    tracing::info!("\nPress Ctrl+C to stop...\n");

    let scheduler = Scheduler::new(session, settings.poll_interval(), settings.heartbeat_interval());
    let session = scheduler
        .run_until(wait_for_shutdown(tokio::signal::ctrl_c()))
        .await;

    tracing::info!("👋 Stopped with {} open signal(s)", session.tracker().len());
    for signal in session.tracker().open_signals() {
        tracing::info!(
            "  {} entry {:.2} TP {:.2} SL {:.2} (since {})",
            signal.direction,
            signal.entry,
            signal.take_profit,
            signal.stop_loss,
            signal.created_at.format("%H:%M UTC")
        );
    }
    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goldbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
