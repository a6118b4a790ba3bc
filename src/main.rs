use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shopping_list::config::BotConfig;
use shopping_list::db::{self, PgCategoryRepository, PgItemRepository, PgUserRepository};
use shopping_list::launcher;
use shopping_list::localization::init_localization;
use shopping_list::services::AppServices;
use shopping_list::session::SessionStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting Shopping List Bot");

    let config = BotConfig::from_env().context("Invalid configuration")?;

    init_localization().context("Failed to load translations")?;

    let sessions = Arc::new(SessionStore::new(config.session.ttl));

    let services = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to PostgreSQL");
            let pool = db::connect(database_url, config.db_max_connections).await?;

            AppServices::new(
                Arc::new(PgCategoryRepository::new(pool.clone())),
                Arc::new(PgItemRepository::new(pool.clone())),
                Arc::new(PgUserRepository::new(pool)),
                sessions.clone(),
            )
        }
        None => {
            warn!("DATABASE_URL is not set, using in-memory storage (data is lost on restart)");
            AppServices::in_memory(sessions.clone())
        }
    };

    let sweeper = sessions.spawn_sweeper(config.session.sweep_interval);

    let handle = launcher::start(&config.telegram_bot_token, services)
        .await
        .context("Failed to start the bot")?;
    info!(bot_username = handle.username(), "Bot is running");

    handle.join().await?;
    sweeper.abort();

    info!("Shopping List Bot stopped");
    Ok(())
}
