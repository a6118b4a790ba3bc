//! Bot launcher: connects to Telegram and runs the update dispatcher

use std::sync::Arc;
use teloxide::dispatching::{ShutdownToken, UpdateHandler};
use teloxide::prelude::*;
use teloxide::RequestError;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::bot::{callback_handler, message_handler, ConversationController, TelegramTransport};
use crate::services::AppServices;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Telegram bot token is empty")]
    EmptyToken,
    #[error("Could not reach Telegram: {0}")]
    Connectivity(#[from] RequestError),
    #[error("Dispatcher task failed: {0}")]
    Dispatcher(#[from] JoinError),
}

/// A running bot
pub struct BotHandle {
    username: String,
    shutdown: ShutdownToken,
    task: JoinHandle<()>,
}

impl BotHandle {
    /// Username Telegram reported for the bot
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Ask the dispatcher to stop and wait until in-flight updates are done
    pub async fn stop(&self) {
        match self.shutdown.shutdown() {
            Ok(done) => done.await,
            Err(_) => debug!("Dispatcher is not running"),
        }
    }

    /// Wait for the dispatcher to finish (Ctrl-C or [`BotHandle::stop`])
    pub async fn join(self) -> Result<(), LaunchError> {
        self.task.await?;
        Ok(())
    }
}

/// Update routing: text messages and inline keyboard callbacks
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(Update::filter_message().endpoint(message_handler))
        .branch(Update::filter_callback_query().endpoint(callback_handler))
}

/// Start the conversation layer for the bot identified by `token`.
///
/// Fails when the token is empty or Telegram cannot be reached with it.
pub async fn start(token: &str, services: AppServices) -> Result<BotHandle, LaunchError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(LaunchError::EmptyToken);
    }

    let bot = Bot::new(token);
    let me = bot.get_me().await?;
    let username = me.user.username.clone().unwrap_or_default();
    info!(bot_username = %username, "Connected to Telegram");

    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let controller = Arc::new(ConversationController::new(services, transport));

    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![controller])
        .enable_ctrlc_handler()
        .build();
    let shutdown = dispatcher.shutdown_token();

    let task = tokio::spawn(async move {
        info!("Dispatcher started");
        dispatcher.dispatch().await;
        info!("Dispatcher stopped");
    });

    Ok(BotHandle {
        username,
        shutdown,
        task,
    })
}
