//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::ids::UserId;

use super::controller::{ConversationController, EventKind, InboundEvent};

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<ConversationController>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    match (q.data.as_deref(), q.message.as_ref()) {
        (Some(data), Some(message)) => {
            let event = InboundEvent::new(
                message.chat().id.0,
                UserId::from_telegram(q.from.id.0),
                EventKind::Button(data.to_string()),
            )
            .with_username(q.from.username.clone())
            .with_language(q.from.language_code.clone());

            controller.handle_event(event).await;
        }
        _ => debug!(user_id = %q.from.id, "Callback query without data or message"),
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
