//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::ids::UserId;

use super::controller::{ConversationController, EventKind, InboundEvent};

/// Convert a text message into an [`InboundEvent`] and hand it to the controller
pub async fn message_handler(msg: Message, controller: Arc<ConversationController>) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without sender");
        return Ok(());
    };

    let Some(text) = msg.text() else {
        debug!(user_id = %user.id, "Ignoring non-text message");
        return Ok(());
    };

    let user_id = UserId::from_telegram(user.id.0);
    let event = InboundEvent::new(msg.chat.id.0, user_id, classify_text(text))
        .with_username(user.username.clone())
        .with_language(user.language_code.clone());

    controller.handle_event(event).await;
    Ok(())
}

/// `/start`, `/start@my_bot` and `/START args` are all the `start` command;
/// anything else is free text
pub fn classify_text(text: &str) -> EventKind {
    match text.trim_start().strip_prefix('/') {
        Some(command) => {
            let name = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .split('@')
                .next()
                .unwrap_or_default();
            EventKind::Command(name.to_lowercase())
        }
        None => EventKind::Text(text.to_string()),
    }
}
