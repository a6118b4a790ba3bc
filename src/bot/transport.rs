//! Outbound replies and the chat transport they are delivered through

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::{ApiError, RequestError};
use thiserror::Error;

use super::callback_action::CallbackAction;

/// One inline keyboard button
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplyButton {
    pub label: String,
    pub callback_data: String,
}

impl ReplyButton {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            callback_data: action.to_payload(),
        }
    }
}

/// Text plus an ordered list of button rows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Vec<Vec<ReplyButton>>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn with_row(mut self, row: Vec<ReplyButton>) -> Self {
        self.keyboard.push(row);
        self
    }

    /// All buttons in display order
    pub fn buttons(&self) -> impl Iterator<Item = &ReplyButton> {
        self.keyboard.iter().flatten()
    }

    pub fn has_keyboard(&self) -> bool {
        self.keyboard.iter().any(|row| !row.is_empty())
    }

    fn markup(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::new(self.keyboard.iter().map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(
                        button.label.clone(),
                        button.callback_data.clone(),
                    )
                })
                .collect::<Vec<_>>()
        }))
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] RequestError),
    #[error("Transport error: {0}")]
    Other(String),
}

/// Delivers replies to a chat
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a new message and return its id
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<i32, TransportError>;

    /// Replace text and keyboard of an existing message
    async fn edit(
        &self,
        chat_id: i64,
        message_id: i32,
        reply: &Reply,
    ) -> Result<(), TransportError>;
}

/// [`ChatTransport`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: i64, reply: &Reply) -> Result<i32, TransportError> {
        let request = self.bot.send_message(ChatId(chat_id), reply.text.clone());
        let message = if reply.has_keyboard() {
            request.reply_markup(reply.markup()).await?
        } else {
            request.await?
        };
        Ok(message.id.0)
    }

    async fn edit(
        &self,
        chat_id: i64,
        message_id: i32,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        let result = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), reply.text.clone())
            .reply_markup(reply.markup())
            .await;

        match result {
            Ok(_) => Ok(()),
            // Same text and keyboard as before; the message already shows what we want
            Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CategoryId;

    #[test]
    fn test_reply_builder() {
        let id = CategoryId::new();
        let reply = Reply::text("Menu")
            .with_row(vec![ReplyButton::new("Open", CallbackAction::SelectCategory(id))])
            .with_row(vec![ReplyButton::new("Add", CallbackAction::AddCategory)]);

        assert!(reply.has_keyboard());
        let payloads: Vec<_> = reply.buttons().map(|b| b.callback_data.as_str()).collect();
        assert_eq!(payloads, vec![format!("select_category:{id}").as_str(), "add_category"]);
        assert!(!Reply::text("plain").has_keyboard());
    }
}
