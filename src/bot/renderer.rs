//! Update-or-send rendering of interactive messages

use std::sync::Arc;
use tracing::{debug, warn};

use crate::session::Session;

use super::transport::{ChatTransport, Reply, TransportError};

/// How an interactive reply reaches the chat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Edit the session's last interactive message, sending a new one if
    /// there is none or the edit fails
    UpdateOrSend,
    /// Always send a new message
    SendNew,
}

#[derive(Clone)]
pub struct Renderer {
    transport: Arc<dyn ChatTransport>,
}

impl Renderer {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Show an interactive reply; the session's `last_message_id` points at
    /// the message that ends up showing it
    pub async fn render(
        &self,
        chat_id: i64,
        session: &mut Session,
        reply: &Reply,
        mode: RenderMode,
    ) -> Result<(), TransportError> {
        if mode == RenderMode::UpdateOrSend {
            if let Some(message_id) = session.last_message_id() {
                match self.transport.edit(chat_id, message_id, reply).await {
                    Ok(()) => {
                        debug!(chat_id, message_id, "Edited interactive message");
                        return Ok(());
                    }
                    Err(e) => {
                        warn!(
                            chat_id,
                            message_id,
                            error = %e,
                            "Edit failed, sending a new message"
                        );
                    }
                }
            }
        }

        let message_id = self.transport.send(chat_id, reply).await?;
        session.set_last_message_id(Some(message_id));
        debug!(chat_id, message_id, "Sent interactive message");
        Ok(())
    }

    /// Send a plain notice; the interactive message pointer is left alone
    pub async fn notify(&self, chat_id: i64, reply: &Reply) -> Result<(), TransportError> {
        self.transport.send(chat_id, reply).await.map(|_| ())
    }
}
