//! Shared fixtures for the conversation tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use shopping_list::bot::{
    ChatTransport, ConversationController, EventKind, InboundEvent, Reply, TransportError,
};
use shopping_list::ids::UserId;
use shopping_list::services::AppServices;
use shopping_list::session::{ChatUserKey, Session, SessionStore};

pub const CHAT_ID: i64 = 100;
pub const TELEGRAM_USER: u64 = 42;

#[derive(Clone, Debug)]
pub enum Delivery {
    Sent { message_id: i32, reply: Reply },
    Edited { message_id: i32, reply: Reply },
}

impl Delivery {
    pub fn reply(&self) -> &Reply {
        match self {
            Delivery::Sent { reply, .. } | Delivery::Edited { reply, .. } => reply,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Delivery::Edited { .. })
    }
}

/// Transport that records every delivery instead of talking to Telegram
#[derive(Default)]
pub struct RecordingTransport {
    log: Mutex<Vec<Delivery>>,
    next_id: AtomicI32,
    pub fail_edits: AtomicBool,
    pub fail_sends: AtomicBool,
}

impl RecordingTransport {
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Delivery> {
        self.log.lock().unwrap().last().cloned()
    }

    /// Most recent reply that carries a keyboard
    pub fn last_interactive(&self) -> Option<Reply> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .map(Delivery::reply)
            .find(|reply| reply.has_keyboard())
            .cloned()
    }

    /// Make every send and edit fail, as when Telegram is unreachable
    pub fn set_offline(&self, offline: bool) {
        self.fail_edits.store(offline, Ordering::SeqCst);
        self.fail_sends.store(offline, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, _chat_id: i64, reply: &Reply) -> Result<i32, TransportError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Other("network unreachable".to_string()));
        }
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.lock().unwrap().push(Delivery::Sent {
            message_id,
            reply: reply.clone(),
        });
        Ok(message_id)
    }

    async fn edit(
        &self,
        _chat_id: i64,
        message_id: i32,
        reply: &Reply,
    ) -> Result<(), TransportError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(TransportError::Other("message to edit not found".to_string()));
        }
        self.log.lock().unwrap().push(Delivery::Edited {
            message_id,
            reply: reply.clone(),
        });
        Ok(())
    }
}

pub struct Harness {
    pub controller: ConversationController,
    pub transport: Arc<RecordingTransport>,
    pub services: AppServices,
}

impl Harness {
    pub fn new() -> Self {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        Self::with_services(AppServices::in_memory(sessions))
    }

    pub fn with_services(services: AppServices) -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let controller = ConversationController::new(services.clone(), transport.clone());
        Self {
            controller,
            transport,
            services,
        }
    }

    pub fn owner() -> UserId {
        UserId::from_telegram(TELEGRAM_USER)
    }

    pub fn key() -> ChatUserKey {
        ChatUserKey::new(CHAT_ID, Self::owner())
    }

    pub fn event(kind: EventKind) -> InboundEvent {
        InboundEvent::new(CHAT_ID, Self::owner(), kind).with_language(Some("en".to_string()))
    }

    pub async fn command(&self, name: &str) {
        self.controller
            .handle_event(Self::event(EventKind::Command(name.to_string())))
            .await;
    }

    pub async fn button(&self, payload: impl Into<String>) {
        self.controller
            .handle_event(Self::event(EventKind::Button(payload.into())))
            .await;
    }

    pub async fn text(&self, text: &str) {
        self.controller
            .handle_event(Self::event(EventKind::Text(text.to_string())))
            .await;
    }

    pub async fn session(&self) -> Session {
        self.services.sessions.get(&Self::key()).await
    }
}

pub fn payloads(reply: &Reply) -> Vec<String> {
    reply.buttons().map(|button| button.callback_data.clone()).collect()
}

pub fn labels(reply: &Reply) -> Vec<String> {
    reply.buttons().map(|button| button.label.clone()).collect()
}
