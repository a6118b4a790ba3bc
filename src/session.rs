//! # Conversation Session Module
//!
//! Per chat/user conversation state and the store that keeps it.
//!
//! A [`Session`] records which free-text input the bot expects next, the
//! category currently on screen, the completed-items filter and the id of the
//! last interactive message (so menus can be edited in place).
//!
//! The [`SessionStore`] hands out one session per [`ChatUserKey`]. Access goes
//! through [`SessionStore::lock`], which serializes events for the same key
//! while letting different keys proceed in parallel.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::ids::{CategoryId, UserId};

/// Which kind of free-text reply the bot is waiting for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AwaitingInput {
    #[default]
    None,
    CategoryName,
    ItemName,
}

/// Conversation state as seen by the controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationState {
    Idle,
    AwaitingCategoryName,
    AwaitingItemName(CategoryId),
}

/// Mutable conversation state of one chat/user.
///
/// Fields are private: `AwaitingInput::ItemName` can only be entered through
/// [`Session::await_item_name`], which records the target category in the
/// same step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    awaiting: AwaitingInput,
    active_category_id: Option<CategoryId>,
    show_completed_items: bool,
    last_message_id: Option<i32>,
    language_code: Option<String>,
}

impl Session {
    pub fn awaiting(&self) -> AwaitingInput {
        self.awaiting
    }

    pub fn active_category_id(&self) -> Option<CategoryId> {
        self.active_category_id
    }

    pub fn show_completed_items(&self) -> bool {
        self.show_completed_items
    }

    pub fn last_message_id(&self) -> Option<i32> {
        self.last_message_id
    }

    pub fn language_code(&self) -> Option<&str> {
        self.language_code.as_deref()
    }

    pub fn state(&self) -> ConversationState {
        match (self.awaiting, self.active_category_id) {
            (AwaitingInput::CategoryName, _) => ConversationState::AwaitingCategoryName,
            (AwaitingInput::ItemName, Some(category_id)) => {
                ConversationState::AwaitingItemName(category_id)
            }
            _ => ConversationState::Idle,
        }
    }

    pub fn await_category_name(&mut self) {
        self.awaiting = AwaitingInput::CategoryName;
        self.active_category_id = None;
    }

    pub fn await_item_name(&mut self, category_id: CategoryId) {
        self.awaiting = AwaitingInput::ItemName;
        self.active_category_id = Some(category_id);
    }

    /// Show a category's items with the given completed-items filter
    pub fn view_category(&mut self, category_id: CategoryId, show_completed: bool) {
        self.awaiting = AwaitingInput::None;
        self.active_category_id = Some(category_id);
        self.show_completed_items = show_completed;
    }

    pub fn clear_awaiting(&mut self) {
        self.awaiting = AwaitingInput::None;
    }

    /// Back to the neutral main-menu state; the message pointer is kept
    pub fn reset(&mut self) {
        self.awaiting = AwaitingInput::None;
        self.active_category_id = None;
        self.show_completed_items = false;
    }

    pub fn set_last_message_id(&mut self, message_id: Option<i32>) {
        self.last_message_id = message_id;
    }

    pub fn set_language_code(&mut self, language_code: Option<String>) {
        self.language_code = language_code;
    }

    /// `awaiting == ItemName` implies an active category
    pub fn is_consistent(&self) -> bool {
        self.awaiting != AwaitingInput::ItemName || self.active_category_id.is_some()
    }
}

/// Identifies one conversation: a user inside a chat
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatUserKey {
    pub chat_id: i64,
    pub user_id: UserId,
}

impl ChatUserKey {
    pub fn new(chat_id: i64, user_id: UserId) -> Self {
        Self { chat_id, user_id }
    }
}

impl fmt::Display for ChatUserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}

#[derive(Debug)]
struct SessionSlot {
    session: Session,
    last_active: Instant,
}

impl SessionSlot {
    fn new() -> Self {
        Self {
            session: Session::default(),
            last_active: Instant::now(),
        }
    }
}

/// Exclusive access to one session for the duration of a single event
pub struct SessionGuard {
    slot: OwnedMutexGuard<SessionSlot>,
}

impl SessionGuard {
    /// Snapshot of the stored session
    pub fn session(&self) -> Session {
        self.slot.session.clone()
    }

    /// Replace the stored session
    pub fn commit(&mut self, session: Session) {
        self.slot.session = session;
        self.slot.last_active = Instant::now();
    }
}

/// Keyed in-memory session store with idle eviction
#[derive(Debug)]
pub struct SessionStore {
    slots: Mutex<HashMap<ChatUserKey, Arc<AsyncMutex<SessionSlot>>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ChatUserKey, Arc<AsyncMutex<SessionSlot>>>> {
        // The map is only touched by short, non-panicking sections
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &ChatUserKey) -> Arc<AsyncMutex<SessionSlot>> {
        self.slots()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(SessionSlot::new())))
            .clone()
    }

    /// Wait for exclusive access to the session of `key`, creating a neutral
    /// session if none exists
    pub async fn lock(&self, key: &ChatUserKey) -> SessionGuard {
        let mut slot = self.slot(key).lock_owned().await;
        slot.last_active = Instant::now();
        SessionGuard { slot }
    }

    pub async fn get(&self, key: &ChatUserKey) -> Session {
        self.lock(key).await.session()
    }

    pub async fn put(&self, key: &ChatUserKey, session: Session) {
        self.lock(key).await.commit(session);
    }

    /// Drop sessions idle for longer than the TTL; returns how many were removed.
    ///
    /// A session that is locked, or whose slot is held by a task about to lock
    /// it, is never evicted.
    pub fn evict_idle(&self) -> usize {
        let mut slots = self.slots();
        let before = slots.len();
        let ttl = self.ttl;

        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(guard) => guard.last_active.elapsed() <= ttl,
                Err(_) => true,
            }
        });

        before - slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Periodically evict idle sessions in the background
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let evicted = store.evict_idle();
                if evicted > 0 {
                    debug!(evicted, remaining = store.len(), "Evicted idle sessions");
                }
            }
        })
    }
}
