//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `controller`: the conversation state machine, one event at a time per chat/user
//! - `category_handler` / `item_handler`: transitions for categories and items
//! - `callback_action`: the `action:argument` button payload protocol
//! - `ui_builder`: creates keyboards and formats messages
//! - `renderer` / `transport`: update-or-send delivery of replies
//! - `message_handler` / `callback_handler`: teloxide endpoints

pub mod callback_action;
pub mod callback_handler;
pub mod category_handler;
pub mod controller;
pub mod item_handler;
pub mod message_handler;
pub mod renderer;
pub mod transport;
pub mod ui_builder;

// Re-export main handler functions for use by the launcher
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use callback_action::CallbackAction;
pub use controller::{ConversationController, EventKind, InboundEvent};
pub use transport::{ChatTransport, Reply, ReplyButton, TelegramTransport, TransportError};
