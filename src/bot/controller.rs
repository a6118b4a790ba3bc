//! # Conversation Controller
//!
//! Turns inbound chat events into state transitions of the per-user
//! [`Session`] and renders the resulting view.
//!
//! Every event runs under the session lock of its chat/user key, so events
//! of one conversation apply strictly in arrival order while other
//! conversations proceed in parallel. Handlers work on a draft copy of the
//! session which is committed only once the transition succeeded.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::errors::ShoppingError;
use crate::ids::{CategoryId, UserId};
use crate::localization::t_lang;
use crate::services::{AppServices, CategoriesService, UserService};
use crate::session::{ChatUserKey, ConversationState, Session, SessionStore};

use super::callback_action::CallbackAction;
use super::category_handler::CategoryHandler;
use super::item_handler::ItemHandler;
use super::renderer::{RenderMode, Renderer};
use super::transport::{ChatTransport, Reply, TransportError};
use super::ui_builder;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Command name without the leading slash or bot mention
    Command(String),
    /// Raw callback data of an inline keyboard button
    Button(String),
    Text(String),
}

/// One inbound chat event, already stripped of transport specifics
#[derive(Clone, Debug)]
pub struct InboundEvent {
    pub key: ChatUserKey,
    pub chat_id: i64,
    pub user_id: UserId,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(chat_id: i64, user_id: UserId, kind: EventKind) -> Self {
        Self {
            key: ChatUserKey::new(chat_id, user_id.clone()),
            chat_id,
            user_id,
            username: None,
            language_code: None,
            kind,
        }
    }

    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    pub fn with_language(mut self, language_code: Option<String>) -> Self {
        self.language_code = language_code;
        self
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Domain(#[from] ShoppingError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type HandlerResult = Result<(), HandlerError>;

/// State a handler works with while processing one event
pub struct Turn<'a> {
    pub chat_id: i64,
    pub user_id: &'a UserId,
    pub language_code: Option<&'a str>,
    pub mode: RenderMode,
    /// Draft session, committed by the controller on success
    pub session: &'a mut Session,
}

#[derive(Clone)]
pub struct ConversationController {
    sessions: Arc<SessionStore>,
    users: UserService,
    categories: CategoriesService,
    category_handler: CategoryHandler,
    item_handler: ItemHandler,
    renderer: Renderer,
}

impl ConversationController {
    pub fn new(services: AppServices, transport: Arc<dyn ChatTransport>) -> Self {
        let renderer = Renderer::new(transport);
        Self {
            sessions: services.sessions,
            users: services.users,
            categories: services.categories.clone(),
            category_handler: CategoryHandler::new(services.categories.clone(), renderer.clone()),
            item_handler: ItemHandler::new(services.items, services.categories, renderer.clone()),
            renderer,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Process one event to completion. Failures are reported to the chat
    /// and logged; nothing propagates to the caller.
    pub async fn handle_event(&self, event: InboundEvent) {
        let mut guard = self.sessions.lock(&event.key).await;
        let stored = guard.session();

        let mut draft = stored.clone();
        if event.language_code.is_some() {
            draft.set_language_code(event.language_code.clone());
        }
        let language_code = draft.language_code().map(str::to_string);
        let mode = match event.kind {
            EventKind::Button(_) => RenderMode::UpdateOrSend,
            EventKind::Command(_) | EventKind::Text(_) => RenderMode::SendNew,
        };

        let result = {
            let mut turn = Turn {
                chat_id: event.chat_id,
                user_id: &event.user_id,
                language_code: language_code.as_deref(),
                mode,
                session: &mut draft,
            };
            self.dispatch(&event, &mut turn).await
        };

        match result {
            Ok(()) => guard.commit(draft),
            Err(HandlerError::Transport(e)) => {
                error!(key = %event.key, error = %e, "Failed to deliver reply, event dropped");
                guard.commit(Self::after_lost_reply(stored));
            }
            Err(HandlerError::Domain(err)) => {
                let healed = self
                    .recover(&event, stored, language_code.as_deref(), mode, err)
                    .await;
                if let Some(healed) = healed {
                    guard.commit(healed);
                }
            }
        }
    }

    /// Session to keep when the reply to an event never reached the chat:
    /// the draft is discarded and no free-text input is pending afterwards
    fn after_lost_reply(stored: Session) -> Session {
        let mut session = stored;
        session.clear_awaiting();
        session.set_last_message_id(None);
        session
    }

    async fn dispatch(&self, event: &InboundEvent, turn: &mut Turn<'_>) -> HandlerResult {
        match &event.kind {
            EventKind::Command(command) => match command.as_str() {
                "start" => self.start(event, turn).await,
                "help" => {
                    self.renderer
                        .notify(turn.chat_id, &ui_builder::help(turn.language_code))
                        .await?;
                    Ok(())
                }
                other => {
                    debug!(key = %event.key, command = other, "Ignoring unknown command");
                    Ok(())
                }
            },
            EventKind::Button(data) => match CallbackAction::parse(data) {
                Some(action) => {
                    debug!(key = %event.key, action = action.name(), "Handling button");
                    self.on_action(turn, action).await
                }
                None => {
                    warn!(key = %event.key, data = %data, "Ignoring unrecognized callback data");
                    Ok(())
                }
            },
            EventKind::Text(text) => match turn.session.state() {
                ConversationState::AwaitingCategoryName => {
                    self.category_handler.create_from_text(turn, text).await
                }
                ConversationState::AwaitingItemName(category_id) => {
                    self.item_handler.create_from_text(turn, category_id, text).await
                }
                ConversationState::Idle => {
                    debug!(key = %event.key, "Ignoring text without pending input");
                    Ok(())
                }
            },
        }
    }

    async fn start(&self, event: &InboundEvent, turn: &mut Turn<'_>) -> HandlerResult {
        let (_, created) = self
            .users
            .get_or_create_user(&event.user_id, event.username.as_deref())
            .await?;
        info!(user_id = %event.user_id, created, "User started the bot");

        self.renderer
            .notify(turn.chat_id, &ui_builder::welcome(created, turn.language_code))
            .await?;
        self.category_handler.show_main_menu(turn).await
    }

    async fn on_action(&self, turn: &mut Turn<'_>, action: CallbackAction) -> HandlerResult {
        match action {
            CallbackAction::AddCategory => self.category_handler.prompt_new_category(turn).await,
            CallbackAction::DeleteCategory(None) => {
                self.category_handler.show_delete_targets(turn).await
            }
            CallbackAction::DeleteCategory(Some(id)) => {
                self.category_handler.delete(turn, id).await
            }
            CallbackAction::BackToCategories => self.category_handler.show_main_menu(turn).await,
            CallbackAction::SelectCategory(id) => {
                self.item_handler.show_items(turn, id, false).await
            }
            CallbackAction::AddItem(id) => self.item_handler.prompt_new_item(turn, id).await,
            CallbackAction::ToggleItem(id) => self.item_handler.toggle(turn, id).await,
            CallbackAction::ShowCompleted(id) => self.item_handler.toggle_filter(turn, id).await,
            CallbackAction::BackToItems(id) => {
                let show_completed = ItemHandler::current_filter(turn, id);
                self.item_handler.show_items(turn, id, show_completed).await
            }
        }
    }

    /// Report a failed transition and decide which session to keep.
    ///
    /// Returns the session to commit, or `None` to keep the stored one.
    async fn recover(
        &self,
        event: &InboundEvent,
        stored: Session,
        language_code: Option<&str>,
        mode: RenderMode,
        err: ShoppingError,
    ) -> Option<Session> {
        let key = match &err {
            e if e.is_validation() => "error-validation",
            ShoppingError::NotFound { .. } => "error-not-found",
            ShoppingError::Persistence(_) => "error-persistence",
            _ => "error-generic",
        };

        if matches!(err, ShoppingError::Persistence(_)) {
            error!(key = %event.key, error = %err, "Transition failed");
        } else {
            info!(key = %event.key, error = %err, "Transition rejected");
        }

        let notice = Reply::text(t_lang(key, language_code));
        if let Err(e) = self.renderer.notify(event.chat_id, &notice).await {
            error!(key = %event.key, error = %e, "Failed to deliver error message");
        }

        if !matches!(err, ShoppingError::NotFound { .. }) {
            return None;
        }

        self.self_heal(event, stored, language_code, mode).await
    }

    /// Re-render the view the user was on after a stale reference: the
    /// active category if it still resolves, otherwise the main menu
    async fn self_heal(
        &self,
        event: &InboundEvent,
        stored: Session,
        language_code: Option<&str>,
        mode: RenderMode,
    ) -> Option<Session> {
        let mut healed = stored;
        let active = self.resolvable_category(&healed, &event.user_id).await;

        let result = {
            let mut turn = Turn {
                chat_id: event.chat_id,
                user_id: &event.user_id,
                language_code,
                mode,
                session: &mut healed,
            };
            match active {
                Some(category_id) => {
                    let show_completed = turn.session.show_completed_items();
                    self.item_handler.show_items(&mut turn, category_id, show_completed).await
                }
                None => self.category_handler.show_main_menu(&mut turn).await,
            }
        };

        match result {
            Ok(()) => Some(healed),
            Err(e) => {
                error!(key = %event.key, error = %e, "Failed to re-render after stale reference");
                None
            }
        }
    }

    async fn resolvable_category(&self, session: &Session, owner: &UserId) -> Option<CategoryId> {
        let category_id = session.active_category_id()?;
        self.categories.find_owned(category_id, owner).await.ok().map(|c| c.id())
    }
}
