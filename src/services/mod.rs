//! Domain services
//!
//! Services orchestrate repository calls and enforce rules that span more
//! than one entity:
//! - `categories`: category lifecycle, including the item cascade on delete
//! - `items`: item lifecycle; re-validates the parent category on create
//! - `users`: lazy user registration keyed by Telegram identity

pub mod categories;
pub mod items;
pub mod users;

pub use categories::CategoriesService;
pub use items::ItemService;
pub use users::UserService;

use std::sync::Arc;

use crate::memory_store::{
    InMemoryCategoryRepository, InMemoryItemRepository, InMemoryUserRepository,
};
use crate::repository::{CategoryRepository, ItemRepository, UserRepository};
use crate::session::SessionStore;

/// Everything the conversation layer needs, wired over one storage backend
#[derive(Clone)]
pub struct AppServices {
    pub categories: CategoriesService,
    pub items: ItemService,
    pub users: UserService,
    pub sessions: Arc<SessionStore>,
}

impl AppServices {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        items: Arc<dyn ItemRepository>,
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionStore>,
    ) -> Self {
        Self {
            categories: CategoriesService::new(categories.clone(), items.clone()),
            items: ItemService::new(items, categories),
            users: UserService::new(users),
            sessions,
        }
    }

    /// Services over process-local storage; data is lost on restart
    pub fn in_memory(sessions: Arc<SessionStore>) -> Self {
        Self::new(
            Arc::new(InMemoryCategoryRepository::new()),
            Arc::new(InMemoryItemRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            sessions,
        )
    }
}
