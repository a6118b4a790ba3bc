//! Persistence capability traits.
//!
//! Every storage engine implements the same small capability set per entity:
//! save, find by id, find by parent, delete, delete by parent and existence.
//! Nothing above this layer assumes a query language.

use async_trait::async_trait;

use crate::errors::ShoppingResult;
use crate::ids::{CategoryId, ItemId, UserId};
use crate::model::{Category, Item, User};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Insert or replace by id
    async fn save(&self, category: &Category) -> ShoppingResult<()>;
    async fn find_by_id(&self, id: CategoryId) -> ShoppingResult<Option<Category>>;
    async fn find_by_user_id(&self, owner: &UserId) -> ShoppingResult<Vec<Category>>;
    /// Returns `true` when a row was removed
    async fn delete(&self, id: CategoryId) -> ShoppingResult<bool>;
    async fn exists(&self, id: CategoryId) -> ShoppingResult<bool>;
}

#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn save(&self, item: &Item) -> ShoppingResult<()>;
    async fn find_by_id(&self, id: ItemId) -> ShoppingResult<Option<Item>>;
    async fn find_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<Vec<Item>>;
    async fn delete(&self, id: ItemId) -> ShoppingResult<bool>;
    /// Returns the number of removed items
    async fn delete_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<u64>;
    async fn exists(&self, id: ItemId) -> ShoppingResult<bool>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn save(&self, user: &User) -> ShoppingResult<()>;
    async fn find_by_telegram_id(&self, telegram_id: &UserId) -> ShoppingResult<Option<User>>;
    async fn delete(&self, telegram_id: &UserId) -> ShoppingResult<bool>;
    async fn exists(&self, telegram_id: &UserId) -> ShoppingResult<bool>;
}
