//! # In-Memory Repositories
//!
//! Process-local implementations of the repository traits. Used when no
//! `DATABASE_URL` is configured, and by the test suite.
//!
//! Each map sits behind its own `RwLock` that is held only for the duration
//! of a single map operation, never across an await point.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::{ShoppingError, ShoppingResult};
use crate::ids::{CategoryId, ItemId, UserId};
use crate::model::{Category, Item, User};
use crate::repository::{CategoryRepository, ItemRepository, UserRepository};

fn read<T>(lock: &RwLock<T>) -> ShoppingResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| ShoppingError::Persistence("in-memory store lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> ShoppingResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| ShoppingError::Persistence("in-memory store lock poisoned".to_string()))
}

#[derive(Debug, Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<CategoryId, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn save(&self, category: &Category) -> ShoppingResult<()> {
        write(&self.categories)?.insert(category.id(), category.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: CategoryId) -> ShoppingResult<Option<Category>> {
        Ok(read(&self.categories)?.get(&id).cloned())
    }

    async fn find_by_user_id(&self, owner: &UserId) -> ShoppingResult<Vec<Category>> {
        let mut categories: Vec<Category> = read(&self.categories)?
            .values()
            .filter(|c| c.belongs_to_user(owner))
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.created_at());
        Ok(categories)
    }

    async fn delete(&self, id: CategoryId) -> ShoppingResult<bool> {
        Ok(write(&self.categories)?.remove(&id).is_some())
    }

    async fn exists(&self, id: CategoryId) -> ShoppingResult<bool> {
        Ok(read(&self.categories)?.contains_key(&id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn save(&self, item: &Item) -> ShoppingResult<()> {
        write(&self.items)?.insert(item.id(), item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: ItemId) -> ShoppingResult<Option<Item>> {
        Ok(read(&self.items)?.get(&id).cloned())
    }

    async fn find_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<Vec<Item>> {
        let mut items: Vec<Item> = read(&self.items)?
            .values()
            .filter(|item| item.belongs_to_category(category_id))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.created_at());
        Ok(items)
    }

    async fn delete(&self, id: ItemId) -> ShoppingResult<bool> {
        Ok(write(&self.items)?.remove(&id).is_some())
    }

    async fn delete_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<u64> {
        let mut items = write(&self.items)?;
        let before = items.len();
        items.retain(|_, item| !item.belongs_to_category(category_id));
        Ok((before - items.len()) as u64)
    }

    async fn exists(&self, id: ItemId) -> ShoppingResult<bool> {
        Ok(read(&self.items)?.contains_key(&id))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> ShoppingResult<()> {
        write(&self.users)?.insert(user.telegram_id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_telegram_id(&self, telegram_id: &UserId) -> ShoppingResult<Option<User>> {
        Ok(read(&self.users)?.get(telegram_id).cloned())
    }

    async fn delete(&self, telegram_id: &UserId) -> ShoppingResult<bool> {
        Ok(write(&self.users)?.remove(telegram_id).is_some())
    }

    async fn exists(&self, telegram_id: &UserId) -> ShoppingResult<bool> {
        Ok(read(&self.users)?.contains_key(telegram_id))
    }
}
