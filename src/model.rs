//! # Shopping List Data Model
//!
//! Domain entities for the shopping list: categories, the items inside them
//! and the users that own both.
//!
//! Entities are built in two ways:
//! - `create` validates input and generates identifiers for brand new records
//! - `reconstitute` rebuilds a record that was already validated when stored
//!
//! Mutations (`rename`, `toggle_complete`) only touch the in-memory copy;
//! callers persist them explicitly through a repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{ShoppingError, ShoppingResult};
use crate::ids::{CategoryId, ItemId, UserId};

/// Maximum length of a category or item name, in characters
pub const MAX_NAME_LENGTH: usize = 255;

/// Validates a category or item name and returns it trimmed
pub fn validate_name(name: &str) -> ShoppingResult<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ShoppingError::Validation("name is empty".to_string()));
    }

    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(ShoppingError::Validation(format!(
            "name is longer than {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(trimmed.to_string())
}

/// A user-defined grouping of items (e.g. "Groceries")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    owner: UserId,
    created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new category with a freshly generated id
    pub fn create(name: &str, owner: UserId) -> ShoppingResult<Self> {
        Ok(Self {
            id: CategoryId::new(),
            name: validate_name(name)?,
            owner,
            created_at: Utc::now(),
        })
    }

    pub fn reconstitute(
        id: CategoryId,
        name: String,
        owner: UserId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            owner,
            created_at,
        }
    }

    pub fn id(&self) -> CategoryId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rename in place; id and owner never change
    pub fn rename(&mut self, new_name: &str) -> ShoppingResult<()> {
        self.name = validate_name(new_name)?;
        Ok(())
    }

    pub fn belongs_to_user(&self, user: &UserId) -> bool {
        &self.owner == user
    }
}

/// A named entry within a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    category_id: CategoryId,
    owner: UserId,
    is_completed: bool,
    created_at: DateTime<Utc>,
}

impl Item {
    /// Create a new, active item attached to one category
    pub fn create(
        id: ItemId,
        name: &str,
        category_id: CategoryId,
        owner: UserId,
    ) -> ShoppingResult<Self> {
        Ok(Self {
            id,
            name: validate_name(name)?,
            category_id,
            owner,
            is_completed: false,
            created_at: Utc::now(),
        })
    }

    pub fn reconstitute(
        id: ItemId,
        name: String,
        category_id: CategoryId,
        owner: UserId,
        is_completed: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            category_id,
            owner,
            is_completed,
            created_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn rename(&mut self, new_name: &str) -> ShoppingResult<()> {
        self.name = validate_name(new_name)?;
        Ok(())
    }

    /// Flip between active and completed
    pub fn toggle_complete(&mut self) {
        self.is_completed = !self.is_completed;
    }

    pub fn belongs_to_user(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn belongs_to_category(&self, category_id: CategoryId) -> bool {
        self.category_id == category_id
    }
}

/// A Telegram user known to the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    id: Uuid,
    telegram_id: UserId,
    username: Option<String>,
    created_at: DateTime<Utc>,
}

impl User {
    pub fn create(telegram_id: UserId, username: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            telegram_id,
            username,
            created_at: Utc::now(),
        }
    }

    pub fn reconstitute(
        id: Uuid,
        telegram_id: UserId,
        username: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            telegram_id,
            username,
            created_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn telegram_id(&self) -> &UserId {
        &self.telegram_id
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> UserId {
        UserId::from_telegram(12345)
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_name("Groceries").is_ok());
        assert!(validate_name("  Hardware store  ").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"a".repeat(256)).is_err());
        // Length is counted in characters, not bytes
        assert!(validate_name(&"я".repeat(255)).is_ok());
    }

    #[test]
    fn test_category_create_trims_name() {
        let category = Category::create("  Milk list ", owner()).unwrap();
        assert_eq!(category.name(), "Milk list");
        assert!(category.belongs_to_user(&owner()));
        assert!(!category.belongs_to_user(&UserId::from_telegram(1)));
    }

    #[test]
    fn test_category_rename_keeps_identity() {
        let mut category = Category::create("Food", owner()).unwrap();
        let id = category.id();

        category.rename(" Drinks ").unwrap();
        assert_eq!(category.name(), "Drinks");
        assert_eq!(category.id(), id);

        assert!(category.rename("  ").is_err());
        assert_eq!(category.name(), "Drinks");
    }

    #[test]
    fn test_item_defaults_to_active() {
        let category_id = CategoryId::new();
        let item = Item::create(ItemId::new(), "Bread", category_id, owner()).unwrap();
        assert!(!item.is_completed());
        assert!(item.belongs_to_category(category_id));
        assert!(item.belongs_to_user(&owner()));
    }

    #[test]
    fn test_item_double_toggle_restores_state() {
        let mut item = Item::create(ItemId::new(), "Eggs", CategoryId::new(), owner()).unwrap();
        let original = item.is_completed();

        item.toggle_complete();
        assert_ne!(item.is_completed(), original);
        item.toggle_complete();
        assert_eq!(item.is_completed(), original);
    }

    #[test]
    fn test_item_rejects_empty_name() {
        let result = Item::create(ItemId::new(), " \t ", CategoryId::new(), owner());
        assert!(matches!(result, Err(ShoppingError::Validation(_))));
    }
}
