//! Item lifecycle

use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{ShoppingError, ShoppingResult};
use crate::ids::{CategoryId, ItemId, UserId};
use crate::model::Item;
use crate::repository::{CategoryRepository, ItemRepository};

#[derive(Clone)]
pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl ItemService {
    pub fn new(items: Arc<dyn ItemRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { items, categories }
    }

    /// Create an active item in `category_id`.
    ///
    /// Fails with `NotFound` when the category was deleted in the meantime,
    /// so no item is ever created under a vanished category.
    pub async fn create_item(
        &self,
        name: &str,
        category_id: CategoryId,
        owner: &UserId,
    ) -> ShoppingResult<Item> {
        let item = Item::create(ItemId::new(), name, category_id, owner.clone())?;

        if !self.categories.exists(category_id).await? {
            return Err(ShoppingError::not_found("Category", category_id));
        }

        self.items.save(&item).await?;
        info!(user_id = %owner, item_id = %item.id(), category_id = %category_id, "Item created");
        Ok(item)
    }

    /// Flip `is_completed` and persist; returns the updated item
    pub async fn toggle_item_complete(&self, id: ItemId) -> ShoppingResult<Item> {
        let mut item = self.get_item_by_id(id).await?;
        item.toggle_complete();
        self.items.save(&item).await?;
        debug!(item_id = %id, is_completed = item.is_completed(), "Item toggled");
        Ok(item)
    }

    pub async fn rename_item(&self, id: ItemId, new_name: &str) -> ShoppingResult<Item> {
        let mut item = self.get_item_by_id(id).await?;
        item.rename(new_name)?;
        self.items.save(&item).await?;
        Ok(item)
    }

    pub async fn delete_item(&self, id: ItemId) -> ShoppingResult<()> {
        if !self.items.delete(id).await? {
            return Err(ShoppingError::not_found("Item", id));
        }
        Ok(())
    }

    pub async fn delete_items_by_category(&self, category_id: CategoryId) -> ShoppingResult<u64> {
        self.items.delete_by_category_id(category_id).await
    }

    pub async fn get_items_by_category(
        &self,
        category_id: CategoryId,
    ) -> ShoppingResult<Vec<Item>> {
        self.items.find_by_category_id(category_id).await
    }

    pub async fn get_item_by_id(&self, id: ItemId) -> ShoppingResult<Item> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or_else(|| ShoppingError::not_found("Item", id))
    }

    pub async fn exists(&self, id: ItemId) -> ShoppingResult<bool> {
        self.items.exists(id).await
    }
}
