//! Category lifecycle and the item cascade

use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{ShoppingError, ShoppingResult};
use crate::ids::{CategoryId, UserId};
use crate::model::Category;
use crate::repository::{CategoryRepository, ItemRepository};

#[derive(Clone)]
pub struct CategoriesService {
    categories: Arc<dyn CategoryRepository>,
    items: Arc<dyn ItemRepository>,
}

impl CategoriesService {
    pub fn new(
        categories: Arc<dyn CategoryRepository>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self { categories, items }
    }

    /// Create and persist a category; the name is stored trimmed
    pub async fn create(&self, name: &str, owner: &UserId) -> ShoppingResult<Category> {
        let category = Category::create(name, owner.clone())?;
        self.categories.save(&category).await?;
        info!(user_id = %owner, category_id = %category.id(), "Category created");
        Ok(category)
    }

    /// Delete a category together with every item inside it.
    ///
    /// Items are removed first so that an interrupted delete never leaves a
    /// category row whose items are already gone; calling this again after a
    /// failure finishes the job.
    pub async fn delete(&self, id: CategoryId) -> ShoppingResult<()> {
        if !self.categories.exists(id).await? {
            return Err(ShoppingError::not_found("Category", id));
        }

        let removed_items = self.items.delete_by_category_id(id).await?;
        debug!(category_id = %id, removed_items, "Cascade removed items");

        self.categories.delete(id).await?;
        info!(category_id = %id, removed_items, "Category deleted");
        Ok(())
    }

    pub async fn rename(&self, id: CategoryId, new_name: &str) -> ShoppingResult<Category> {
        let mut category = self
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| ShoppingError::not_found("Category", id))?;

        category.rename(new_name)?;
        self.categories.save(&category).await?;
        Ok(category)
    }

    pub async fn find_by_id(&self, id: CategoryId) -> ShoppingResult<Option<Category>> {
        self.categories.find_by_id(id).await
    }

    /// Look up a category on behalf of a user.
    ///
    /// Categories owned by somebody else are reported as missing.
    pub async fn find_owned(&self, id: CategoryId, owner: &UserId) -> ShoppingResult<Category> {
        match self.categories.find_by_id(id).await? {
            Some(category) if category.belongs_to_user(owner) => Ok(category),
            _ => Err(ShoppingError::not_found("Category", id)),
        }
    }

    pub async fn find_by_user_id(&self, owner: &UserId) -> ShoppingResult<Vec<Category>> {
        self.categories.find_by_user_id(owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemId;
    use crate::memory_store::{InMemoryCategoryRepository, InMemoryItemRepository};
    use crate::model::Item;
    use proptest::prelude::*;

    fn setup() -> (CategoriesService, Arc<InMemoryItemRepository>) {
        let items = Arc::new(InMemoryItemRepository::new());
        let categories = Arc::new(InMemoryCategoryRepository::new());
        let service = CategoriesService::new(categories, items.clone());
        (service, items)
    }

    fn owner() -> UserId {
        UserId::from_telegram(12345)
    }

    #[tokio::test]
    async fn test_create_then_list_includes_trimmed_name() {
        let (service, _) = setup();
        for name in ["Groceries", "  Milk list  ", "Хозтовары"] {
            service.create(name, &owner()).await.unwrap();
        }

        let names: Vec<String> = service
            .find_by_user_id(&owner())
            .await
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert!(names.contains(&"Groceries".to_string()));
        assert!(names.contains(&"Milk list".to_string()));
        assert!(names.contains(&"Хозтовары".to_string()));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (service, _) = setup();
        let err = service.create("   ", &owner()).await.unwrap_err();
        assert!(matches!(err, ShoppingError::Validation(_)));
        assert!(service.find_by_user_id(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_items() {
        let (service, items) = setup();
        let category = service.create("Bakery", &owner()).await.unwrap();
        let mut ids = Vec::new();
        for name in ["Bread", "Croissant"] {
            let item = Item::create(ItemId::new(), name, category.id(), owner()).unwrap();
            items.save(&item).await.unwrap();
            ids.push(item.id());
        }

        service.delete(category.id()).await.unwrap();

        assert!(items.find_by_category_id(category.id()).await.unwrap().is_empty());
        for id in ids {
            assert!(items.find_by_id(id).await.unwrap().is_none());
        }
        assert!(service.find_by_user_id(&owner()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_category() {
        let (service, _) = setup();
        let err = service.delete(CategoryId::new()).await.unwrap_err();
        assert!(matches!(err, ShoppingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rename() {
        let (service, _) = setup();
        let category = service.create("Food", &owner()).await.unwrap();

        let renamed = service.rename(category.id(), "  Drinks ").await.unwrap();
        assert_eq!(renamed.name(), "Drinks");
        assert_eq!(renamed.id(), category.id());

        assert!(matches!(
            service.rename(category.id(), "").await,
            Err(ShoppingError::Validation(_))
        ));
        assert!(matches!(
            service.rename(CategoryId::new(), "x").await,
            Err(ShoppingError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_owned_hides_foreign_categories() {
        let (service, _) = setup();
        let category = service.create("Private", &owner()).await.unwrap();

        assert!(service.find_owned(category.id(), &owner()).await.is_ok());
        let stranger = UserId::from_telegram(999);
        assert!(matches!(
            service.find_owned(category.id(), &stranger).await,
            Err(ShoppingError::NotFound { .. })
        ));
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #[test]
        fn created_name_is_listed_trimmed(
            name in "\\s{0,3}\\PC{1,255}\\s{0,3}".prop_filter("blank", |n| !n.trim().is_empty())
        ) {
            let names: Vec<String> = block_on(async {
                let (service, _) = setup();
                let created = service.create(&name, &owner()).await.unwrap();
                assert_eq!(created.name(), name.trim());

                service
                    .find_by_user_id(&owner())
                    .await
                    .unwrap()
                    .iter()
                    .map(|c| c.name().to_string())
                    .collect()
            });
            prop_assert!(names.iter().any(|n| n == name.trim()));
        }

        #[test]
        fn blank_name_is_rejected(name in "\\s{0,10}") {
            let listed = block_on(async {
                let (service, _) = setup();
                let result = service.create(&name, &owner()).await;
                assert!(matches!(result, Err(ShoppingError::Validation(_))));
                service.find_by_user_id(&owner()).await.unwrap().len()
            });
            prop_assert_eq!(listed, 0);
        }
    }
}
