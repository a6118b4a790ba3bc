//! Item Handler module: category item lists, item creation and toggling

use tracing::debug;

use crate::errors::ShoppingError;
use crate::ids::{CategoryId, ItemId};
use crate::services::{CategoriesService, ItemService};

use super::controller::{HandlerResult, Turn};
use super::renderer::Renderer;
use super::ui_builder;

#[derive(Clone)]
pub struct ItemHandler {
    items: ItemService,
    categories: CategoriesService,
    renderer: Renderer,
}

impl ItemHandler {
    pub fn new(items: ItemService, categories: CategoriesService, renderer: Renderer) -> Self {
        Self {
            items,
            categories,
            renderer,
        }
    }

    /// Make `category_id` the active category and show its items
    pub async fn show_items(
        &self,
        turn: &mut Turn<'_>,
        category_id: CategoryId,
        show_completed: bool,
    ) -> HandlerResult {
        let category = self.categories.find_owned(category_id, turn.user_id).await?;
        let items = self.items.get_items_by_category(category_id).await?;
        turn.session.view_category(category_id, show_completed);

        let reply =
            ui_builder::category_items(&category, &items, show_completed, turn.language_code);
        self.renderer
            .render(turn.chat_id, turn.session, &reply, turn.mode)
            .await?;
        Ok(())
    }

    /// Filter currently applied to `category_id`; a category that is not on
    /// screen starts with active items
    pub fn current_filter(turn: &Turn<'_>, category_id: CategoryId) -> bool {
        turn.session.active_category_id() == Some(category_id)
            && turn.session.show_completed_items()
    }

    pub async fn toggle_filter(
        &self,
        turn: &mut Turn<'_>,
        category_id: CategoryId,
    ) -> HandlerResult {
        let show_completed = !Self::current_filter(turn, category_id);
        self.show_items(turn, category_id, show_completed).await
    }

    pub async fn prompt_new_item(
        &self,
        turn: &mut Turn<'_>,
        category_id: CategoryId,
    ) -> HandlerResult {
        let category = self.categories.find_owned(category_id, turn.user_id).await?;
        turn.session.await_item_name(category_id);

        let reply = ui_builder::item_name_prompt(&category, turn.language_code);
        self.renderer
            .render(turn.chat_id, turn.session, &reply, turn.mode)
            .await?;
        Ok(())
    }

    /// Create an item from the text typed after the prompt and show the
    /// category's active items
    pub async fn create_from_text(
        &self,
        turn: &mut Turn<'_>,
        category_id: CategoryId,
        text: &str,
    ) -> HandlerResult {
        self.categories.find_owned(category_id, turn.user_id).await?;
        let item = self.items.create_item(text, category_id, turn.user_id).await?;
        debug!(user_id = %turn.user_id, item_id = %item.id(), "User added item");

        self.show_items(turn, category_id, false).await
    }

    /// Flip an item's completion and re-render its category, keeping the
    /// current filter
    pub async fn toggle(&self, turn: &mut Turn<'_>, item_id: ItemId) -> HandlerResult {
        let item = self.items.get_item_by_id(item_id).await?;
        if !item.belongs_to_user(turn.user_id) {
            return Err(ShoppingError::not_found("Item", item_id).into());
        }

        let item = self.items.toggle_item_complete(item_id).await?;
        let show_completed = Self::current_filter(turn, item.category_id());
        self.show_items(turn, item.category_id(), show_completed).await
    }
}
