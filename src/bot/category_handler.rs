//! Category Handler module: main menu, category creation and deletion

use tracing::info;

use crate::ids::CategoryId;
use crate::localization::t_args_lang;
use crate::services::CategoriesService;

use super::controller::{HandlerResult, Turn};
use super::renderer::Renderer;
use super::transport::Reply;
use super::ui_builder;

#[derive(Clone)]
pub struct CategoryHandler {
    categories: CategoriesService,
    renderer: Renderer,
}

impl CategoryHandler {
    pub fn new(categories: CategoriesService, renderer: Renderer) -> Self {
        Self { categories, renderer }
    }

    /// Reset the conversation and show the user's categories
    pub async fn show_main_menu(&self, turn: &mut Turn<'_>) -> HandlerResult {
        let categories = self.categories.find_by_user_id(turn.user_id).await?;
        turn.session.reset();

        let reply = ui_builder::main_menu(&categories, turn.language_code);
        self.renderer
            .render(turn.chat_id, turn.session, &reply, turn.mode)
            .await?;
        Ok(())
    }

    pub async fn prompt_new_category(&self, turn: &mut Turn<'_>) -> HandlerResult {
        turn.session.await_category_name();

        let reply = ui_builder::category_name_prompt(turn.language_code);
        self.renderer
            .render(turn.chat_id, turn.session, &reply, turn.mode)
            .await?;
        Ok(())
    }

    /// Create a category from the text the user typed after the prompt
    pub async fn create_from_text(&self, turn: &mut Turn<'_>, text: &str) -> HandlerResult {
        let category = self.categories.create(text, turn.user_id).await?;
        turn.session.clear_awaiting();

        let notice = t_args_lang(
            "category-created",
            &[("name", category.name())],
            turn.language_code,
        );
        self.renderer.notify(turn.chat_id, &Reply::text(notice)).await?;

        self.show_main_menu(turn).await
    }

    pub async fn show_delete_targets(&self, turn: &mut Turn<'_>) -> HandlerResult {
        let categories = self.categories.find_by_user_id(turn.user_id).await?;
        turn.session.reset();

        let reply = ui_builder::delete_targets(&categories, turn.language_code);
        self.renderer
            .render(turn.chat_id, turn.session, &reply, turn.mode)
            .await?;
        Ok(())
    }

    /// Delete a category with all of its items, then show the main menu
    pub async fn delete(&self, turn: &mut Turn<'_>, category_id: CategoryId) -> HandlerResult {
        let category = self.categories.find_owned(category_id, turn.user_id).await?;
        self.categories.delete(category.id()).await?;
        info!(user_id = %turn.user_id, category_id = %category_id, "User deleted category");

        let notice = t_args_lang(
            "category-deleted",
            &[("name", category.name())],
            turn.language_code,
        );
        self.renderer.notify(turn.chat_id, &Reply::text(notice)).await?;

        self.show_main_menu(turn).await
    }
}
