//! Inline keyboard callback payloads
//!
//! Buttons carry an `action:argument` string. Parsing is fail-closed: an
//! unknown action, a missing or malformed argument, or an argument on an
//! action that takes none all yield `None`.

use std::fmt;

use crate::ids::{CategoryId, ItemId};

const SELECT_CATEGORY: &str = "select_category";
const DELETE_CATEGORY: &str = "delete_category";
const ADD_CATEGORY: &str = "add_category";
const TOGGLE_ITEM: &str = "toggle_item";
const ADD_ITEM: &str = "add_item";
const BACK_TO_CATEGORIES: &str = "back_to_categories";
const BACK_TO_ITEMS: &str = "back_to_items";
const SHOW_COMPLETED: &str = "show_completed";

/// Telegram rejects callback data longer than this many bytes
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    SelectCategory(CategoryId),
    /// `None` asks for the list of delete targets
    DeleteCategory(Option<CategoryId>),
    AddCategory,
    ToggleItem(ItemId),
    AddItem(CategoryId),
    BackToCategories,
    BackToItems(CategoryId),
    /// Flip the completed-items filter of a category view
    ShowCompleted(CategoryId),
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        let (action, argument) = match data.split_once(':') {
            Some((action, argument)) => (action, Some(argument)),
            None => (data, None),
        };

        let action = match (action, argument) {
            (ADD_CATEGORY, None) => CallbackAction::AddCategory,
            (BACK_TO_CATEGORIES, None) => CallbackAction::BackToCategories,
            (DELETE_CATEGORY, None) => CallbackAction::DeleteCategory(None),
            (DELETE_CATEGORY, Some(id)) => CallbackAction::DeleteCategory(Some(id.parse().ok()?)),
            (SELECT_CATEGORY, Some(id)) => CallbackAction::SelectCategory(id.parse().ok()?),
            (ADD_ITEM, Some(id)) => CallbackAction::AddItem(id.parse().ok()?),
            (BACK_TO_ITEMS, Some(id)) => CallbackAction::BackToItems(id.parse().ok()?),
            (SHOW_COMPLETED, Some(id)) => CallbackAction::ShowCompleted(id.parse().ok()?),
            (TOGGLE_ITEM, Some(id)) => CallbackAction::ToggleItem(id.parse().ok()?),
            _ => return None,
        };

        Some(action)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CallbackAction::SelectCategory(_) => SELECT_CATEGORY,
            CallbackAction::DeleteCategory(_) => DELETE_CATEGORY,
            CallbackAction::AddCategory => ADD_CATEGORY,
            CallbackAction::ToggleItem(_) => TOGGLE_ITEM,
            CallbackAction::AddItem(_) => ADD_ITEM,
            CallbackAction::BackToCategories => BACK_TO_CATEGORIES,
            CallbackAction::BackToItems(_) => BACK_TO_ITEMS,
            CallbackAction::ShowCompleted(_) => SHOW_COMPLETED,
        }
    }

    /// Serialized form used as Telegram callback data
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            CallbackAction::SelectCategory(id)
            | CallbackAction::DeleteCategory(Some(id))
            | CallbackAction::AddItem(id)
            | CallbackAction::BackToItems(id)
            | CallbackAction::ShowCompleted(id) => write!(f, "{name}:{id}"),
            CallbackAction::ToggleItem(id) => write!(f, "{name}:{id}"),
            CallbackAction::DeleteCategory(None)
            | CallbackAction::AddCategory
            | CallbackAction::BackToCategories => f.write_str(name),
        }
    }
}
