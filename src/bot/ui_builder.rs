//! UI Builder module for creating keyboards and formatting messages

use crate::localization::{t_args_lang, t_lang};
use crate::model::{Category, Item};

use super::callback_action::CallbackAction;
use super::transport::{Reply, ReplyButton};

/// Longest message text Telegram accepts
pub const MAX_MESSAGE_CHARS: usize = 4096;
/// Most buttons Telegram accepts in one inline keyboard
pub const MAX_KEYBOARD_BUTTONS: usize = 100;

// Kept free below the item list for the "and N more" line
const OVERFLOW_LINE_RESERVE: usize = 64;

/// Leading part of `rows` that fits next to `control_buttons` fixed buttons
fn fitting<T>(rows: &[T], control_buttons: usize) -> &[T] {
    &rows[..rows.len().min(MAX_KEYBOARD_BUTTONS - control_buttons)]
}

/// Main menu: one row per category, then the add/delete controls
pub fn main_menu(categories: &[Category], language_code: Option<&str>) -> Reply {
    let title = if categories.is_empty() {
        t_lang("main-menu-empty", language_code)
    } else {
        t_lang("main-menu-title", language_code)
    };

    let mut reply = Reply::text(title);
    for category in fitting(categories, 2) {
        reply = reply.with_row(vec![ReplyButton::new(
            category.name(),
            CallbackAction::SelectCategory(category.id()),
        )]);
    }

    reply.with_row(vec![
        ReplyButton::new(
            t_lang("button-add-category", language_code),
            CallbackAction::AddCategory,
        ),
        ReplyButton::new(
            t_lang("button-delete-category", language_code),
            CallbackAction::DeleteCategory(None),
        ),
    ])
}

/// Categories offered for deletion, with a way back to the main menu
pub fn delete_targets(categories: &[Category], language_code: Option<&str>) -> Reply {
    let title = if categories.is_empty() {
        t_lang("delete-category-empty", language_code)
    } else {
        t_lang("delete-category-prompt", language_code)
    };

    let mut reply = Reply::text(title);
    for category in fitting(categories, 1) {
        reply = reply.with_row(vec![ReplyButton::new(
            format!("❌ {}", category.name()),
            CallbackAction::DeleteCategory(Some(category.id())),
        )]);
    }

    reply.with_row(vec![back_button(language_code)])
}

/// Label of an item button: position in the filtered list, name, check mark
pub fn item_label(position: usize, item: &Item) -> String {
    if item.is_completed() {
        format!("{}. {} ✅", position, item.name())
    } else {
        format!("{}. {}", position, item.name())
    }
}

/// Item list of a category filtered by completion status.
///
/// Rows: one per item, the filter toggle, add item, back to categories.
/// Long lists are cut to Telegram's limits; the text then ends with a
/// count of the items left out.
pub fn category_items(
    category: &Category,
    items: &[Item],
    show_completed: bool,
    language_code: Option<&str>,
) -> Reply {
    let visible: Vec<&Item> = items
        .iter()
        .filter(|item| item.is_completed() == show_completed)
        .collect();

    let mut text = t_args_lang(
        "category-header",
        &[("category", category.name())],
        language_code,
    );
    text.push_str("\n\n");
    text.push_str(&t_lang(
        if show_completed { "items-completed" } else { "items-active" },
        language_code,
    ));
    text.push('\n');

    if visible.is_empty() {
        text.push_str(&t_lang(
            if show_completed { "items-empty-completed" } else { "items-empty-active" },
            language_code,
        ));
    } else {
        let mut length = text.chars().count();
        let mut listed = 0;
        for (i, item) in visible.iter().enumerate() {
            let line = item_label(i + 1, item);
            let budget = if i + 1 == visible.len() {
                MAX_MESSAGE_CHARS
            } else {
                MAX_MESSAGE_CHARS - OVERFLOW_LINE_RESERVE
            };
            let line_length = line.chars().count() + 1;
            if length + line_length > budget {
                break;
            }
            text.push_str(&line);
            text.push('\n');
            length += line_length;
            listed += 1;
        }

        if listed < visible.len() {
            let hidden = (visible.len() - listed).to_string();
            let more = t_args_lang("items-more", &[("count", hidden.as_str())], language_code);
            text.push_str(&more);
        }
    }

    let mut reply = Reply::text(text.trim_end());
    for (i, item) in fitting(&visible, 3).iter().enumerate() {
        reply = reply.with_row(vec![ReplyButton::new(
            item_label(i + 1, item),
            CallbackAction::ToggleItem(item.id()),
        )]);
    }

    let filter_label = if show_completed {
        t_lang("button-show-active", language_code)
    } else {
        t_lang("button-show-completed", language_code)
    };

    reply
        .with_row(vec![ReplyButton::new(
            filter_label,
            CallbackAction::ShowCompleted(category.id()),
        )])
        .with_row(vec![ReplyButton::new(
            t_lang("button-add-item", language_code),
            CallbackAction::AddItem(category.id()),
        )])
        .with_row(vec![back_button(language_code)])
}

pub fn category_name_prompt(language_code: Option<&str>) -> Reply {
    Reply::text(t_lang("category-name-prompt", language_code)).with_row(vec![ReplyButton::new(
        t_lang("button-cancel", language_code),
        CallbackAction::BackToCategories,
    )])
}

pub fn item_name_prompt(category: &Category, language_code: Option<&str>) -> Reply {
    Reply::text(t_args_lang(
        "item-name-prompt",
        &[("category", category.name())],
        language_code,
    ))
    .with_row(vec![ReplyButton::new(
        t_lang("button-cancel", language_code),
        CallbackAction::BackToItems(category.id()),
    )])
}

pub fn welcome(created: bool, language_code: Option<&str>) -> Reply {
    let key = if created { "welcome-new" } else { "welcome-back" };
    Reply::text(t_lang(key, language_code))
}

pub fn help(language_code: Option<&str>) -> Reply {
    Reply::text(t_lang("help-text", language_code))
}

fn back_button(language_code: Option<&str>) -> ReplyButton {
    ReplyButton::new(t_lang("button-back", language_code), CallbackAction::BackToCategories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ItemId, UserId};

    fn owner() -> UserId {
        UserId::from_telegram(7)
    }

    fn category(name: &str) -> Category {
        Category::create(name, owner()).unwrap()
    }

    fn item(name: &str, category: &Category, completed: bool) -> Item {
        let mut item = Item::create(ItemId::new(), name, category.id(), owner()).unwrap();
        if completed {
            item.toggle_complete();
        }
        item
    }

    fn payloads(reply: &Reply) -> Vec<String> {
        reply.buttons().map(|b| b.callback_data.clone()).collect()
    }

    #[test]
    fn test_empty_main_menu_has_controls() {
        let reply = main_menu(&[], Some("en"));
        assert_eq!(reply.text, t_lang("main-menu-empty", Some("en")));
        assert_eq!(payloads(&reply), vec!["add_category", "delete_category"]);
        assert_eq!(reply.keyboard.len(), 1);
    }

    #[test]
    fn test_main_menu_lists_categories_first() {
        let groceries = category("Groceries");
        let pharmacy = category("Pharmacy");
        let reply = main_menu(&[groceries.clone(), pharmacy.clone()], None);

        assert_eq!(reply.keyboard.len(), 3);
        assert_eq!(reply.keyboard[0][0].label, "Groceries");
        assert_eq!(
            reply.keyboard[1][0].callback_data,
            format!("select_category:{}", pharmacy.id())
        );
        assert_eq!(reply.keyboard[2].len(), 2);
    }

    #[test]
    fn test_category_items_layout() {
        let groceries = category("Groceries");
        let items = vec![
            item("Bread", &groceries, false),
            item("Milk", &groceries, true),
            item("Eggs", &groceries, false),
        ];

        let reply = category_items(&groceries, &items, false, Some("en"));
        let rows = &reply.keyboard;

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][0].label, "1. Bread");
        assert_eq!(
            rows[0][0].callback_data,
            format!("toggle_item:{}", items[0].id())
        );
        assert_eq!(rows[1][0].label, "2. Eggs");
        assert_eq!(
            rows[2][0].callback_data,
            format!("show_completed:{}", groceries.id())
        );
        assert_eq!(rows[3][0].callback_data, format!("add_item:{}", groceries.id()));
        assert_eq!(rows[4][0].callback_data, "back_to_categories");
        assert!(reply.text.contains("Bread"));
        assert!(!reply.text.contains("Milk"));
    }

    #[test]
    fn test_completed_filter() {
        let groceries = category("Groceries");
        let items = vec![item("Bread", &groceries, false), item("Milk", &groceries, true)];

        let reply = category_items(&groceries, &items, true, Some("en"));
        assert_eq!(reply.keyboard[0][0].label, "1. Milk ✅");
        assert_eq!(reply.keyboard[1][0].label, t_lang("button-show-active", Some("en")));
        assert_eq!(reply.keyboard.len(), 4);
    }

    #[test]
    fn test_empty_category_message() {
        let groceries = category("Groceries");
        let reply = category_items(&groceries, &[], false, Some("ru"));
        assert!(reply.text.contains(&t_lang("items-empty-active", Some("ru"))));
        assert_eq!(reply.keyboard.len(), 3);
    }

    #[test]
    fn test_prompts_have_cancel() {
        let groceries = category("Groceries");
        assert_eq!(payloads(&category_name_prompt(None)), vec!["back_to_categories"]);
        assert_eq!(
            payloads(&item_name_prompt(&groceries, None)),
            vec![format!("back_to_items:{}", groceries.id())]
        );
        assert!(item_name_prompt(&groceries, Some("en")).text.contains("Groceries"));
    }

    #[test]
    fn test_delete_targets() {
        let groceries = category("Groceries");
        let reply = delete_targets(&[groceries.clone()], None);
        assert_eq!(
            payloads(&reply),
            vec![
                format!("delete_category:{}", groceries.id()),
                "back_to_categories".to_string()
            ]
        );
        assert_eq!(payloads(&delete_targets(&[], None)), vec!["back_to_categories"]);
    }

    #[test]
    fn test_long_list_fits_telegram_limits() {
        let groceries = category("Groceries");
        let items: Vec<Item> = (0..150)
            .map(|n| item(&format!("{n:0>255}"), &groceries, false))
            .collect();

        let reply = category_items(&groceries, &items, false, Some("en"));

        assert!(reply.text.chars().count() <= MAX_MESSAGE_CHARS);
        assert!(reply.buttons().count() <= MAX_KEYBOARD_BUTTONS);
        assert!(reply.text.ends_with(" more"));

        // Controls survive the cut
        let payloads = payloads(&reply);
        assert_eq!(payloads.last().unwrap(), "back_to_categories");
        assert_eq!(payloads[payloads.len() - 2], format!("add_item:{}", groceries.id()));
    }

    #[test]
    fn test_short_list_has_no_overflow_line() {
        let groceries = category("Groceries");
        let items: Vec<Item> = (0..20)
            .map(|n| item(&format!("Item {n}"), &groceries, false))
            .collect();

        let reply = category_items(&groceries, &items, false, Some("en"));
        assert!(reply.text.ends_with("20. Item 19"));
        assert_eq!(reply.buttons().count(), 23);
    }

    #[test]
    fn test_menus_cap_category_buttons() {
        let categories: Vec<Category> = (0..120)
            .map(|n| category(&format!("List {n}")))
            .collect();

        let menu = main_menu(&categories, None);
        assert_eq!(menu.buttons().count(), MAX_KEYBOARD_BUTTONS);
        assert_eq!(payloads(&menu).last().unwrap(), "delete_category");

        let targets = delete_targets(&categories, None);
        assert_eq!(targets.buttons().count(), MAX_KEYBOARD_BUTTONS);
        assert_eq!(payloads(&targets).last().unwrap(), "back_to_categories");
    }
}
