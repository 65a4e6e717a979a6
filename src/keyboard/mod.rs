use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::messages;
use crate::types::Language;

/// Row shown under every delivered hadith: fetch another, save to favorites.
pub fn content_keyboard(lang: Language) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(messages::more_button(lang).to_string(), "more".to_string()),
        InlineKeyboardButton::callback(messages::fav_button(lang).to_string(), "fav".to_string()),
    ]])
}

/// Language picker; the current choice is marked.
pub fn language_keyboard(current: Language) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = Language::all()
        .into_iter()
        .map(|lang| {
            let marker = if lang == current { " ✅" } else { "" };
            vec![InlineKeyboardButton::callback(
                format!("{}{}", lang.label(), marker),
                format!("setlang_{}", lang.code()),
            )]
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}
