use std::error::Error;
use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::handlers::command::record_shown;
use crate::handlers::delivery::render_card;
use crate::keyboard::{content_keyboard, language_keyboard};
use crate::messages;
use crate::state::BotState;
use crate::types::Language;

/// Inline-button callbacks: `more` (another hadith), `fav` (save last shown),
/// `setlang_{code}`.
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id).await?;
        return Ok(());
    };
    let user = q.from.id.0 as i64;
    let lang = state.store.get(user).await.language;

    match data.as_str() {
        "more" => {
            bot.answer_callback_query(q.id).await?;
            let content = match state.content.fetch_random(None).await {
                Ok(content) => content,
                Err(e) => {
                    log::warn!("Callback fetch failed for user {}: {}", user, e);
                    if let Some(msg) = q.message {
                        bot.send_message(msg.chat.id, messages::error_text(lang, &e))
                            .await?;
                    }
                    return Ok(());
                }
            };
            record_shown(&state.store, user, &content).await?;
            let card =
                render_card(&state.cache, lang, messages::hadith_title(lang), &content).await;
            if let Some(msg) = q.message {
                // Editing fails when the original was a photo card; fall back
                // to a fresh message.
                let edited = bot
                    .edit_message_text(msg.chat.id, msg.id, card.clone())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(content_keyboard(lang))
                    .await;
                if edited.is_err() {
                    bot.send_message(msg.chat.id, card)
                        .parse_mode(ParseMode::Html)
                        .reply_markup(content_keyboard(lang))
                        .await?;
                }
            }
        }
        "fav" => {
            let last = state.store.get(user).await.last_shown;
            let answer = match last {
                None => messages::fav_none(lang).to_string(),
                Some(last) => {
                    let saved = state
                        .store
                        .mutate(user, |p| Ok(p.add_favorite(&last.text, &last.reference)))
                        .await?;
                    match saved {
                        Some(_) => messages::fav_saved(lang).to_string(),
                        None => messages::fav_dup(lang).to_string(),
                    }
                }
            };
            bot.answer_callback_query(q.id).text(answer).await?;
        }
        _ if data.starts_with("setlang_") => {
            let code = data.trim_start_matches("setlang_");
            match Language::from_code(code) {
                None => {
                    bot.answer_callback_query(q.id).await?;
                }
                Some(new_lang) => {
                    state
                        .store
                        .mutate(user, |p| {
                            p.language = new_lang;
                            Ok(())
                        })
                        .await?;
                    bot.answer_callback_query(q.id)
                        .text(messages::lang_set(new_lang))
                        .await?;
                    if let Some(msg) = q.message {
                        bot.edit_message_text(
                            msg.chat.id,
                            msg.id,
                            format!("🌍 <b>{}</b>", new_lang.label()),
                        )
                        .parse_mode(ParseMode::Html)
                        .reply_markup(language_keyboard(new_lang))
                        .await?;
                    }
                }
            }
        }
        _ => {
            bot.answer_callback_query(q.id).await?;
        }
    }
    Ok(())
}
