use std::error::Error;
use std::sync::Arc;

use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::commands::Command;
use crate::error::{BotError, Result};
use crate::handlers::delivery::{render_card, truncate_chars};
use crate::keyboard::{content_keyboard, language_keyboard};
use crate::messages;
use crate::state::{BotState, ProfileStore};
use crate::streak::{current_streak, has_decayed, record_activity};
use crate::types::{Content, Language, LastShown};

/// Top-level command dispatch. Every failure is converted into a localized
/// user message here; nothing propagates past this boundary as a crash.
pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
    let user = msg.from().map(|u| u.id.0 as i64).unwrap_or(msg.chat.id.0);
    let lang = state.store.get(user).await.language;

    if let Err(e) = dispatch(&bot, &msg, cmd, &state, user, lang).await {
        log::warn!("Command failed for user {}: {}", user, e);
        bot.send_message(msg.chat.id, messages::error_text(lang, &e))
            .parse_mode(ParseMode::Html)
            .await?;
    }
    Ok(())
}

async fn dispatch(
    bot: &Bot,
    msg: &Message,
    cmd: Command,
    state: &Arc<BotState>,
    user: i64,
    lang: Language,
) -> Result<()> {
    let chat = msg.chat.id;
    match cmd {
        Command::Start => {
            bot.send_message(chat, messages::welcome(lang))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Help => {
            bot.send_message(chat, Command::descriptions().to_string())
                .await?;
        }
        Command::Hadith(arg) => {
            handle_hadith(bot, chat, state, user, lang, arg.trim()).await?;
        }
        Command::Fav => {
            let last = state.store.get(user).await.last_shown;
            let reply = match last {
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
            bot.send_message(chat, reply).await?;
        }
        Command::Favorites => {
            let favorites = state.store.get(user).await.favorites;
            if favorites.is_empty() {
                bot.send_message(chat, messages::favorites_empty(lang))
                    .await?;
                return Ok(());
            }
            let mut text = format!("{}\n\n", messages::favorites_title(lang));
            for fav in &favorites {
                let preview = truncate_chars(&fav.text, 120);
                text.push_str(&format!(
                    "<b>#{}</b> {}\n<i>{}</i>\n\n",
                    fav.id, fav.reference, preview
                ));
            }
            text.push_str("🗑 /unfav &lt;id&gt;");
            bot.send_message(chat, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Unfav(arg) => {
            let reply = match arg.trim().parse::<u32>() {
                Err(_) => messages::unfav_usage(lang).to_string(),
                Ok(id) => {
                    let removed = state
                        .store
                        .mutate(user, |p| Ok(p.remove_favorite(id)))
                        .await?;
                    if removed {
                        messages::unfav_ok(lang, id)
                    } else {
                        messages::unfav_bad(lang, id)
                    }
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Daily(arg) => {
            let arg = arg.trim();
            let reply = if arg.is_empty() {
                match state.registry.daily_time(user).await {
                    Some(time) => messages::daily_current(lang, &time),
                    None => messages::daily_none(lang).to_string(),
                }
            } else {
                match state.registry.set_daily(user, arg).await {
                    Ok(time) => messages::daily_set(lang, &time),
                    Err(BotError::Validation(_)) => messages::bad_time(lang).to_string(),
                    Err(e) => return Err(e),
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::DailyOff => {
            state.registry.cancel_daily(user).await?;
            bot.send_message(chat, messages::daily_off(lang)).await?;
        }
        Command::Remind(arg) => {
            let mut parts = arg.split_whitespace();
            let reply = match parts.next() {
                None => messages::remind_usage(lang).to_string(),
                Some(raw_time) => {
                    let label = parts.collect::<Vec<_>>().join(" ");
                    match state.registry.add_reminder(user, raw_time, &label, None).await {
                        Ok(reminder) => messages::remind_ok(lang, &reminder.time),
                        Err(BotError::Duplicate) => {
                            // Normalization succeeded, so re-run it for the message.
                            let time = crate::schedule::normalize_time(raw_time)?;
                            messages::remind_dup(lang, &time)
                        }
                        Err(BotError::Validation(_)) => messages::bad_time(lang).to_string(),
                        Err(e) => return Err(e),
                    }
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Reminders => {
            let reminders = state.registry.reminders(user).await;
            if reminders.is_empty() {
                bot.send_message(chat, messages::reminders_empty(lang))
                    .parse_mode(ParseMode::Html)
                    .await?;
                return Ok(());
            }
            let mut text = format!("{}\n\n", messages::reminders_title(lang));
            for (i, reminder) in reminders.iter().enumerate() {
                let label = if reminder.label.is_empty() {
                    String::new()
                } else {
                    format!(" — {}", reminder.label)
                };
                text.push_str(&format!("  {}. <b>{}</b>{}\n", i + 1, reminder.time, label));
            }
            text.push_str(&format!("\n{}", messages::delremind_help(lang)));
            bot.send_message(chat, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::DelRemind(arg) => {
            let arg = arg.trim();
            let reply = if arg.eq_ignore_ascii_case("all") {
                let count = state.registry.clear_all(user).await?;
                messages::deleted_all(lang, count)
            } else {
                match arg.parse::<usize>() {
                    Err(_) => messages::delremind_help(lang).to_string(),
                    Ok(index) => {
                        if state.registry.remove_reminder(user, index).await? {
                            messages::delremind_ok(lang, index)
                        } else {
                            messages::delremind_bad(lang, index)
                        }
                    }
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Bookmark(arg) => {
            let reply = match parse_verse_ref(&arg) {
                Err(_) => messages::bookmark_usage(lang).to_string(),
                Ok(reference) => {
                    let added = state
                        .store
                        .mutate(user, |p| Ok(p.add_bookmark(&reference)))
                        .await?;
                    if added {
                        messages::bookmark_ok(lang, &reference)
                    } else {
                        messages::bookmark_dup(lang).to_string()
                    }
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Bookmarks => {
            let bookmarks = state.store.get(user).await.bookmarks;
            if bookmarks.is_empty() {
                bot.send_message(chat, messages::bookmarks_empty(lang))
                    .parse_mode(ParseMode::Html)
                    .await?;
                return Ok(());
            }
            let mut text = format!("{}\n\n", messages::bookmarks_title(lang));
            for (i, reference) in bookmarks.iter().enumerate() {
                text.push_str(&format!("  {}. {}\n", i + 1, reference));
            }
            bot.send_message(chat, text)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Unbookmark(arg) => {
            let reply = match parse_verse_ref(&arg) {
                Err(_) => messages::bookmark_usage(lang).to_string(),
                Ok(reference) => {
                    let removed = state
                        .store
                        .mutate(user, |p| Ok(p.remove_bookmark(&reference)))
                        .await?;
                    if removed {
                        messages::unbookmark_ok(lang, &reference)
                    } else {
                        messages::unbookmark_bad(lang, &reference)
                    }
                }
            };
            bot.send_message(chat, reply)
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Streak => {
            let today = Utc::now().date_naive();
            // Reading the streak also writes back lazy decay.
            let report = state
                .store
                .mutate(user, |p| {
                    if has_decayed(&p.streak, today) {
                        p.streak.current = 0;
                    }
                    Ok(current_streak(&p.streak, today))
                })
                .await?;
            bot.send_message(chat, messages::streak_report(lang, &report))
                .parse_mode(ParseMode::Html)
                .await?;
        }
        Command::Progress => {
            let read = state.store.get(user).await.read_items.len();
            bot.send_message(
                chat,
                messages::progress_report(lang, read, state.config.corpus_size),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Command::Lang => {
            bot.send_message(chat, format!("🌍 <b>{}</b>", lang.label()))
                .parse_mode(ParseMode::Html)
                .reply_markup(language_keyboard(lang))
                .await?;
        }
    }
    Ok(())
}

async fn handle_hadith(
    bot: &Bot,
    chat: ChatId,
    state: &Arc<BotState>,
    user: i64,
    lang: Language,
    keyword: &str,
) -> Result<()> {
    let keyword = if keyword.is_empty() {
        None
    } else {
        Some(keyword)
    };
    let waiting = bot.send_message(chat, messages::loading(lang)).await?;

    // "/hadith 2:13" is a direct book:number lookup, anything else a search.
    let fetched = match keyword {
        Some(arg) if looks_like_reference(arg) => state.content.fetch_by_reference(arg).await,
        _ => state.content.fetch_random(keyword).await,
    };
    let content = match fetched {
        Ok(content) => content,
        Err(e) => {
            bot.edit_message_text(chat, waiting.id, messages::error_text(lang, &e))
                .await?;
            return Ok(());
        }
    };

    record_shown(&state.store, user, &content).await?;
    let card = render_card(&state.cache, lang, messages::hadith_title(lang), &content).await;
    bot.edit_message_text(chat, waiting.id, card)
        .parse_mode(ParseMode::Html)
        .reply_markup(content_keyboard(lang))
        .await?;
    Ok(())
}

/// Interactive content display counts as reading: remember it for /fav, mark
/// it read for /progress, and touch the streak. Scheduled pushes go through
/// the delivery sink instead and do not touch the streak.
pub async fn record_shown(store: &ProfileStore, user: i64, content: &Content) -> Result<()> {
    let today = Utc::now().date_naive();
    store
        .mutate(user, |p| {
            p.last_shown = Some(LastShown {
                text: content.text.clone(),
                reference: content.reference.clone(),
            });
            p.mark_read(&content.reference);
            record_activity(&mut p.streak, today);
            Ok(())
        })
        .await
}

fn looks_like_reference(arg: &str) -> bool {
    arg.split_once(':').map_or(false, |(book, number)| {
        book.trim().parse::<u32>().is_ok() && number.trim().parse::<u32>().is_ok()
    })
}

/// Validate a `"surah:ayah"` locator, e.g. `"2:255"`.
pub fn parse_verse_ref(raw: &str) -> Result<String> {
    let invalid = || BotError::Validation(format!("bad reference {raw:?}, expected surah:ayah"));
    let (surah, ayah) = raw.trim().split_once(':').ok_or_else(invalid)?;
    let surah: u32 = surah.trim().parse().map_err(|_| invalid())?;
    let ayah: u32 = ayah.trim().parse().map_err(|_| invalid())?;
    if !(1..=114).contains(&surah) || ayah == 0 {
        return Err(invalid());
    }
    Ok(format!("{surah}:{ayah}"))
}
