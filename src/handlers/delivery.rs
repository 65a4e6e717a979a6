use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};

use crate::error::Result;
use crate::keyboard::content_keyboard;
use crate::messages;
use crate::providers::{ContentProvider, ImageProvider};
use crate::schedule::DeliverySink;
use crate::state::ProfileStore;
use crate::translate::TranslationCache;
use crate::types::{Content, Language, LastShown};

/// Telegram message body limit; photo captions are shorter.
pub const MESSAGE_LIMIT: usize = 4096;
const CAPTION_LIMIT: usize = 1024;

/// Content items arrive in English from the provider and are translated into
/// the user's language on render.
const CONTENT_SOURCE_LANG: &str = "en";

/// Render a hadith card as Telegram HTML, translating the body into the
/// user's language through the cache.
pub async fn render_card(
    cache: &TranslationCache,
    lang: Language,
    title: &str,
    content: &Content,
) -> String {
    let translated = cache
        .translate(&content.text, lang.code(), CONTENT_SOURCE_LANG)
        .await;
    let card = format!(
        "<b>{}</b>\n\n<i>{}</i>\n\n— <i>{}</i>",
        title, translated.text, content.reference
    );
    truncate_chars(&card, MESSAGE_LIMIT)
}

/// Char-safe truncation with an ellipsis marker.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Production delivery: fetches content, translates, and sends via Telegram.
/// Used both by scheduled triggers (through `DeliverySink`) and shared with
/// the interactive handlers for formatting.
pub struct BotDelivery {
    bot: Bot,
    store: Arc<ProfileStore>,
    cache: Arc<TranslationCache>,
    content: Arc<dyn ContentProvider>,
    images: Arc<dyn ImageProvider>,
}

impl BotDelivery {
    pub fn new(
        bot: Bot,
        store: Arc<ProfileStore>,
        cache: Arc<TranslationCache>,
        content: Arc<dyn ContentProvider>,
        images: Arc<dyn ImageProvider>,
    ) -> Self {
        Self {
            bot,
            store,
            cache,
            content,
            images,
        }
    }

    /// Send a card, as a photo with caption when a background image is
    /// available and the text fits a caption, otherwise as plain text.
    async fn send_card(&self, user: i64, lang: Language, text: &str) -> Result<()> {
        let chat = ChatId(user);
        if text.chars().count() <= CAPTION_LIMIT {
            if let Some(url) = self.images.background_url(None).await {
                if let Ok(url) = reqwest::Url::parse(&url) {
                    match self
                        .bot
                        .send_photo(chat, InputFile::url(url))
                        .caption(text.to_string())
                        .parse_mode(ParseMode::Html)
                        .reply_markup(content_keyboard(lang))
                        .await
                    {
                        Ok(_) => return Ok(()),
                        Err(e) => {
                            log::warn!("Photo card to {} failed: {}. Sending text.", user, e);
                        }
                    }
                }
            }
        }
        self.bot
            .send_message(chat, text.to_string())
            .parse_mode(ParseMode::Html)
            .reply_markup(content_keyboard(lang))
            .await?;
        Ok(())
    }

    async fn send_reminder(&self, user: i64, time: &str) -> Result<()> {
        let profile = self.store.get(user).await;
        // The reminder may have been removed since the trigger armed.
        let Some(reminder) = profile
            .reminders
            .iter()
            .find(|r| r.time == time && r.active)
            .cloned()
        else {
            return Ok(());
        };

        let content = match &reminder.topic {
            Some(topic) => match self.content.fetch_random(Some(topic)).await {
                Ok(content) => content,
                Err(crate::error::BotError::NotFound) => self.content.fetch_random(None).await?,
                Err(e) => return Err(e),
            },
            None => self.content.fetch_random(None).await?,
        };

        self.store
            .mutate(user, |p| {
                p.last_shown = Some(LastShown {
                    text: content.text.clone(),
                    reference: content.reference.clone(),
                });
                Ok(())
            })
            .await?;

        let title = messages::reminder_title(profile.language, &reminder.label);
        let card = render_card(&self.cache, profile.language, &title, &content).await;
        self.send_card(user, profile.language, &card).await?;
        log::info!("Reminder delivered: user={} time={}", user, time);
        Ok(())
    }

    async fn send_digest(&self, user: i64) -> Result<()> {
        let profile = self.store.get(user).await;
        let Some(schedule) = profile.daily_schedule.clone() else {
            return Ok(());
        };

        let content = self
            .content
            .fetch_sequential(schedule.sequential_index)
            .await?;

        self.store
            .mutate(user, |p| {
                if let Some(d) = p.daily_schedule.as_mut() {
                    d.sequential_index = d.sequential_index.wrapping_add(1);
                }
                p.last_shown = Some(LastShown {
                    text: content.text.clone(),
                    reference: content.reference.clone(),
                });
                Ok(())
            })
            .await?;

        let title = messages::daily_title(profile.language);
        let card = render_card(&self.cache, profile.language, title, &content).await;
        self.send_card(user, profile.language, &card).await?;
        log::info!(
            "Daily digest delivered: user={} index={}",
            user,
            schedule.sequential_index
        );
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for BotDelivery {
    async fn deliver_reminder(&self, user: i64, time: &str) {
        // A failed delivery never deregisters the trigger; it waits for the
        // next occurrence.
        if let Err(e) = self.send_reminder(user, time).await {
            log::error!("Reminder delivery failed: user={} time={}: {}", user, time, e);
        }
    }

    async fn deliver_digest(&self, user: i64) {
        if let Err(e) = self.send_digest(user).await {
            log::error!("Daily digest delivery failed: user={}: {}", user, e);
        }
    }
}
