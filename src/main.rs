use std::error::Error;
use std::sync::Arc;

use teloxide::prelude::*;

use crate::commands::Command;
use crate::config::Config;
use crate::handlers::{callback_handler, command_handler, BotDelivery};
use crate::providers::{load_fallback_corpus, BukhariApi, ContentProvider, ImageProvider, PexelsImages};
use crate::schedule::ReminderRegistry;
use crate::state::{BotState, ProfileStore};
use crate::translate::{GoogleWebTranslator, TranslationCache};

mod commands;
mod config;
mod error;
mod handlers;
mod keyboard;
mod messages;
mod providers;
mod schedule;
mod state;
mod streak;
mod translate;
mod types;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting hadith companion bot...");

    let config = Config::from_env();
    let bot = Bot::from_env();

    let fallback = match load_fallback_corpus(&config.fallback_corpus_path) {
        Ok(corpus) => {
            log::info!("Loaded {} fallback hadiths", corpus.len());
            corpus
        }
        Err(e) => {
            log::warn!("Fallback corpus unavailable: {}. Continuing without it.", e);
            Vec::new()
        }
    };

    let store = Arc::new(ProfileStore::load(&config.profiles_path));
    log::info!("Loaded profiles for {} users", store.user_count().await);

    let translator = Arc::new(GoogleWebTranslator::new(config.request_timeout)?);
    let cache = Arc::new(TranslationCache::load(
        &config.translation_cache_path,
        translator,
        config.cache_capacity,
        config.cache_flush_every,
    ));
    log::info!("Translation cache holds {} entries", cache.len().await);

    let content: Arc<dyn ContentProvider> = Arc::new(BukhariApi::new(
        config.hadith_api_base.clone(),
        config.hadith_sections,
        config.request_timeout,
        fallback,
    )?);
    let images: Arc<dyn ImageProvider> = Arc::new(PexelsImages::new(
        config.pexels_api_key.clone(),
        config.request_timeout,
    )?);

    let delivery = Arc::new(BotDelivery::new(
        bot.clone(),
        store.clone(),
        cache.clone(),
        content.clone(),
        images,
    ));
    let registry = Arc::new(ReminderRegistry::new(store.clone(), delivery));

    // Persisted triggers must be live again before the dispatcher starts,
    // otherwise reminders silently stop surviving restarts.
    let (digests, reminders) = registry.reload().await;
    log::info!(
        "Re-registered {} daily digests and {} reminders",
        digests,
        reminders
    );

    tokio::spawn(cache.clone().flush_periodically(config.cache_flush_interval));

    let state = Arc::new(BotState {
        config,
        store,
        cache,
        content,
        registry,
    });

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(
                    |bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>| async move {
                        command_handler(bot, msg, cmd, state).await
                    },
                ),
        )
        .branch(Update::filter_callback_query().endpoint(
            |bot: Bot, q: CallbackQuery, state: Arc<BotState>| async move {
                callback_handler(bot, q, state).await
            },
        ));

    log::info!("Starting command dispatching...");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
