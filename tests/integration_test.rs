#[cfg(test)]
mod tests {
    use hadith_companion_bot::*;

    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ---- test doubles ----

    /// Identity translator that counts provider invocations.
    struct StubTranslator {
        calls: AtomicUsize,
    }

    impl StubTranslator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranslationProvider for StubTranslator {
        async fn translate(&self, text: &str, _target: &str, _source: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.to_string())
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl TranslationProvider for FailingTranslator {
        async fn translate(&self, _text: &str, _target: &str, _source: &str) -> Result<String> {
            Err(BotError::Provider("stubbed outage".into()))
        }
    }

    /// Delivery sink that records nothing; registry tests only exercise
    /// trigger bookkeeping, never actual fires.
    struct NullSink;

    #[async_trait]
    impl DeliverySink for NullSink {
        async fn deliver_reminder(&self, _user: i64, _time: &str) {}
        async fn deliver_digest(&self, _user: i64) {}
    }

    fn test_store(dir: &TempDir) -> Arc<ProfileStore> {
        Arc::new(ProfileStore::load(dir.path().join("user_data.json")))
    }

    fn test_registry(store: Arc<ProfileStore>) -> ReminderRegistry {
        ReminderRegistry::new(store, Arc::new(NullSink))
    }

    // ---- streak calculator ----

    #[test]
    fn test_streak_same_day_idempotent() {
        let mut streak = StreakState::default();
        record_activity(&mut streak, day(2024, 1, 1));
        let once = streak.clone();
        record_activity(&mut streak, day(2024, 1, 1));
        assert_eq!(streak.current, once.current);
        assert_eq!(streak.max, once.max);
        assert_eq!(streak.last_active_date, once.last_active_date);
    }

    #[test]
    fn test_streak_continuity_and_gap_reset() {
        let mut streak = StreakState::default();
        record_activity(&mut streak, day(2024, 1, 1));
        assert_eq!(streak.current, 1);
        record_activity(&mut streak, day(2024, 1, 2));
        assert_eq!(streak.current, 2);
        assert_eq!(streak.max, 2);
        record_activity(&mut streak, day(2024, 1, 5));
        assert_eq!(streak.current, 1);
        assert_eq!(streak.max, 2);
    }

    #[test]
    fn test_streak_calendar_day_boundary() {
        // 23:59 and 00:01 are two minutes apart but two calendar days;
        // the streak extends. Documented behavior, not a bug.
        let mut streak = StreakState::default();
        let before_midnight = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let after_midnight = Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap();
        record_activity(&mut streak, before_midnight.date_naive());
        record_activity(&mut streak, after_midnight.date_naive());
        assert_eq!(streak.current, 2);
    }

    #[test]
    fn test_streak_lazy_decay_on_read() {
        let streak = StreakState {
            current: 5,
            max: 7,
            last_active_date: Some(day(2024, 1, 1)),
        };
        let report = current_streak(&streak, day(2024, 1, 4));
        assert_eq!(report.current, 0);
        assert_eq!(report.max, 7);
        assert!(!report.active_today);
        assert!(has_decayed(&streak, day(2024, 1, 4)));

        let fresh = current_streak(&streak, day(2024, 1, 2));
        assert_eq!(fresh.current, 5);
        let today = current_streak(&streak, day(2024, 1, 1));
        assert!(today.active_today);
    }

    // ---- time parsing and trigger arithmetic ----

    #[test]
    fn test_normalize_time() {
        assert_eq!(normalize_time("8:30").unwrap(), "08:30");
        assert_eq!(normalize_time("08:30").unwrap(), "08:30");
        assert_eq!(normalize_time("23:59").unwrap(), "23:59");
        assert_eq!(normalize_time(" 6:05 ").unwrap(), "06:05");
        assert!(matches!(normalize_time("24:00"), Err(BotError::Validation(_))));
        assert!(matches!(normalize_time("12:60"), Err(BotError::Validation(_))));
        assert!(matches!(normalize_time("0830"), Err(BotError::Validation(_))));
        assert!(matches!(normalize_time("morning"), Err(BotError::Validation(_))));
    }

    #[test]
    fn test_until_next_occurrence() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(
            until_next_occurrence(10, 30, now),
            Duration::from_secs(30 * 60)
        );
        // At or before now rolls to tomorrow.
        assert_eq!(
            until_next_occurrence(10, 0, now),
            Duration::from_secs(24 * 60 * 60)
        );
        assert_eq!(
            until_next_occurrence(9, 0, now),
            Duration::from_secs(23 * 60 * 60)
        );
    }

    #[test]
    fn test_parse_verse_ref() {
        assert_eq!(parse_verse_ref("2:255").unwrap(), "2:255");
        assert_eq!(parse_verse_ref(" 02:007 ").unwrap(), "2:7");
        assert!(parse_verse_ref("115:1").is_err());
        assert!(parse_verse_ref("2:0").is_err());
        assert!(parse_verse_ref("ayat").is_err());
    }

    // ---- profile store ----

    #[tokio::test]
    async fn test_store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_data.json");
        {
            let store = ProfileStore::load(&path);
            store
                .mutate(7, |p| {
                    p.language = Language::En;
                    p.add_bookmark("2:255");
                    Ok(())
                })
                .await
                .unwrap();
        }
        let reopened = ProfileStore::load(&path);
        let profile = reopened.get(7).await;
        assert_eq!(profile.language, Language::En);
        assert_eq!(profile.bookmarks, vec!["2:255".to_string()]);
        assert_eq!(reopened.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_store_corrupt_file_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_data.json");
        std::fs::write(&path, "{ this is not json").unwrap();
        let store = ProfileStore::load(&path);
        assert_eq!(store.user_count().await, 0);
        // Lazy default creation still works.
        let profile = store.get(1).await;
        assert_eq!(profile.language, Language::Ru);
        assert!(profile.favorites.is_empty());
    }

    #[tokio::test]
    async fn test_store_migrates_legacy_flat_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_data.json");
        std::fs::write(
            &path,
            r#"{"42": {"language": "tr", "bookmarks": ["1:1"]}}"#,
        )
        .unwrap();
        let store = ProfileStore::load(&path);
        let profile = store.get(42).await;
        assert_eq!(profile.language, Language::Tr);
        assert_eq!(profile.bookmarks, vec!["1:1".to_string()]);
        // Missing fields filled with defaults.
        assert_eq!(profile.next_favorite_id, 1);
        assert!(profile.reminders.is_empty());
    }

    #[tokio::test]
    async fn test_store_rejected_mutation_not_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_data.json");
        let store = ProfileStore::load(&path);
        store
            .mutate(1, |p| {
                p.add_bookmark("1:1");
                Ok(())
            })
            .await
            .unwrap();
        let result: Result<()> = store.mutate(1, |_| Err(BotError::Duplicate)).await;
        assert!(matches!(result, Err(BotError::Duplicate)));

        let reopened = ProfileStore::load(&path);
        assert_eq!(reopened.get(1).await.bookmarks.len(), 1);
    }

    // ---- favorites and bookmarks ----

    #[test]
    fn test_favorite_dedupe_by_reference() {
        let mut profile = UserProfile::default();
        // A brand-new profile hands out ids starting at 1, same as a record
        // deserialized without the counter field.
        assert_eq!(profile.next_favorite_id, 1);
        assert_eq!(profile.add_favorite("text", "Book 1, Hadith 1"), Some(1));
        assert_eq!(profile.add_favorite("other text", "Book 1, Hadith 1"), None);
        assert_eq!(profile.favorites.len(), 1);
    }

    #[test]
    fn test_favorite_ids_never_reused() {
        let mut profile = UserProfile::default();
        profile.add_favorite("a", "ref-a");
        profile.add_favorite("b", "ref-b");
        assert!(profile.remove_favorite(2));
        assert_eq!(profile.add_favorite("c", "ref-c"), Some(3));
        let ids: Vec<u32> = profile.favorites.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(!profile.remove_favorite(2));
    }

    #[test]
    fn test_bookmark_insertion_order_and_dedupe() {
        let mut profile = UserProfile::default();
        assert!(profile.add_bookmark("2:255"));
        assert!(profile.add_bookmark("1:1"));
        assert!(!profile.add_bookmark("2:255"));
        assert_eq!(profile.bookmarks, vec!["2:255", "1:1"]);
        assert!(profile.remove_bookmark("2:255"));
        assert!(!profile.remove_bookmark("2:255"));
    }

    // ---- reminder registry ----

    #[tokio::test]
    async fn test_duplicate_reminder_rejected_after_normalization() {
        let dir = TempDir::new().unwrap();
        let registry = test_registry(test_store(&dir));

        let first = registry.add_reminder(1, "08:30", "", None).await.unwrap();
        assert_eq!(first.time, "08:30");
        let second = registry.add_reminder(1, "8:30", "", None).await;
        assert!(matches!(second, Err(BotError::Duplicate)));
        assert_eq!(registry.reminders(1).await.len(), 1);
        assert_eq!(registry.trigger_count().await, 1);
    }

    #[tokio::test]
    async fn test_reminder_add_list_remove_scenario() {
        let dir = TempDir::new().unwrap();
        let registry = test_registry(test_store(&dir));

        assert!(registry.reminders(42).await.is_empty());
        let reminder = registry
            .add_reminder(42, "06:00", "Morning", None)
            .await
            .unwrap();
        assert_eq!(reminder.time, "06:00");
        assert_eq!(reminder.label, "Morning");

        let listed = registry.reminders(42).await;
        assert_eq!(listed.len(), 1);

        assert!(registry.remove_reminder(42, 1).await.unwrap());
        assert!(registry.reminders(42).await.is_empty());
        assert_eq!(registry.trigger_count().await, 0);

        // Out-of-range positions are a no-op.
        assert!(!registry.remove_reminder(42, 1).await.unwrap());
        assert!(!registry.remove_reminder(42, 0).await.unwrap());
    }

    #[tokio::test]
    async fn test_reminders_kept_sorted_by_time() {
        let dir = TempDir::new().unwrap();
        let registry = test_registry(test_store(&dir));
        registry.add_reminder(5, "12:00", "", None).await.unwrap();
        registry.add_reminder(5, "6:15", "", None).await.unwrap();
        registry.add_reminder(5, "09:30", "", None).await.unwrap();
        let times: Vec<String> = registry
            .reminders(5)
            .await
            .into_iter()
            .map(|r| r.time)
            .collect();
        assert_eq!(times, vec!["06:15", "09:30", "12:00"]);
    }

    #[tokio::test]
    async fn test_clear_all_cancels_every_trigger() {
        let dir = TempDir::new().unwrap();
        let registry = test_registry(test_store(&dir));
        registry.add_reminder(9, "07:00", "", None).await.unwrap();
        registry.add_reminder(9, "12:00", "", None).await.unwrap();
        registry.add_reminder(9, "21:45", "", None).await.unwrap();
        assert_eq!(registry.clear_all(9).await.unwrap(), 3);
        assert!(registry.reminders(9).await.is_empty());
        assert_eq!(registry.trigger_count().await, 0);
        assert_eq!(registry.clear_all(9).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_daily_digest_singleton_keeps_index() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        let registry = test_registry(store.clone());

        assert_eq!(registry.set_daily(3, "8:00").await.unwrap(), "08:00");
        assert_eq!(registry.trigger_count().await, 1);

        // Simulate a few fired digests advancing the index.
        store
            .mutate(3, |p| {
                if let Some(d) = p.daily_schedule.as_mut() {
                    d.sequential_index = 12;
                }
                Ok(())
            })
            .await
            .unwrap();

        // Moving the time keeps the singleton and the walk position.
        assert_eq!(registry.set_daily(3, "21:30").await.unwrap(), "21:30");
        assert_eq!(registry.trigger_count().await, 1);
        let schedule = store.get(3).await.daily_schedule.unwrap();
        assert_eq!(schedule.time, "21:30");
        assert_eq!(schedule.sequential_index, 12);

        assert!(registry.cancel_daily(3).await.unwrap());
        assert!(!registry.cancel_daily(3).await.unwrap());
        assert_eq!(registry.trigger_count().await, 0);
        assert!(registry.daily_time(3).await.is_none());
    }

    #[tokio::test]
    async fn test_restart_reload_registers_exactly_persisted_triggers() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("user_data.json");
        {
            let store = Arc::new(ProfileStore::load(&path));
            let registry = test_registry(store);
            registry.add_reminder(1, "06:00", "fajr", None).await.unwrap();
            registry.add_reminder(1, "20:00", "", None).await.unwrap();
            registry.add_reminder(2, "09:15", "", None).await.unwrap();
            registry.set_daily(2, "07:00").await.unwrap();
        }

        // Fresh process: registry starts empty and reloads from storage.
        let store = Arc::new(ProfileStore::load(&path));
        let registry = test_registry(store);
        assert_eq!(registry.trigger_count().await, 0);
        let (digests, reminders) = registry.reload().await;
        assert_eq!(digests, 1);
        assert_eq!(reminders, 3);
        assert_eq!(registry.trigger_count().await, 4);

        // Reloading again replaces rather than duplicates.
        registry.reload().await;
        assert_eq!(registry.trigger_count().await, 4);
    }

    // ---- translation cache ----

    fn test_cache(
        dir: &TempDir,
        provider: Arc<dyn TranslationProvider>,
        capacity: Option<usize>,
    ) -> TranslationCache {
        TranslationCache::load(dir.path().join("cache.json"), provider, capacity, 1000)
    }

    #[tokio::test]
    async fn test_translate_identity_short_circuit() {
        let dir = TempDir::new().unwrap();
        let stub = StubTranslator::new();
        let cache = test_cache(&dir, stub.clone(), None);

        let result = cache.translate("hello world", "en", "en").await;
        assert_eq!(result.text, "hello world");
        assert!(!result.degraded);
        assert_eq!(stub.calls(), 0);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_translate_cache_hit_calls_provider_once() {
        let dir = TempDir::new().unwrap();
        let stub = StubTranslator::new();
        let cache = test_cache(&dir, stub.clone(), None);

        let first = cache.translate("sabr is patience", "ru", "en").await;
        let second = cache.translate("sabr is patience", "ru", "en").await;
        assert_eq!(first, second);
        assert_eq!(stub.calls(), 1);

        // A different language pair is a different key.
        cache.translate("sabr is patience", "tr", "en").await;
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_chunked_translation_reassembles_exactly() {
        let dir = TempDir::new().unwrap();
        let stub = StubTranslator::new();
        let cache = test_cache(&dir, stub.clone(), None).with_chunk_limit(24);

        let text = "first paragraph here\n\nsecond one follows\n\nthird and final paragraph";
        let result = cache.translate(text, "ru", "en").await;
        assert_eq!(result.text, text);
        assert!(!result.degraded);
        assert!(stub.calls() > 1, "expected per-chunk provider calls");

        // Chunks were cached individually, so a repeat costs nothing.
        let calls_before = stub.calls();
        cache.translate(text, "ru", "en").await;
        assert_eq!(stub.calls(), calls_before);
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_to_passthrough() {
        let dir = TempDir::new().unwrap();
        let cache = test_cache(&dir, Arc::new(FailingTranslator), None);

        let result = cache.translate("untranslatable", "ru", "en").await;
        assert_eq!(result.text, "untranslatable");
        assert!(result.degraded);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_cache_capacity_evicts_fifo() {
        let dir = TempDir::new().unwrap();
        let stub = StubTranslator::new();
        let cache = test_cache(&dir, stub.clone(), Some(2));

        cache.translate("one", "ru", "en").await;
        cache.translate("two", "ru", "en").await;
        cache.translate("three", "ru", "en").await;
        assert_eq!(cache.len().await, 2);

        // The oldest entry was evicted; asking again re-invokes the provider.
        let calls_before = stub.calls();
        cache.translate("one", "ru", "en").await;
        assert_eq!(stub.calls(), calls_before + 1);
    }

    #[tokio::test]
    async fn test_cache_flush_and_reload() {
        let dir = TempDir::new().unwrap();
        let stub = StubTranslator::new();
        {
            let cache = test_cache(&dir, stub.clone(), None);
            cache.translate("persist me", "ru", "en").await;
            cache.flush().await.unwrap();
        }
        let reopened = test_cache(&dir, stub.clone(), None);
        assert_eq!(reopened.len().await, 1);
        let calls_before = stub.calls();
        reopened.translate("persist me", "ru", "en").await;
        assert_eq!(stub.calls(), calls_before);
    }

    #[test]
    fn test_split_chunks_respects_word_boundaries() {
        let text = "alpha beta gamma delta\n\nepsilon zeta eta theta iota kappa";
        let chunks = split_chunks(text, 16);

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), text, "chunks must reassemble exactly");
        for pair in chunks.windows(2) {
            let boundary_ok = pair[0].ends_with(char::is_whitespace)
                || pair[1].starts_with(char::is_whitespace);
            assert!(boundary_ok, "split fell inside a word: {:?}", pair);
        }
    }

    #[test]
    fn test_split_chunks_short_text_is_single_chunk() {
        let chunks = split_chunks("short", 100);
        assert_eq!(chunks, vec!["short".to_string()]);
    }

    // ---- formatting helpers ----

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        let truncated = truncate_chars("привет мир", 7);
        assert_eq!(truncated.chars().count(), 7);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(
            messages::progress_bar(0.0, 10),
            "[░░░░░░░░░░] 0.0%"
        );
        assert_eq!(
            messages::progress_bar(50.0, 10),
            "[█████░░░░░] 50.0%"
        );
        // Out-of-range input clamps instead of panicking.
        assert_eq!(
            messages::progress_bar(250.0, 10),
            "[██████████] 100.0%"
        );
    }
}
