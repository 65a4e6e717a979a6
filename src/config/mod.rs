use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, read once at startup. Every knob has a default so
/// the bot runs with just TELOXIDE_TOKEN set.
#[derive(Debug, Clone)]
pub struct Config {
    pub profiles_path: PathBuf,
    pub translation_cache_path: PathBuf,
    pub fallback_corpus_path: PathBuf,
    /// Section-file endpoint of the Bukhari edition, `{base}/{section}.json`.
    pub hadith_api_base: String,
    pub hadith_sections: u32,
    /// Total hadiths in the corpus, for the /progress percentage.
    pub corpus_size: u32,
    pub pexels_api_key: Option<String>,
    pub request_timeout: Duration,
    /// FIFO cap on translation-cache entries. Unbounded when unset.
    pub cache_capacity: Option<usize>,
    /// Flush the translation cache to disk after this many new entries.
    pub cache_flush_every: usize,
    pub cache_flush_interval: Duration,
}

const DEFAULT_HADITH_API_BASE: &str =
    "https://cdn.jsdelivr.net/gh/fawazahmed0/hadith-api@1/editions/eng-bukhari/sections";

impl Config {
    pub fn from_env() -> Self {
        Self {
            profiles_path: env_path("USER_DATA_FILE", "user_data.json"),
            translation_cache_path: env_path("TRANSLATION_CACHE_FILE", "translation_cache.json"),
            fallback_corpus_path: env_path("FALLBACK_CORPUS_FILE", "fallback_hadiths.csv"),
            hadith_api_base: std::env::var("HADITH_API_BASE")
                .unwrap_or_else(|_| DEFAULT_HADITH_API_BASE.to_string()),
            hadith_sections: env_num("HADITH_SECTIONS", 97),
            corpus_size: env_num("HADITH_CORPUS_SIZE", 7563),
            pexels_api_key: std::env::var("PEXELS_API_KEY").ok().filter(|k| !k.is_empty()),
            request_timeout: Duration::from_secs(env_num("REQUEST_TIMEOUT_SECS", 10)),
            cache_capacity: std::env::var("TRANSLATION_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok()),
            cache_flush_every: env_num("TRANSLATION_CACHE_FLUSH_EVERY", 16),
            cache_flush_interval: Duration::from_secs(env_num(
                "TRANSLATION_CACHE_FLUSH_SECS",
                300,
            )),
        }
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

fn env_num<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
