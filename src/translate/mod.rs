use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{BotError, Result};

/// External machine-translation service. Implementations must treat timeouts
/// as errors, never leave a call pending.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(&self, text: &str, target: &str, source: &str) -> Result<String>;
}

/// Result of a cache-mediated translation. `degraded` means the provider
/// failed and the original text came back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub text: String,
    pub degraded: bool,
}

/// Texts longer than this are split on paragraph boundaries before hitting
/// the provider, bounding payload size and maximizing cache reuse.
pub const DEFAULT_CHUNK_LIMIT: usize = 3500;

struct CacheInner {
    map: HashMap<String, String>,
    /// Insertion order, used for FIFO eviction when a capacity is set.
    order: VecDeque<String>,
    dirty: usize,
}

/// Content-addressed translation cache with write-behind persistence.
///
/// Entries are keyed by a hash of `(source, target, text)`, so only exact
/// text matches hit. Persistence is best-effort: the cache flushes after
/// every `flush_every` new entries and on a periodic timer.
pub struct TranslationCache {
    path: PathBuf,
    provider: Arc<dyn TranslationProvider>,
    inner: Mutex<CacheInner>,
    capacity: Option<usize>,
    flush_every: usize,
    chunk_limit: usize,
}

impl TranslationCache {
    /// Load persisted entries from `path`; missing or corrupt files start an
    /// empty cache.
    pub fn load(
        path: impl AsRef<Path>,
        provider: Arc<dyn TranslationProvider>,
        capacity: Option<usize>,
        flush_every: usize,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = read_entries(&path);
        let order = map.keys().cloned().collect();
        Self {
            path,
            provider,
            inner: Mutex::new(CacheInner {
                map,
                order,
                dirty: 0,
            }),
            capacity,
            flush_every: flush_every.max(1),
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }

    pub fn with_chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit.max(1);
        self
    }

    /// Translate `text` from `source` to `target`, consulting the cache per
    /// chunk. On any provider failure the whole operation degrades to
    /// returning the original text unchanged.
    pub async fn translate(&self, text: &str, target: &str, source: &str) -> Translated {
        if target == source && source != "auto" {
            return Translated {
                text: text.to_string(),
                degraded: false,
            };
        }

        let chunks = split_chunks(text, self.chunk_limit);
        let mut out = String::with_capacity(text.len());
        let mut fresh: Vec<(String, String)> = Vec::new();

        for chunk in &chunks {
            let key = cache_key(source, target, chunk);
            let hit = {
                let inner = self.inner.lock().await;
                inner.map.get(&key).cloned()
            };
            let translated = match hit {
                Some(value) => value,
                None => match self.provider.translate(chunk, target, source).await {
                    Ok(value) => {
                        fresh.push((key, value.clone()));
                        value
                    }
                    Err(e) => {
                        log::warn!(
                            "Translation {}->{} failed: {}. Returning original text.",
                            source,
                            target,
                            e
                        );
                        return Translated {
                            text: text.to_string(),
                            degraded: true,
                        };
                    }
                },
            };
            out.push_str(&translated);
        }

        if !fresh.is_empty() {
            self.store(fresh).await;
        }
        Translated {
            text: out,
            degraded: false,
        }
    }

    async fn store(&self, entries: Vec<(String, String)>) {
        let mut inner = self.inner.lock().await;
        for (key, value) in entries {
            if inner.map.insert(key.clone(), value).is_none() {
                inner.order.push_back(key);
                inner.dirty += 1;
            }
        }
        if let Some(cap) = self.capacity {
            while inner.map.len() > cap {
                match inner.order.pop_front() {
                    Some(oldest) => {
                        inner.map.remove(&oldest);
                    }
                    None => break,
                }
            }
        }
        if inner.dirty >= self.flush_every {
            if let Err(e) = flush_locked(&self.path, &mut inner).await {
                log::warn!("Translation cache flush failed: {}", e);
            }
        }
    }

    /// Force-write pending entries to disk.
    pub async fn flush(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        flush_locked(&self.path, &mut inner).await
    }

    /// Flush on an interval forever; spawned as a background task.
    pub async fn flush_periodically(self: Arc<Self>, every: Duration) {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = self.flush().await {
                log::warn!("Periodic cache flush failed: {}", e);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn cache_key(source: &str, target: &str, text: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(source.as_bytes());
    hasher.update(&[0x1f]);
    hasher.update(target.as_bytes());
    hasher.update(&[0x1f]);
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

fn read_entries(path: &Path) -> HashMap<String, String> {
    if !path.exists() {
        return HashMap::new();
    }
    match fs::read_to_string(path) {
        Ok(json) => match serde_json::from_str(&json) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("Corrupt translation cache {}: {}. Starting empty.", path.display(), e);
                HashMap::new()
            }
        },
        Err(e) => {
            log::warn!("Failed to read {}: {}. Starting empty.", path.display(), e);
            HashMap::new()
        }
    }
}

async fn flush_locked(path: &Path, inner: &mut CacheInner) -> Result<()> {
    let ordered: BTreeMap<&String, &String> = inner.map.iter().collect();
    let json = serde_json::to_string_pretty(&ordered)?;
    let temp_path = path.with_extension("tmp.json");
    let mut temp = File::create(&temp_path).await?;
    temp.write_all(json.as_bytes()).await?;
    temp.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;
    inner.dirty = 0;
    Ok(())
}

/// Split `text` into chunks of at most `limit` characters, preferring
/// paragraph boundaries and never breaking inside a word. Separators stay
/// attached to their chunk, so concatenating the chunks reproduces the input
/// exactly.
pub fn split_chunks(text: &str, limit: usize) -> Vec<String> {
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut buf = String::new();
    let mut buf_len = 0usize;

    for para in text.split_inclusive("\n\n") {
        let para_len = para.chars().count();
        if para_len > limit {
            if !buf.is_empty() {
                chunks.push(std::mem::take(&mut buf));
                buf_len = 0;
            }
            split_words(para, limit, &mut chunks);
            continue;
        }
        if buf_len + para_len > limit && !buf.is_empty() {
            chunks.push(std::mem::take(&mut buf));
            buf_len = 0;
        }
        buf.push_str(para);
        buf_len += para_len;
    }
    if !buf.is_empty() {
        chunks.push(buf);
    }
    chunks
}

fn split_words(text: &str, limit: usize, out: &mut Vec<String>) {
    let mut buf = String::new();
    let mut buf_len = 0usize;
    for word in text.split_inclusive(char::is_whitespace) {
        let word_len = word.chars().count();
        if buf_len + word_len > limit && !buf.is_empty() {
            out.push(std::mem::take(&mut buf));
            buf_len = 0;
        }
        buf.push_str(word);
        buf_len += word_len;
    }
    if !buf.is_empty() {
        out.push(buf);
    }
}

/// Translator over the public Google translate web endpoint, the same
/// service the original deployment used.
pub struct GoogleWebTranslator {
    client: reqwest::Client,
}

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

impl GoogleWebTranslator {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Provider(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TranslationProvider for GoogleWebTranslator {
    async fn translate(&self, text: &str, target: &str, source: &str) -> Result<String> {
        let response = self
            .client
            .get(GOOGLE_TRANSLATE_URL)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| BotError::Provider(e.to_string()))?
            .error_for_status()
            .map_err(|e| BotError::Provider(e.to_string()))?;

        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BotError::Provider(e.to_string()))?;

        // Response shape: [[["translated", "original", ...], ...], ...]
        let segments = value
            .get(0)
            .and_then(|v| v.as_array())
            .ok_or_else(|| BotError::Provider("unexpected response shape".into()))?;
        let mut out = String::new();
        for segment in segments {
            if let Some(part) = segment.get(0).and_then(|v| v.as_str()) {
                out.push_str(part);
            }
        }
        if out.is_empty() {
            return Err(BotError::Provider("empty translation".into()));
        }
        Ok(out)
    }
}
