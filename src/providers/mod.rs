use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{BotError, Result};
use crate::types::Content;

/// Black-box scripture/hadith lookup service.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// A random item, optionally filtered by keyword. Keyword misses return
    /// `NotFound`.
    async fn fetch_random(&self, keyword: Option<&str>) -> Result<Content>;
    /// Lookup by `"book:number"` reference.
    async fn fetch_by_reference(&self, reference: &str) -> Result<Content>;
    /// Deterministic walk of the corpus for the daily digest.
    async fn fetch_sequential(&self, index: u32) -> Result<Content>;
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    #[serde(default)]
    hadiths: Vec<ApiHadith>,
}

#[derive(Debug, Deserialize)]
struct ApiHadith {
    #[serde(default)]
    hadithnumber: Option<u32>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    reference: Option<ApiReference>,
}

#[derive(Debug, Deserialize)]
struct ApiReference {
    #[serde(default)]
    book: Option<u32>,
}

/// Sahih al-Bukhari over the fawazahmed0 hadith CDN. One JSON file per
/// section (book); network failures fall back to the bundled offline corpus.
pub struct BukhariApi {
    client: reqwest::Client,
    base: String,
    sections: u32,
    fallback: Vec<Content>,
}

/// Sections sampled per keyword search; the corpus is too large to scan whole
/// on every query.
const KEYWORD_SECTION_SAMPLES: usize = 10;

impl BukhariApi {
    pub fn new(
        base: String,
        sections: u32,
        timeout: Duration,
        fallback: Vec<Content>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            base,
            sections: sections.max(1),
            fallback,
        })
    }

    /// All hadiths of one section. Errors are logged and read as an empty
    /// section so a single bad fetch never fails a whole operation.
    async fn fetch_section(&self, section: u32) -> Vec<ApiHadith> {
        let url = format!("{}/{}.json", self.base, section);
        let result = async {
            let response = self
                .client
                .get(&url)
                .send()
                .await?
                .error_for_status()?;
            response.json::<ApiSection>().await
        }
        .await;
        match result {
            Ok(body) => body.hadiths,
            Err(e) => {
                log::warn!("Hadith API section {} error: {}", section, e);
                Vec::new()
            }
        }
    }

    fn fallback_content(&self) -> Content {
        let mut rng = rand::thread_rng();
        self.fallback
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| Content {
                text: "Actions are judged by intentions, so each man will have what he intended."
                    .to_string(),
                reference: "Sahih al-Bukhari, Book 1, Hadith 1".to_string(),
            })
    }
}

fn parse_hadith(h: &ApiHadith, section: u32) -> Content {
    let book = h.reference.as_ref().and_then(|r| r.book).unwrap_or(section);
    let number = h
        .hadithnumber
        .map(|n| n.to_string())
        .unwrap_or_else(|| "?".to_string());
    Content {
        text: h.text.clone(),
        reference: format!("Sahih al-Bukhari — Book {}, Hadith {}", book, number),
    }
}

#[async_trait]
impl ContentProvider for BukhariApi {
    async fn fetch_random(&self, keyword: Option<&str>) -> Result<Content> {
        if let Some(keyword) = keyword {
            let needle = keyword.to_lowercase();
            let mut sections: Vec<u32> = (1..=self.sections).collect();
            sections.shuffle(&mut rand::thread_rng());
            for section in sections.into_iter().take(KEYWORD_SECTION_SAMPLES) {
                let hadiths = self.fetch_section(section).await;
                let matches: Vec<&ApiHadith> = hadiths
                    .iter()
                    .filter(|h| h.text.to_lowercase().contains(&needle))
                    .collect();
                if let Some(h) = matches.choose(&mut rand::thread_rng()) {
                    return Ok(parse_hadith(h, section));
                }
            }
            return Err(BotError::NotFound);
        }

        let section = rand::thread_rng().gen_range(1..=self.sections);
        let hadiths = self.fetch_section(section).await;
        match hadiths.choose(&mut rand::thread_rng()) {
            Some(h) => Ok(parse_hadith(h, section)),
            None => Ok(self.fallback_content()),
        }
    }

    async fn fetch_by_reference(&self, reference: &str) -> Result<Content> {
        let (book, number) = reference
            .split_once(':')
            .ok_or_else(|| BotError::Validation(format!("bad reference {reference:?}")))?;
        let book: u32 = book
            .trim()
            .parse()
            .map_err(|_| BotError::Validation(format!("bad reference {reference:?}")))?;
        let number: u32 = number
            .trim()
            .parse()
            .map_err(|_| BotError::Validation(format!("bad reference {reference:?}")))?;

        let hadiths = self.fetch_section(book).await;
        hadiths
            .iter()
            .find(|h| h.hadithnumber == Some(number))
            .map(|h| parse_hadith(h, book))
            .ok_or(BotError::NotFound)
    }

    async fn fetch_sequential(&self, index: u32) -> Result<Content> {
        let section = (index % self.sections) + 1;
        let hadiths = self.fetch_section(section).await;
        if hadiths.is_empty() {
            return Ok(self.fallback_content());
        }
        let h = &hadiths[index as usize % hadiths.len()];
        Ok(parse_hadith(h, section))
    }
}

#[derive(Debug, Deserialize)]
struct FallbackRecord {
    text: String,
    reference: String,
}

/// Load the offline fallback corpus shipped next to the binary.
pub fn load_fallback_corpus(path: &Path) -> Result<Vec<Content>> {
    let mut corpus = Vec::new();
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| BotError::Provider(format!("fallback corpus: {e}")))?;
    for record in reader.deserialize() {
        let record: FallbackRecord =
            record.map_err(|e| BotError::Provider(format!("fallback corpus: {e}")))?;
        corpus.push(Content {
            text: record.text,
            reference: record.reference,
        });
    }
    Ok(corpus)
}

/// Background-image lookup for photo cards. Callers send text-only when no
/// URL comes back.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn background_url(&self, keywords: Option<&str>) -> Option<String>;
}

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";
const MIN_IMAGE_SIDE: u64 = 2048;
const RECENT_RING: usize = 40;

const IMAGE_QUERIES: &[&str] = &[
    "islam quran mosque prayer",
    "quran islamic calligraphy arabic",
    "muslim prayer mosque interior",
    "islamic architecture mosque dome minaret",
    "islamic geometric arabesque pattern",
];

const FALLBACK_IMAGES: &[&str] = &[
    "https://images.pexels.com/photos/1619317/pexels-photo-1619317.jpeg?auto=compress&cs=tinysrgb&h=2160&w=3840",
    "https://images.pexels.com/photos/724916/pexels-photo-724916.jpeg?auto=compress&cs=tinysrgb&h=2160&w=3840",
    "https://images.pexels.com/photos/2781760/pexels-photo-2781760.jpeg?auto=compress&cs=tinysrgb&h=2160&w=3840",
];

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    #[serde(default)]
    width: u64,
    #[serde(default)]
    height: u64,
    src: Option<PexelsSrc>,
}

#[derive(Debug, Deserialize)]
struct PexelsSrc {
    original: Option<String>,
    large2x: Option<String>,
    large: Option<String>,
}

/// Pexels-backed image provider with a recently-served ring so consecutive
/// cards do not repeat the same background.
pub struct PexelsImages {
    client: reqwest::Client,
    api_key: Option<String>,
    recent: Mutex<VecDeque<String>>,
}

impl PexelsImages {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BotError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            recent: Mutex::new(VecDeque::with_capacity(RECENT_RING)),
        })
    }

    async fn query_pexels(&self, key: &str, query: &str) -> Vec<String> {
        let page = rand::thread_rng().gen_range(1..=30).to_string();
        let result = async {
            let response = self
                .client
                .get(PEXELS_SEARCH_URL)
                .header("Authorization", key)
                .query(&[
                    ("query", query),
                    ("per_page", "80"),
                    ("page", &page),
                    ("size", "large"),
                ])
                .send()
                .await?
                .error_for_status()?;
            response.json::<PexelsResponse>().await
        }
        .await;

        let photos = match result {
            Ok(body) => body.photos,
            Err(e) => {
                log::warn!("Pexels query error: {}", e);
                return Vec::new();
            }
        };
        photos
            .into_iter()
            .filter(|p| p.width >= MIN_IMAGE_SIDE && p.height >= MIN_IMAGE_SIDE)
            .filter_map(|p| {
                p.src
                    .and_then(|s| s.original.or(s.large2x).or(s.large))
            })
            .collect()
    }

    async fn remember_and_pick(&self, urls: Vec<String>) -> Option<String> {
        if urls.is_empty() {
            return None;
        }
        let mut recent = self.recent.lock().await;
        let fresh: Vec<&String> = urls.iter().filter(|u| !recent.contains(*u)).collect();
        let picked = if fresh.is_empty() {
            urls.choose(&mut rand::thread_rng())?.clone()
        } else {
            (*fresh.choose(&mut rand::thread_rng())?).clone()
        };
        if recent.len() == RECENT_RING {
            recent.pop_front();
        }
        recent.push_back(picked.clone());
        Some(picked)
    }
}

#[async_trait]
impl ImageProvider for PexelsImages {
    async fn background_url(&self, keywords: Option<&str>) -> Option<String> {
        if let Some(key) = self.api_key.clone() {
            let query = match keywords {
                Some(k) => k.to_string(),
                None => IMAGE_QUERIES
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(IMAGE_QUERIES[0])
                    .to_string(),
            };
            let urls = self.query_pexels(&key, &query).await;
            if let Some(url) = self.remember_and_pick(urls).await {
                return Some(url);
            }
        }
        let pool: Vec<String> = FALLBACK_IMAGES.iter().map(|u| u.to_string()).collect();
        self.remember_and_pick(pool).await
    }
}
