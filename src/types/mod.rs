use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
    Tr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Ru => "ru",
            Language::En => "en",
            Language::Tr => "tr",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            "tr" => Some(Language::Tr),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::Ru => "🇷🇺 Русский",
            Language::En => "🇬🇧 English",
            Language::Tr => "🇹🇷 Türkçe",
        }
    }

    pub fn all() -> [Language; 3] {
        [Language::Ru, Language::En, Language::Tr]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: u32,
    pub text: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    /// Zero-padded "HH:MM"; unique per user.
    pub time: String,
    #[serde(default)]
    pub label: String,
    /// Optional topic keyword used to pick the content at fire time.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySchedule {
    pub time: String,
    /// Walks the corpus sequentially; incremented after every successful fire.
    #[serde(default)]
    pub sequential_index: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakState {
    #[serde(default)]
    pub current: u32,
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub last_active_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastShown {
    pub text: String,
    pub reference: String,
}

/// One record per user, created lazily with defaults on first access and
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
    /// Monotonic favorite id counter; ids are never reused after removal.
    #[serde(default = "first_favorite_id")]
    pub next_favorite_id: u32,
    #[serde(default)]
    pub bookmarks: Vec<String>,
    #[serde(default)]
    pub read_items: Vec<String>,
    #[serde(default)]
    pub streak: StreakState,
    /// Sorted ascending by time; zero-padded strings sort chronologically.
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    #[serde(default)]
    pub daily_schedule: Option<DailySchedule>,
    #[serde(default)]
    pub last_shown: Option<LastShown>,
}

fn first_favorite_id() -> u32 {
    1
}

// Derived Default would start the id counter at 0; fresh profiles must match
// records deserialized without the field.
impl Default for UserProfile {
    fn default() -> Self {
        Self {
            language: Language::default(),
            favorites: Vec::new(),
            next_favorite_id: first_favorite_id(),
            bookmarks: Vec::new(),
            read_items: Vec::new(),
            streak: StreakState::default(),
            reminders: Vec::new(),
            daily_schedule: None,
            last_shown: None,
        }
    }
}

impl UserProfile {
    /// Add to favorites, deduped by reference. Returns the assigned id, or
    /// `None` when the reference is already saved.
    pub fn add_favorite(&mut self, text: &str, reference: &str) -> Option<u32> {
        if self.favorites.iter().any(|f| f.reference == reference) {
            return None;
        }
        let id = self.next_favorite_id;
        self.next_favorite_id += 1;
        self.favorites.push(Favorite {
            id,
            text: text.to_string(),
            reference: reference.to_string(),
        });
        Some(id)
    }

    pub fn remove_favorite(&mut self, id: u32) -> bool {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);
        self.favorites.len() != before
    }

    /// Insertion-ordered bookmark set; exact string dedupe.
    pub fn add_bookmark(&mut self, reference: &str) -> bool {
        if self.bookmarks.iter().any(|b| b == reference) {
            return false;
        }
        self.bookmarks.push(reference.to_string());
        true
    }

    pub fn remove_bookmark(&mut self, reference: &str) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b != reference);
        self.bookmarks.len() != before
    }

    pub fn mark_read(&mut self, reference: &str) {
        if !self.read_items.iter().any(|r| r == reference) {
            self.read_items.push(reference.to_string());
        }
    }
}

/// A single deliverable content item from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub text: String,
    pub reference: String,
}
