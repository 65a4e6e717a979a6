use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{BotError, Result};
use crate::providers::ContentProvider;
use crate::schedule::ReminderRegistry;
use crate::translate::TranslationCache;
use crate::types::UserProfile;

const STORE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ProfileFile {
    version: u32,
    users: BTreeMap<String, UserProfile>,
}

/// Durable per-user profile store backed by a single JSON document.
///
/// Every mutation runs under one global lock: load state, apply the closure,
/// write the whole file back atomically. Write latency therefore grows with
/// total user count, which is fine at single-bot-audience scale.
pub struct ProfileStore {
    path: PathBuf,
    users: Mutex<HashMap<i64, UserProfile>>,
}

impl ProfileStore {
    /// Load the store from disk. A missing or unreadable file yields an
    /// empty store ("no users yet"), never a fatal error.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let users = read_profiles(&path);
        Self {
            path,
            users: Mutex::new(users),
        }
    }

    /// Current profile for a user, or defaults if none exists yet. Reading
    /// alone does not create the record on disk.
    pub async fn get(&self, user: i64) -> UserProfile {
        let users = self.users.lock().await;
        users.get(&user).cloned().unwrap_or_default()
    }

    /// Apply `f` to the user's profile (created with defaults if absent) and
    /// persist the whole store. Nothing is written when `f` fails, so
    /// check-then-mutate closures leave the store untouched on rejection.
    pub async fn mutate<T, F>(&self, user: i64, f: F) -> Result<T>
    where
        F: FnOnce(&mut UserProfile) -> Result<T>,
    {
        let mut users = self.users.lock().await;
        let out = f(users.entry(user).or_default())?;
        persist(&self.path, &users).await?;
        Ok(out)
    }

    /// Snapshot of every profile, used to re-register triggers at startup.
    pub async fn snapshot(&self) -> Vec<(i64, UserProfile)> {
        let users = self.users.lock().await;
        users.iter().map(|(id, p)| (*id, p.clone())).collect()
    }

    pub async fn user_count(&self) -> usize {
        self.users.lock().await.len()
    }
}

fn read_profiles(path: &Path) -> HashMap<i64, UserProfile> {
    if !path.exists() {
        log::info!("Profile store {} not found, starting empty", path.display());
        return HashMap::new();
    }
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Failed to read {}: {}. Starting empty.", path.display(), e);
            return HashMap::new();
        }
    };
    match parse_profiles(&json) {
        Ok(users) => users,
        Err(e) => {
            log::warn!("Corrupt profile store {}: {}. Starting empty.", path.display(), e);
            HashMap::new()
        }
    }
}

/// Parse the versioned store format, falling back to the legacy flat
/// `{uid: profile}` map which is migrated on the next write.
fn parse_profiles(json: &str) -> Result<HashMap<i64, UserProfile>> {
    let file: ProfileFile = match serde_json::from_str(json) {
        Ok(file) => file,
        Err(_) => {
            let legacy: BTreeMap<String, UserProfile> = serde_json::from_str(json)?;
            log::info!("Migrating legacy profile store ({} users)", legacy.len());
            ProfileFile {
                version: STORE_VERSION,
                users: legacy,
            }
        }
    };
    let mut users = HashMap::new();
    for (key, profile) in file.users {
        let id: i64 = key
            .parse()
            .map_err(|_| BotError::Validation(format!("bad user key {key:?}")))?;
        users.insert(id, profile);
    }
    Ok(users)
}

async fn persist(path: &Path, users: &HashMap<i64, UserProfile>) -> Result<()> {
    let file = ProfileFile {
        version: STORE_VERSION,
        users: users.iter().map(|(id, p)| (id.to_string(), p.clone())).collect(),
    };
    let json = serde_json::to_string_pretty(&file)?;

    // Write to a temp file first, then rename over the real one, so readers
    // never observe a torn write.
    let temp_path = path.with_extension("tmp.json");
    let mut temp = File::create(&temp_path).await?;
    temp.write_all(json.as_bytes()).await?;
    temp.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Shared application state handed to every handler via the dispatcher.
pub struct BotState {
    pub config: Config,
    pub store: Arc<ProfileStore>,
    pub cache: Arc<TranslationCache>,
    pub content: Arc<dyn ContentProvider>,
    pub registry: Arc<ReminderRegistry>,
}
