//! Best-effort persistence for per-user interaction state the backend does
//! not track: liked/bookmarked posts, question progress, chat history.
//!
//! Everything is synchronous key-value over JSON strings. Write failures
//! (quota, IO) are logged and swallowed; reads fall back to the default.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_BOOKMARKED_POSTS: &str = "techpath_bookmarked_posts";
const KEY_LIKED_POSTS: &str = "techpath_liked_posts";
const KEY_VIEWED_QUESTIONS: &str = "techpath_viewed_questions";
const KEY_ANSWERED_QUESTIONS: &str = "techpath_answered_questions";
const KEY_USER_PROGRESS: &str = "techpath_user_progress";
const KEY_CHAT_HISTORY: &str = "techpath_chat_history";

/// Chat history keeps only the most recent messages to bound storage use.
const CHAT_HISTORY_CAP: usize = 50;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Synchronous string key-value store, the shape of a browser storage API.
///
/// This trait allows swapping the backing store in tests.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// In-memory backend.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.entries.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }
}

/// Aggregate progress record for the interview hub.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_questions_viewed: u64,
    pub total_questions_answered: u64,
    pub categories_explored: Vec<String>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Typed accessors over a storage backend.
pub struct ProfileStore<B> {
    backend: B,
}

impl<B: StorageBackend> ProfileStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.backend.get(key) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("corrupt entry under {key}: {err}");
                T::default()
            }),
            None => T::default(),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!("failed to encode entry for {key}: {err}");
                return;
            }
        };
        if let Err(err) = self.backend.set(key, raw) {
            tracing::warn!("failed to write {key}: {err}");
        }
    }

    pub fn bookmarked_posts(&self) -> HashSet<String> {
        self.read(KEY_BOOKMARKED_POSTS)
    }

    pub fn set_bookmarked_posts(&self, posts: &HashSet<String>) {
        self.write(KEY_BOOKMARKED_POSTS, posts);
    }

    pub fn liked_posts(&self) -> HashSet<String> {
        self.read(KEY_LIKED_POSTS)
    }

    pub fn set_liked_posts(&self, posts: &HashSet<String>) {
        self.write(KEY_LIKED_POSTS, posts);
    }

    pub fn viewed_questions(&self) -> HashSet<String> {
        self.read(KEY_VIEWED_QUESTIONS)
    }

    pub fn set_viewed_questions(&self, questions: &HashSet<String>) {
        self.write(KEY_VIEWED_QUESTIONS, questions);
    }

    pub fn answered_questions(&self) -> HashSet<String> {
        self.read(KEY_ANSWERED_QUESTIONS)
    }

    pub fn set_answered_questions(&self, questions: &HashSet<String>) {
        self.write(KEY_ANSWERED_QUESTIONS, questions);
    }

    pub fn user_progress(&self) -> UserProgress {
        self.read(KEY_USER_PROGRESS)
    }

    pub fn set_user_progress(&self, progress: &UserProgress) {
        self.write(KEY_USER_PROGRESS, progress);
    }

    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.read(KEY_CHAT_HISTORY)
    }

    /// Store the history, keeping only the most recent messages.
    pub fn set_chat_history(&self, messages: &[ChatMessage]) {
        let start = messages.len().saturating_sub(CHAT_HISTORY_CAP);
        self.write(KEY_CHAT_HISTORY, &messages[start..]);
    }

    pub fn add_chat_message(&self, message: ChatMessage) {
        let mut history = self.chat_history();
        history.push(message);
        self.set_chat_history(&history);
    }

    /// Snapshot of every profile entry, keyed by storage key.
    pub fn export(&self) -> BTreeMap<String, serde_json::Value> {
        let mut out = BTreeMap::new();
        for key in ALL_KEYS {
            if let Some(raw) = self.backend.get(key) {
                if let Ok(value) = serde_json::from_str(&raw) {
                    out.insert(key.to_string(), value);
                }
            }
        }
        out
    }

    /// Restore a previously exported snapshot. Unknown keys are ignored.
    pub fn import(&self, data: &BTreeMap<String, serde_json::Value>) {
        for (key, value) in data {
            if ALL_KEYS.contains(&key.as_str()) {
                self.write(key, value);
            }
        }
    }

    pub fn clear(&self) {
        for key in ALL_KEYS {
            self.backend.remove(key);
        }
    }
}

const ALL_KEYS: [&str; 6] = [
    KEY_BOOKMARKED_POSTS,
    KEY_LIKED_POSTS,
    KEY_VIEWED_QUESTIONS,
    KEY_ANSWERED_QUESTIONS,
    KEY_USER_PROGRESS,
    KEY_CHAT_HISTORY,
];
