//! User preference boundary
//!
//! The search core only ever reads preferences, through a snapshot taken at
//! the start of each request. Editing them belongs to whoever owns the store.

mod pattern;
mod types;

pub use pattern::DomainPattern;
pub use types::*;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};
use tracing::info;

/// Invalid preference record
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PreferenceError {
    #[error("invalid domain pattern: {0:?}")]
    InvalidPattern(String),

    #[error("weight multiplier must be a positive number, got {0}")]
    InvalidMultiplier(f64),

    #[error("invalid bang: {0}")]
    InvalidBang(String),
}

/// Read-only copy of one user's preferences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPreferences {
    /// User-scoped and global bangs
    pub bangs: Vec<Bang>,
    pub blocklist: Vec<BlocklistEntry>,
    pub weights: Vec<WeightEntry>,
}

/// Lookup of per-user preferences
pub trait PreferenceStore: Send + Sync {
    /// Snapshot the preferences visible to `user`, global bangs included
    fn snapshot(&self, user: &UserId) -> UserPreferences;
}

#[derive(Debug, Clone, Default)]
struct UserRecord {
    bangs: Vec<Bang>,
    blocklist: Vec<BlocklistEntry>,
    weights: Vec<WeightEntry>,
}

/// Preference store held in memory
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    global_bangs: RwLock<Vec<Bang>>,
    users: RwLock<HashMap<UserId, UserRecord>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a YAML preferences file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading preferences from {}", path.display()))?;
        let store = Self::from_yaml(&content)
            .with_context(|| format!("parsing preferences in {}", path.display()))?;
        info!("Loaded preferences from {}", path.display());
        Ok(store)
    }

    /// Build a store from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: PreferencesFile = serde_yaml::from_str(content)?;
        let store = Self::new();

        for bang in file.global_bangs {
            store.add_global_bang(Bang::global(bang.trigger, bang.provider, bang.url_template)?);
        }

        for (name, prefs) in file.users {
            let user = UserId::new(name);
            for bang in prefs.bangs {
                store.add_bang(Bang::for_user(&user, bang.trigger, bang.provider, bang.url_template)?);
            }
            for pattern in prefs.blocklist {
                store.add_blocklist_entry(BlocklistEntry::new(&user, &pattern)?);
            }
            for weight in prefs.weights {
                store.add_weight(WeightEntry::new(&user, &weight.pattern, weight.multiplier)?);
            }
        }

        Ok(store)
    }

    pub fn add_global_bang(&self, bang: Bang) {
        let mut bangs = self.global_bangs.write().unwrap_or_else(PoisonError::into_inner);
        bangs.retain(|b| !b.trigger.eq_ignore_ascii_case(&bang.trigger));
        bangs.push(bang);
    }

    /// Add a bang; global-scoped bangs go to the shared table
    pub fn add_bang(&self, bang: Bang) {
        let user = match &bang.scope {
            BangScope::Global => return self.add_global_bang(bang),
            BangScope::User(user) => user.clone(),
        };
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        let record = users.entry(user).or_default();
        record
            .bangs
            .retain(|b| !b.trigger.eq_ignore_ascii_case(&bang.trigger));
        record.bangs.push(bang);
    }

    pub fn add_blocklist_entry(&self, entry: BlocklistEntry) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.entry(entry.user.clone()).or_default().blocklist.push(entry);
    }

    pub fn add_weight(&self, entry: WeightEntry) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.entry(entry.user.clone()).or_default().weights.push(entry);
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn snapshot(&self, user: &UserId) -> UserPreferences {
        let mut bangs = self
            .global_bangs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        let Some(record) = users.get(user) else {
            return UserPreferences {
                bangs,
                ..Default::default()
            };
        };

        bangs.extend(record.bangs.iter().cloned());
        UserPreferences {
            bangs,
            blocklist: record.blocklist.clone(),
            weights: record.weights.clone(),
        }
    }
}

/// On-disk preferences layout
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct PreferencesFile {
    global_bangs: Vec<BangRecord>,
    users: HashMap<String, UserPreferencesRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct BangRecord {
    trigger: String,
    #[serde(default)]
    provider: String,
    url_template: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct UserPreferencesRecord {
    bangs: Vec<BangRecord>,
    blocklist: Vec<String>,
    weights: Vec<WeightRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WeightRecord {
    pattern: String,
    multiplier: f64,
}
