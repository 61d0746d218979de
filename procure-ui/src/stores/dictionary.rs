//! CPV description dictionary store
//!
//! The dictionary is an enrichment: a failed load leaves it empty, is logged,
//! and is never shown to the user. The resolver then answers with
//! placeholders.

use crate::client::DictionarySource;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Descriptions of one code keyed by language (`en`, `pl`, `ua`, ...)
pub type DescriptionRecord = HashMap<String, String>;

/// Code → per-language descriptions
///
/// Keys are 8-digit codes, optionally suffixed with `-<check digit>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpvDictionary {
    entries: HashMap<String, DescriptionRecord>,
}

impl CpvDictionary {
    /// Decode the raw resource
    ///
    /// Returns `None` unless the payload is a JSON object. Entries that are
    /// not objects and language values that are not strings are dropped.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };

        let entries = map
            .into_iter()
            .filter_map(|(code, entry)| match entry {
                Value::Object(texts) => {
                    let record: DescriptionRecord = texts
                        .into_iter()
                        .filter_map(|(lang, text)| match text {
                            Value::String(text) => Some((lang, text)),
                            _ => None,
                        })
                        .collect();
                    Some((code, record))
                }
                _ => None,
            })
            .collect();

        Some(Self { entries })
    }

    pub fn get(&self, code: &str) -> Option<&DescriptionRecord> {
        self.entries.get(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owner of the CPV dictionary snapshot
pub struct DictionaryStore {
    source: Arc<dyn DictionarySource>,
    snapshot: RwLock<Arc<CpvDictionary>>,
}

impl DictionaryStore {
    pub fn new(source: Arc<dyn DictionarySource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(Arc::new(CpvDictionary::default())),
        }
    }

    /// Fetch the dictionary
    ///
    /// Returns the number of entries now available. Failures leave the
    /// mapping empty and are only logged.
    pub async fn load(&self) -> usize {
        let current = self.snapshot().await;
        if !current.is_empty() {
            return current.len();
        }

        let location = self.source.location();
        let value = match self.source.fetch().await {
            Ok(value) => value,
            Err(e) => {
                warn!("CPV dictionary not loaded from {}: {}", location, e);
                return 0;
            }
        };

        let Some(dictionary) = CpvDictionary::from_value(value) else {
            warn!("CPV dictionary at {} has invalid format (expected object)", location);
            return 0;
        };

        let count = dictionary.len();
        *self.snapshot.write().await = Arc::new(dictionary);
        info!("CPV dictionary loaded: {} entries", count);
        count
    }

    /// Current dictionary; empty until a load succeeds
    pub async fn snapshot(&self) -> Arc<CpvDictionary> {
        Arc::clone(&*self.snapshot.read().await)
    }
}
