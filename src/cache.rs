use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::debug;

/// Default number of query results kept across all subgraph clients.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Identity of one query execution: endpoint, document, and variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    endpoint: String,
    query: String,
    variables: String,
}

impl CacheKey {
    pub fn new(endpoint: &str, query: &str, variables: Option<&Value>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            query: query.to_string(),
            variables: variables.map(Value::to_string).unwrap_or_default(),
        }
    }
}

#[derive(Default)]
struct Entries {
    map: HashMap<CacheKey, Value>,
    /// Insertion order, oldest first.
    order: VecDeque<CacheKey>,
}

/// Process-wide store of `data` payloads, bounded by entry count.
///
/// Nothing is ever invalidated by time or by navigation: an entry leaves only
/// when the cache is full and it is the oldest one, or on [`ResponseCache::clear`].
pub struct ResponseCache {
    capacity: usize,
    entries: Mutex<Entries>,
}

impl ResponseCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.lock().map.get(key).cloned()
    }

    /// Store `data` under `key`, replacing any previous value in place.
    pub fn insert(&self, key: CacheKey, data: Value) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.lock();
        if let Some(slot) = entries.map.get_mut(&key) {
            *slot = data;
            return;
        }
        while entries.map.len() >= self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!("Evicted cached result for {}", oldest.endpoint);
        }
        entries.order.push_back(key.clone());
        entries.map.insert(key, data);
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.map.clear();
        entries.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
