use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};

struct Entry<T> {
    value: T,
    fetched_at: DateTime<Utc>,
}

/// A single cached value that goes stale `ttl` after it was stored.
pub struct TtlCell<T: Clone> {
    ttl: Duration,
    entry: RwLock<Option<Entry<T>>>,
}

impl<T: Clone> TtlCell<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: RwLock::new(None) }
    }

    /// Returns the cached value if it is still fresh at `now`.
    pub fn get(&self, now: DateTime<Utc>) -> Option<T> {
        let guard = self.entry.read().ok()?;
        let entry = guard.as_ref()?;
        let age = now.signed_duration_since(entry.fetched_at).to_std().unwrap_or(Duration::ZERO);
        if age >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn set(&self, value: T, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.entry.write() {
            *guard = Some(Entry { value, fetched_at: now });
        }
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.entry.write() {
            *guard = None;
        }
    }
}
