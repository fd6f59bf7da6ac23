use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::frame::Frame;

/// The Store maps keys to frames, each with an optional absolute expiration.
/// Expiration is lazy: an expired entry is evicted as a side effect of the
/// read that observes it, never by a background sweep, so no caller ever sees
/// a value whose deadline has passed. The store has no locking of its own; it
/// is owned exclusively by the execution queue worker, which serializes every
/// access.
pub struct Store {
    entries: HashMap<String, Entry>,
}

struct Entry {
    value: Frame,
    // Absolute Unix timestamp in seconds. Zero means no expiration.
    expires_at: i64,
}

impl Entry {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at != 0 && now > self.expires_at
    }
}

impl Store {
    pub fn new() -> Store {
        Store {
            entries: HashMap::new(),
        }
    }

    /// Inserts or overwrites the key, clearing any prior expiration.
    pub fn set(&mut self, key: String, value: Frame) {
        self.entries.insert(
            key,
            Entry {
                value,
                expires_at: 0,
            },
        );
    }

    /// Inserts or overwrites the key with an absolute expiration timestamp.
    pub fn set_with_expire(&mut self, key: String, value: Frame, expires_at: i64) {
        self.entries.insert(key, Entry { value, expires_at });
    }

    pub fn get(&mut self, key: &str) -> Option<Frame> {
        self.get_with_expire(key).map(|(value, _)| value)
    }

    /// Like `get`, additionally exposing the raw expiration timestamp
    /// (zero when none is set) so TTL can be computed from it.
    pub fn get_with_expire(&mut self, key: &str) -> Option<(Frame, i64)> {
        let now = now();
        match self.entries.get(key) {
            None => None,
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                None
            }
            Some(entry) => Some((entry.value.clone(), entry.expires_at)),
        }
    }

    /// Removes the key, reporting `true` only if it existed and had not
    /// already expired.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.get(key).is_some() {
            self.entries.remove(key);
            return true;
        }
        false
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Current Unix time in seconds.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}
