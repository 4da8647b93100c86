//! Per-key async mutexes.
//!
//! Used to serialize work on one content item or one user without a global
//! lock. Entries nobody holds are pruned on the next acquire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lock key for everything touching one content item's moderation slot
pub fn content_key(content_id: &str) -> String {
    format!("content:{}", content_id)
}

/// Lock key for one user's safety metrics
pub fn user_key(user_id: &str) -> String {
    format!("user:{}", user_id)
}

#[derive(Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Only the map holds an unlocked, unshared slot
            slots.retain(|k, slot| k == key || Arc::strong_count(slot) > 1);
            slots
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    /// Number of keys currently tracked
    pub fn tracked(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or_default()
    }
}
