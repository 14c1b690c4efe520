use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Keyed mutual exclusion for mutating WebDAV operations.
///
/// Every mutation locks the canonical `owner:path` key of its target before
/// resolving, and holds the guard across the store transaction. Mutations to
/// distinct paths never contend; subtree/descendant races that slip past the
/// per-path key are closed by the store's transactional cascade and foreign
/// keys.
#[derive(Default)]
pub struct PathLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive guard for `key`, waiting if another mutation on
    /// the same path is in flight. The guard releases on drop, on every exit
    /// path including errors.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.locks.lock().expect("path lock table poisoned");
            // Prune entries nobody holds; the table stays bounded by the
            // number of in-flight mutations.
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}
