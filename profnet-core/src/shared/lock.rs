use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rst_common::with_tokio::tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// `KeyedLock` serializes read-modify-write sequences touching the same record
///
/// Each key (an edge pair key, a message id, an index bucket key) owns its own async mutex.
/// Operations on different keys never wait on each other. Clones share the same registry,
/// so every usecase or repository that must exclude each other has to be built from the
/// same instance.
#[derive(Clone, Default)]
pub struct KeyedLock {
    slots: Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the given key is free and hold it until the returned guard is dropped
    pub async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());

            // idle slots are only referenced by the registry itself
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);

            slots
                .entry(key)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        slot.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.len())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
