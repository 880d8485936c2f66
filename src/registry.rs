//! Per-visitor guards for the HTTP host.
//!
//! Every visitor gets its own `FormGuard` whose storage keys live under a
//! digest of the visitor address. The map entry lock keeps each guard's
//! check-then-record sequence exclusive.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tokio::time::{Duration, interval};

use crate::clock::Clock;
use crate::guard::{FormGuard, GuardConfig};
use crate::metrics::GUARDS_TRACKED;
use crate::storage::{KeyValueStore, Namespaced};

// Hash of the visitor address so raw addresses never reach the store
pub fn client_key(client: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub struct GuardRegistry {
    guards: DashMap<String, FormGuard>,
    config: GuardConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl GuardRegistry {
    pub fn new(config: GuardConfig, store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            guards: DashMap::new(),
            config,
            store,
            clock,
        }
    }

    /// Run `f` with exclusive access to the visitor's guard, creating it on
    /// first sight.
    pub fn with_guard<R>(&self, client: &str, f: impl FnOnce(&mut FormGuard) -> R) -> R {
        let key = client_key(client);
        let out = {
            let mut guard = self.guards.entry(key.clone()).or_insert_with(|| {
                let store = Arc::new(Namespaced::new(self.store.clone(), &key));
                FormGuard::new(self.config, store, self.clock.clone())
            });
            f(guard.value_mut())
        };
        // entry lock released above, len() takes every shard
        GUARDS_TRACKED.set(self.guards.len() as f64);
        out
    }

    // Drop guards with nothing in their window and no cooldown running,
    // together with their stored keys. A running cooldown keeps the guard.
    pub fn sweep(&self) -> usize {
        let before = self.guards.len();
        self.guards.retain(|_, guard| {
            if guard.is_idle() {
                guard.clear_stored();
                false
            } else {
                true
            }
        });
        let after = self.guards.len();
        GUARDS_TRACKED.set(after as f64);
        before.saturating_sub(after)
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

// Sweeper loop - runs every `every`
pub async fn sweeper(registry: Arc<GuardRegistry>, every: Duration) {
    let mut interval = interval(every);

    tracing::info!(interval = ?every, "guard sweeper started");

    loop {
        interval.tick().await;

        let removed = registry.sweep();
        if removed > 0 {
            tracing::debug!(removed, remaining = registry.len(), "swept idle guards");
        }
    }
}
