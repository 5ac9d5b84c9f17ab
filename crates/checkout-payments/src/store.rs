//! Mock Intent Store
//!
//! In-memory storage backing the mock payment path, so a create and a
//! later status poll can observe the same intent without network access.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use chrono::Utc;

use checkout_core::{IntentStatus, PaymentIntent, Result};

/// Keyed intent storage
///
/// `get` may mutate: the mock path settles intents on read (see
/// [`MemoryIntentStore`]), so implementations must serialize concurrent
/// access per key.
pub trait IntentStore: Send + Sync {
    /// Store by ID, overwriting on update
    fn put(&self, intent: PaymentIntent) -> Result<()>;

    /// Fetch by ID, applying any read-side transition
    fn get(&self, id: &str) -> Result<Option<PaymentIntent>>;

    /// Number of stored intents
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

const DEFAULT_SETTLE_AFTER: Duration = Duration::from_secs(5);

/// In-memory intent store.
///
/// Created intents automatically settle to `succeeded` once
/// `settle_after` wall-clock time has passed since creation, applied on
/// the next read rather than by a background task. Entries live for the
/// process lifetime; there is no eviction.
pub struct MemoryIntentStore {
    intents: RwLock<HashMap<String, PaymentIntent>>,
    settle_after: Duration,
}

impl Default for MemoryIntentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::with_settle_after(DEFAULT_SETTLE_AFTER)
    }

    /// Custom settlement threshold (tests use a short one)
    pub fn with_settle_after(settle_after: Duration) -> Self {
        Self {
            intents: RwLock::new(HashMap::new()),
            settle_after,
        }
    }
}

impl IntentStore for MemoryIntentStore {
    fn put(&self, intent: PaymentIntent) -> Result<()> {
        let mut intents = self.intents.write().unwrap();
        intents.insert(intent.id.clone(), intent);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<PaymentIntent>> {
        // Write lock: the read may settle the intent
        let mut intents = self.intents.write().unwrap();

        let Some(intent) = intents.get_mut(id) else {
            return Ok(None);
        };

        if intent.status == IntentStatus::Created {
            let elapsed = Utc::now()
                .signed_duration_since(intent.created_at)
                .to_std()
                .unwrap_or_default();
            if elapsed > self.settle_after && intent.advance(IntentStatus::Succeeded) {
                tracing::info!(intent_id = %intent.id, "mock intent settled to succeeded");
            }
        }

        Ok(Some(intent.clone()))
    }

    fn len(&self) -> usize {
        self.intents.read().unwrap().len()
    }
}
