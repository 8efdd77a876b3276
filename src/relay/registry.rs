//! Conversation to thread mapping.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

use crate::error::BridgeError;

/// Process-lifetime map from conversation id to remote thread id.
///
/// Each conversation owns a `OnceCell`, so concurrent first messages for the
/// same conversation await one in-flight creation instead of racing. A failed
/// creation leaves the cell empty and the next message tries again. Entries
/// are never updated or removed.
#[derive(Debug, Default)]
pub struct ThreadRegistry {
    threads: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl ThreadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thread already bound to a conversation, if any.
    pub fn get(&self, conversation_id: &str) -> Option<String> {
        let threads = self.threads.lock().unwrap_or_else(PoisonError::into_inner);
        threads
            .get(conversation_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// Resolve the conversation's thread, running `create` only if no thread is
    /// bound yet and no other task is already creating one.
    pub async fn get_or_create<F, Fut>(
        &self,
        conversation_id: &str,
        create: F,
    ) -> Result<String, BridgeError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String, BridgeError>>,
    {
        let cell = {
            let mut threads = self.threads.lock().unwrap_or_else(PoisonError::into_inner);
            threads
                .entry(conversation_id.to_string())
                .or_default()
                .clone()
        };

        cell.get_or_try_init(create).await.cloned()
    }

    /// Number of conversations with a bound thread.
    pub fn len(&self) -> usize {
        let threads = self.threads.lock().unwrap_or_else(PoisonError::into_inner);
        threads.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
