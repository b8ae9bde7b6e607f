//! Pending selection prompts awaiting a click from their invoker
//!
//! A prompt is registered under `(user, prompt id)` together with the keys it
//! offers. Gateway events resolve it through [`PendingSelections::resolve`];
//! the invocation that registered it waits on the returned
//! [`PendingSelection`] with a deadline. Entries disappear when resolved, when
//! the wait ends, or when the handle is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::debug;
use uuid::Uuid;

type PromptKey = (u64, String);

/// A qualifying click on a selection prompt
#[derive(Debug)]
pub struct Activation<T> {
    pub key: String,
    /// Platform payload, e.g. the interaction that must be acknowledged
    pub payload: T,
}

/// What happened to an incoming activation
#[derive(Debug)]
pub enum Resolution<T> {
    /// Delivered to the waiting invocation
    Resolved,
    /// No prompt for this user and id; the payload is handed back
    UnknownPrompt(T),
    /// The prompt exists but does not offer this key
    RejectedKey(T),
}

struct Entry<T> {
    keys: HashSet<String>,
    sender: oneshot::Sender<Activation<T>>,
}

/// Table of prompts currently waiting for a choice
pub struct PendingSelections<T> {
    entries: Arc<Mutex<HashMap<PromptKey, Entry<T>>>>,
}

impl<T> Clone for PendingSelections<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for PendingSelections<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingSelections<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PromptKey, Entry<T>>> {
        // entries stay consistent even if a holder panicked
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a prompt for `user_id` offering `keys`
    pub fn register<I>(&self, user_id: u64, keys: I) -> PendingSelection<T>
    where
        I: IntoIterator<Item = String>,
    {
        let prompt_id = Uuid::new_v4().simple().to_string();
        let (sender, receiver) = oneshot::channel();
        let entry = Entry {
            keys: keys.into_iter().collect(),
            sender,
        };
        self.lock().insert((user_id, prompt_id.clone()), entry);
        debug!("registered selection prompt {} for user {}", prompt_id, user_id);

        PendingSelection {
            table: self.clone(),
            user_id,
            prompt_id,
            receiver,
        }
    }

    /// Route a click to the prompt it belongs to
    pub fn resolve(&self, user_id: u64, prompt_id: &str, key: &str, payload: T) -> Resolution<T> {
        let mut entries = self.lock();
        let prompt = (user_id, prompt_id.to_string());

        match entries.get(&prompt) {
            None => return Resolution::UnknownPrompt(payload),
            Some(entry) if !entry.keys.contains(key) => return Resolution::RejectedKey(payload),
            Some(_) => {}
        }

        let Some(entry) = entries.remove(&prompt) else {
            return Resolution::UnknownPrompt(payload);
        };
        let activation = Activation {
            key: key.to_string(),
            payload,
        };
        match entry.sender.send(activation) {
            Ok(()) => Resolution::Resolved,
            // the waiter gave up between lookup and delivery
            Err(activation) => Resolution::UnknownPrompt(activation.payload),
        }
    }

    /// Number of prompts still waiting
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn forget(&self, user_id: u64, prompt_id: &str) {
        self.lock().remove(&(user_id, prompt_id.to_string()));
    }
}

/// Handle held by the invocation waiting for a choice
pub struct PendingSelection<T> {
    table: PendingSelections<T>,
    user_id: u64,
    prompt_id: String,
    receiver: oneshot::Receiver<Activation<T>>,
}

impl<T> PendingSelection<T> {
    pub fn prompt_id(&self) -> &str {
        &self.prompt_id
    }

    /// Wait for the invoker's click, at most `timeout`
    pub async fn wait(&mut self, timeout: Duration) -> Option<Activation<T>> {
        let activation = match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(activation)) => Some(activation),
            Ok(Err(_)) | Err(_) => None,
        };
        self.table.forget(self.user_id, &self.prompt_id);
        activation
    }
}

impl<T> Drop for PendingSelection<T> {
    fn drop(&mut self) {
        self.table.forget(self.user_id, &self.prompt_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_delivers_activation() {
        let table = PendingSelections::<&'static str>::new();
        let mut pending = table.register(7, keys(&["a", "b"]));
        let prompt_id = pending.prompt_id().to_string();

        assert!(matches!(table.resolve(7, &prompt_id, "b", "click"), Resolution::Resolved));

        let activation = pending.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(activation.key, "b");
        assert_eq!(activation.payload, "click");
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_other_user_cannot_resolve() {
        let table = PendingSelections::<u8>::new();
        let pending = table.register(7, keys(&["a"]));

        let resolution = table.resolve(8, pending.prompt_id(), "a", 1);
        assert!(matches!(resolution, Resolution::UnknownPrompt(1)));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_ineligible_key_is_rejected() {
        let table = PendingSelections::<u8>::new();
        let pending = table.register(7, keys(&["a"]));

        let resolution = table.resolve(7, pending.prompt_id(), "z", 2);
        assert!(matches!(resolution, Resolution::RejectedKey(2)));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_and_forgets() {
        let table = PendingSelections::<()>::new();
        let mut pending = table.register(7, keys(&["a"]));
        let prompt_id = pending.prompt_id().to_string();

        assert!(pending.wait(Duration::from_secs(30)).await.is_none());
        assert!(table.is_empty());
        assert!(matches!(
            table.resolve(7, &prompt_id, "a", ()),
            Resolution::UnknownPrompt(())
        ));
    }

    #[tokio::test]
    async fn test_drop_removes_entry() {
        let table = PendingSelections::<()>::new();
        let pending = table.register(1, keys(&["a"]));
        assert_eq!(table.len(), 1);
        drop(pending);
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_ids_are_unique() {
        let table = PendingSelections::<()>::new();
        let first = table.register(1, keys(&["a"]));
        let second = table.register(1, keys(&["a"]));
        assert_ne!(first.prompt_id(), second.prompt_id());
        assert_eq!(table.len(), 2);
    }
}
