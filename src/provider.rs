//! Registration units and deferred activation
//!
//! A [Provider] groups related bindings. Eager providers register as soon as they are added
//! to the container; deferred providers wait in a [ProviderQueue] until a lookup asks for one
//! of the keys they claim.

use std::fmt;
use std::sync::Arc;

use crate::Container;

/// A module of related bindings
pub trait Provider: Send + Sync {
    /// Deferred providers only register when one of their keys is first requested.
    fn is_deferred(&self) -> bool {
        false
    }

    /// Keys this provider binds when registered.
    fn provides(&self) -> Vec<String> {
        Vec::new()
    }

    fn provided(&self, key: &str) -> bool {
        self.provides().iter().any(|k| k == key)
    }

    fn register(&self, container: &Container);
}

/// Deferred providers that have not been activated yet
#[derive(Clone, Default)]
pub struct ProviderQueue {
    pending: Vec<Arc<dyn Provider>>,
}

impl ProviderQueue {
    pub fn push(&mut self, provider: Arc<dyn Provider>) {
        self.pending.push(provider);
    }

    /// Remove and return the most recently added provider claiming `key`.
    pub fn take_claiming(&mut self, key: &str) -> Option<Arc<dyn Provider>> {
        let position = self.pending.iter().rposition(|p| p.provided(key))?;
        Some(self.pending.remove(position))
    }

    /// Remove every pending provider, oldest first.
    pub fn drain(&mut self) -> Vec<Arc<dyn Provider>> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Arc<dyn Provider>] {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Keys claimed by pending providers
    pub fn provides(&self) -> Vec<String> {
        self.pending.iter().flat_map(|p| p.provides()).collect()
    }
}

impl fmt::Debug for ProviderQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderQueue")
            .field("provides", &self.provides())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Claims(&'static [&'static str]);

    impl Provider for Claims {
        fn is_deferred(&self) -> bool {
            true
        }
        fn provides(&self) -> Vec<String> {
            self.0.iter().map(|k| k.to_string()).collect()
        }
        fn register(&self, _container: &Container) {}
    }

    #[test]
    fn most_recent_claim_wins_and_is_removed() {
        let mut queue = ProviderQueue::default();
        let older: Arc<dyn Provider> = Arc::new(Claims(&["mailer", "queue"]));
        let newer: Arc<dyn Provider> = Arc::new(Claims(&["mailer"]));
        queue.push(older.clone());
        queue.push(newer.clone());

        let taken = queue.take_claiming("mailer").unwrap();
        assert!(Arc::ptr_eq(&taken, &newer));
        let taken = queue.take_claiming("mailer").unwrap();
        assert!(Arc::ptr_eq(&taken, &older));
        assert!(queue.take_claiming("mailer").is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut queue = ProviderQueue::default();
        queue.push(Arc::new(Claims(&["a"])));
        queue.push(Arc::new(Claims(&["b"])));
        assert_eq!(queue.provides(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(queue.drain().len(), 2);
        assert!(queue.pending().is_empty());
    }
}
