// src/observable/registry.rs
//! Registry of live observable redirections
//!
//! The interception engine only knows the integer key it was given when a
//! dispatch splice was prepared. When a spliced call fires, the engine looks
//! the key up here to find the subscribers to notify.
//!
//! Inserts, removals and lookups go through a concurrent map, so engine
//! callbacks on other threads always see a consistent entry set.

use crate::observable::context::RedirectionContext;
use crate::observable::observable_redirection::ObservableEntry;
use crate::utils::errors::{RedirectError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

static GLOBAL: Lazy<Arc<RedirectionRegistry>> = Lazy::new(|| Arc::new(RedirectionRegistry::new()));

/// Key identifying an observable redirection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryKey(u64);

impl RegistryKey {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Key → observable redirection mapping
pub struct RedirectionRegistry {
    entries: DashMap<RegistryKey, Arc<ObservableEntry>>,
    next_key: AtomicU64,
}

impl RedirectionRegistry {
    /// Create an isolated registry
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_key: AtomicU64::new(1),
        }
    }

    /// Process-wide registry
    pub fn global() -> Arc<RedirectionRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Allocate a fresh key; keys are never handed out twice
    pub fn next_key(&self) -> RegistryKey {
        RegistryKey(self.next_key.fetch_add(1, Ordering::Relaxed))
    }

    pub(crate) fn insert(&self, key: RegistryKey, entry: Arc<ObservableEntry>) -> Result<()> {
        match self.entries.entry(key) {
            Entry::Occupied(_) => {
                warn!("Registry key {} is already in use", key);
                Err(RedirectError::InterceptionFailed(format!(
                    "Registry key {} is already in use",
                    key
                )))
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
                debug!("Registered observable redirection {}", key);
                Ok(())
            }
        }
    }

    /// Remove an entry, returning whether it was present
    pub fn remove(&self, key: RegistryKey) -> bool {
        let removed = self.entries.remove(&key).is_some();
        if removed {
            debug!("Unregistered observable redirection {}", key);
        }
        removed
    }

    pub fn lookup(&self, key: RegistryKey) -> Option<Arc<ObservableEntry>> {
        self.entries.get(&key).map(|e| Arc::clone(e.value()))
    }

    pub fn contains(&self, key: RegistryKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Deliver `context` to every subscriber registered under `key`
    ///
    /// Called by the engine from the intercepted call; observer errors
    /// propagate back to it.
    pub fn dispatch(&self, key: RegistryKey, context: &RedirectionContext) -> Result<()> {
        let entry = self
            .lookup(key)
            .ok_or(RedirectError::ObservableNotFound(key.get()))?;
        entry.publish(context)
    }
}

impl Default for RedirectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::descriptor::MethodDescriptor;

    #[test]
    fn test_keys_are_monotonic() {
        let registry = RedirectionRegistry::new();
        let a = registry.next_key();
        let b = registry.next_key();
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_dispatch_unknown_key() {
        let registry = RedirectionRegistry::new();
        let key = registry.next_key();
        let context = RedirectionContext::new(
            Arc::new(MethodDescriptor::static_method("A", "F")),
            None,
            vec![],
        );
        assert!(matches!(
            registry.dispatch(key, &context),
            Err(RedirectError::ObservableNotFound(_))
        ));
        assert!(!registry.remove(key));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(Arc::ptr_eq(&RedirectionRegistry::global(), &RedirectionRegistry::global()));
    }
}
