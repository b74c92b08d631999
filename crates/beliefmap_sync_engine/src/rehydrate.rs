//! Rehydration callback registry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

type Callback = Arc<dyn Fn() + Send + Sync>;

/// Per-key reactions fired when a newer server value replaces local state.
///
/// The registry is an explicit object owned by the application and handed
/// to the storage adapter at construction. Callbacks are registered once
/// per storage namespace at startup and are never unregistered. They may be
/// invoked any number of times and should simply reload state from storage.
#[derive(Clone, Default)]
pub struct RehydrationRegistry {
    callbacks: Arc<RwLock<HashMap<String, Callback>>>,
}

impl RehydrationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the callback for `name`, replacing any previous one.
    pub fn register<F>(&self, name: impl Into<String>, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.write().insert(name.into(), Arc::new(callback));
    }

    /// Returns true if a callback is registered for `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.callbacks.read().contains_key(name)
    }

    /// Invokes the callback for `name`. Returns true if one was registered.
    pub fn notify(&self, name: &str) -> bool {
        // Clone out so the callback runs without holding the lock
        let callback = self.callbacks.read().get(name).cloned();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for RehydrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.callbacks.read().keys().cloned().collect();
        f.debug_struct("RehydrationRegistry")
            .field("names", &names)
            .finish()
    }
}
