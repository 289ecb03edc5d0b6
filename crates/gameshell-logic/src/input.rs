//! Process-wide key registry with scoped bindings.
//!
//! The registry stands in for the host's global "key pressed" source. Code
//! that wants presses while it is active calls [`KeyRegistry::bind`] and
//! holds the returned [`KeyBinding`]; dropping the binding removes the
//! registration, so a listener can never outlive its owner.
//!
//! ```
//! use gameshell_logic::input::KeyRegistry;
//! use gameshell_logic::keys;
//!
//! let registry = KeyRegistry::new();
//! let binding = registry.bind(keys::ESCAPE, || {});
//! assert_eq!(registry.binding_count(keys::ESCAPE), 1);
//! drop(binding);
//! assert_eq!(registry.binding_count(keys::ESCAPE), 0);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};

type Handler = Arc<Mutex<dyn FnMut() + Send>>;

struct Entry {
    id: u64,
    key: String,
    handler: Handler,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    entries: Vec<Entry>,
}

impl RegistryInner {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }
}

// Registry state is consistent between operations, so a panic in some other
// lock holder leaves nothing half-written. Recover instead of propagating.
fn lock(inner: &Mutex<RegistryInner>) -> MutexGuard<'_, RegistryInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the process-wide key registry. Clones share the same bindings.
#[derive(Clone, Default)]
pub struct KeyRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for presses of `key`.
    ///
    /// The registration lives exactly as long as the returned guard.
    pub fn bind<F>(&self, key: impl Into<String>, handler: F) -> KeyBinding
    where
        F: FnMut() + Send + 'static,
    {
        let key = key.into();
        let handler: Handler = Arc::new(Mutex::new(handler));
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push(Entry {
            id,
            key: key.clone(),
            handler,
        });
        log::debug!("bound key '{}' (binding #{})", key, id);

        KeyBinding {
            registry: Arc::downgrade(&self.inner),
            id,
            key,
            released: false,
        }
    }

    /// Deliver one press of `key`. Returns how many handlers ran.
    ///
    /// Handlers run in registration order, outside the registry lock, so a
    /// handler may release bindings (its own included). A binding released
    /// before its turn in this dispatch is skipped.
    pub fn dispatch(&self, key: &str) -> usize {
        let snapshot: Vec<(u64, Handler)> = lock(&self.inner)
            .entries
            .iter()
            .filter(|e| e.key == key)
            .map(|e| (e.id, Arc::clone(&e.handler)))
            .collect();

        let mut invoked = 0;
        for (id, handler) in snapshot {
            if !lock(&self.inner).contains(id) {
                continue;
            }
            match handler.try_lock() {
                Ok(mut f) => {
                    (&mut *f)();
                    invoked += 1;
                }
                Err(TryLockError::Poisoned(poisoned)) => {
                    let mut f = poisoned.into_inner();
                    (&mut *f)();
                    invoked += 1;
                }
                Err(TryLockError::WouldBlock) => {
                    log::warn!(
                        "skipping re-entrant dispatch of '{}' to binding #{}",
                        key,
                        id
                    );
                }
            }
        }
        log::trace!("dispatched '{}' to {} handler(s)", key, invoked);
        invoked
    }

    /// Number of live bindings on `key`.
    pub fn binding_count(&self, key: &str) -> usize {
        lock(&self.inner)
            .entries
            .iter()
            .filter(|e| e.key == key)
            .count()
    }

    /// Number of live bindings across all keys.
    pub fn total_bindings(&self) -> usize {
        lock(&self.inner).entries.len()
    }
}

impl std::fmt::Debug for KeyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        let keys: Vec<&str> = inner.entries.iter().map(|e| e.key.as_str()).collect();
        f.debug_struct("KeyRegistry").field("bindings", &keys).finish()
    }
}

/// A live registration in a [`KeyRegistry`]. Dropping it unbinds.
#[must_use = "dropping a KeyBinding immediately unbinds the key"]
#[derive(Debug)]
pub struct KeyBinding {
    registry: Weak<Mutex<RegistryInner>>,
    id: u64,
    key: String,
    released: bool,
}

impl KeyBinding {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether the registration is still present in its registry.
    pub fn is_active(&self) -> bool {
        if self.released {
            return false;
        }
        match self.registry.upgrade() {
            Some(inner) => {
                let registered = lock(&inner).contains(self.id);
                registered
            }
            None => false,
        }
    }

    /// Unbind now. Safe to call more than once; drop after release is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(inner) = self.registry.upgrade() {
            if lock(&inner).remove(self.id) {
                log::debug!("released key '{}' (binding #{})", self.key, self.id);
            }
        }
    }
}

impl Drop for KeyBinding {
    fn drop(&mut self) {
        self.release();
    }
}
