//! The pause-menu overlay controller.
//!
//! The overlay itself holds no visibility state. While mounted it owns one
//! binding on the cancellation key (mapped to `on_resume`) and routes the
//! three menu selections to callbacks the host passed in. Unmounting, by
//! [`MountedOverlay::unmount`], by dropping it, or by unwinding through it,
//! releases the binding.
//!
//! ```
//! use gameshell_logic::input::KeyRegistry;
//! use gameshell_logic::keys;
//! use gameshell_logic::overlay::{OverlayActions, PauseOverlay};
//!
//! let registry = KeyRegistry::new();
//! let mounted = PauseOverlay::default().mount(&registry, OverlayActions::noop());
//! assert_eq!(registry.binding_count(keys::ESCAPE), 1);
//! mounted.unmount();
//! assert_eq!(registry.binding_count(keys::ESCAPE), 0);
//! ```

use std::sync::{Arc, Mutex, TryLockError};

use serde::{Deserialize, Serialize};

use crate::input::{KeyBinding, KeyRegistry};
use crate::keys;

/// The three selectable menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MenuAction {
    /// Primary dismiss.
    Resume,
    /// Secondary.
    Settings,
    /// Tertiary, destructive. Invoked directly with no confirmation.
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [MenuAction::Resume, MenuAction::Settings, MenuAction::Quit];
}

type Callback = Box<dyn FnMut() + Send>;

/// Host-supplied callbacks. Each is a zero-argument, fire-and-forget
/// notification.
pub struct OverlayActions {
    pub on_resume: Callback,
    pub on_settings: Callback,
    pub on_quit: Callback,
}

impl OverlayActions {
    pub fn new(
        on_resume: impl FnMut() + Send + 'static,
        on_settings: impl FnMut() + Send + 'static,
        on_quit: impl FnMut() + Send + 'static,
    ) -> Self {
        Self {
            on_resume: Box::new(on_resume),
            on_settings: Box::new(on_settings),
            on_quit: Box::new(on_quit),
        }
    }

    /// Build all three callbacks from one sink that receives the action.
    pub fn forwarding_to<F>(sink: F) -> Self
    where
        F: FnMut(MenuAction) + Clone + Send + 'static,
    {
        let mut resume = sink.clone();
        let mut settings = sink.clone();
        let mut quit = sink;
        Self::new(
            move || resume(MenuAction::Resume),
            move || settings(MenuAction::Settings),
            move || quit(MenuAction::Quit),
        )
    }

    pub fn noop() -> Self {
        Self::new(|| {}, || {}, || {})
    }

    fn invoke(&mut self, action: MenuAction) {
        match action {
            MenuAction::Resume => (self.on_resume)(),
            MenuAction::Settings => (self.on_settings)(),
            MenuAction::Quit => (self.on_quit)(),
        }
    }
}

impl std::fmt::Debug for OverlayActions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayActions").finish_non_exhaustive()
    }
}

/// Run the callback for `action`. A callback that re-enters the same overlay
/// (selecting again, or dispatching its cancel key) is skipped for the nested
/// call. Returns whether the callback ran.
fn invoke(actions: &Mutex<OverlayActions>, action: MenuAction) -> bool {
    let mut actions = match actions.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => {
            log::warn!("skipping re-entrant {:?} on pause overlay", action);
            return false;
        }
    };
    actions.invoke(action);
    true
}

/// Overlay description: which key cancels it. Cheap to clone and mount
/// repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PauseOverlay {
    cancel_key: String,
}

impl Default for PauseOverlay {
    fn default() -> Self {
        Self::new(keys::ESCAPE)
    }
}

impl PauseOverlay {
    pub fn new(cancel_key: impl Into<String>) -> Self {
        Self {
            cancel_key: cancel_key.into(),
        }
    }

    pub fn cancel_key(&self) -> &str {
        &self.cancel_key
    }

    /// Mount the overlay: acquire one binding on the cancellation key that
    /// calls `on_resume` once per press.
    pub fn mount(&self, registry: &KeyRegistry, actions: OverlayActions) -> MountedOverlay {
        let actions = Arc::new(Mutex::new(actions));
        let on_cancel = Arc::clone(&actions);
        let binding = registry.bind(self.cancel_key.as_str(), move || {
            invoke(&on_cancel, MenuAction::Resume);
        });
        log::info!("pause overlay mounted (cancel key '{}')", self.cancel_key);

        MountedOverlay { actions, binding }
    }
}

/// A mounted overlay instance. Holds the cancellation binding for exactly
/// as long as it exists.
#[must_use = "dropping a MountedOverlay immediately unmounts it"]
#[derive(Debug)]
pub struct MountedOverlay {
    actions: Arc<Mutex<OverlayActions>>,
    binding: KeyBinding,
}

impl MountedOverlay {
    /// Route a menu selection to its callback. Only that callback runs.
    /// Returns `false` if the selection came from inside one of this
    /// overlay's own callbacks and was skipped.
    pub fn select(&self, action: MenuAction) -> bool {
        log::debug!("pause overlay: {:?} selected", action);
        invoke(&self.actions, action)
    }

    pub fn cancel_key(&self) -> &str {
        self.binding.key()
    }

    /// Whether the cancellation binding is still registered.
    pub fn is_bound(&self) -> bool {
        self.binding.is_active()
    }

    /// Unmount now. Equivalent to dropping.
    pub fn unmount(self) {}
}

impl Drop for MountedOverlay {
    fn drop(&mut self) {
        self.binding.release();
        log::info!("pause overlay unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn recorder() -> (Arc<Mutex<Vec<MenuAction>>>, OverlayActions) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let actions = OverlayActions::forwarding_to(move |a| sink.lock().unwrap().push(a));
        (log, actions)
    }

    #[test]
    fn mount_binds_exactly_once() {
        let registry = KeyRegistry::new();
        let mounted = PauseOverlay::default().mount(&registry, OverlayActions::noop());
        assert!(mounted.is_bound());
        assert_eq!(registry.binding_count(keys::ESCAPE), 1);
        assert_eq!(registry.total_bindings(), 1);
    }

    #[test]
    fn cancel_key_fires_resume_per_press() {
        let registry = KeyRegistry::new();
        let (log, actions) = recorder();
        let _mounted = PauseOverlay::default().mount(&registry, actions);

        registry.dispatch(keys::ESCAPE);
        registry.dispatch(keys::ESCAPE);
        registry.dispatch(keys::ESCAPE);
        assert_eq!(*log.lock().unwrap(), vec![MenuAction::Resume; 3]);
    }

    #[test]
    fn selections_do_not_cross_trigger() {
        for action in MenuAction::ALL {
            let registry = KeyRegistry::new();
            let (log, actions) = recorder();
            let mounted = PauseOverlay::default().mount(&registry, actions);
            mounted.select(action);
            assert_eq!(*log.lock().unwrap(), vec![action]);
        }
    }

    #[test]
    fn custom_cancel_key() {
        let registry = KeyRegistry::new();
        let (log, actions) = recorder();
        let mounted = PauseOverlay::new("KeyP").mount(&registry, actions);

        assert_eq!(mounted.cancel_key(), "KeyP");
        registry.dispatch(keys::ESCAPE);
        assert!(log.lock().unwrap().is_empty());
        registry.dispatch("KeyP");
        assert_eq!(*log.lock().unwrap(), vec![MenuAction::Resume]);
    }

    #[test]
    fn nested_select_from_callback_is_skipped() {
        let registry = KeyRegistry::new();
        let cell: Arc<OnceLock<MountedOverlay>> = Arc::new(OnceLock::new());
        let nested = Arc::new(Mutex::new(None));
        let (log, mut actions) = recorder();

        let (cell_in, nested_in, sink) = (Arc::clone(&cell), Arc::clone(&nested), Arc::clone(&log));
        actions.on_settings = Box::new(move || {
            sink.lock().unwrap().push(MenuAction::Settings);
            if let Some(mounted) = cell_in.get() {
                *nested_in.lock().unwrap() = Some(mounted.select(MenuAction::Quit));
            }
        });
        let mounted = PauseOverlay::default().mount(&registry, actions);
        assert!(cell.set(mounted).is_ok());

        let ran = cell.get().map(|m| m.select(MenuAction::Settings));
        assert_eq!(ran, Some(true));
        assert_eq!(*nested.lock().unwrap(), Some(false));
        assert_eq!(*log.lock().unwrap(), vec![MenuAction::Settings]);
    }

    #[test]
    fn cancel_key_from_inside_a_callback_is_skipped() {
        let registry = KeyRegistry::new();
        let (log, mut actions) = recorder();
        let inner = registry.clone();
        let sink = Arc::clone(&log);
        actions.on_quit = Box::new(move || {
            sink.lock().unwrap().push(MenuAction::Quit);
            inner.dispatch(keys::ESCAPE);
        });
        let mounted = PauseOverlay::default().mount(&registry, actions);

        assert!(mounted.select(MenuAction::Quit));
        assert_eq!(*log.lock().unwrap(), vec![MenuAction::Quit]);
        assert!(mounted.is_bound());
    }

    #[test]
    fn unmount_releases_binding() {
        let registry = KeyRegistry::new();
        let (log, actions) = recorder();
        let mounted = PauseOverlay::default().mount(&registry, actions);
        mounted.unmount();

        assert_eq!(registry.total_bindings(), 0);
        assert_eq!(registry.dispatch(keys::ESCAPE), 0);
        assert!(log.lock().unwrap().is_empty());
    }
}
