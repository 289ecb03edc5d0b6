//! Host-side overlay visibility.
//!
//! The overlay is stateless; whoever renders it owns `OverlayState`. This
//! module is that owner for hosts that don't already have a state machine
//! of their own: OPEN exactly when a [`MountedOverlay`] is held.

use serde::{Deserialize, Serialize};

use crate::input::KeyRegistry;
use crate::overlay::{MenuAction, MountedOverlay, OverlayActions, PauseOverlay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlayState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug)]
pub struct OverlayHost {
    registry: KeyRegistry,
    overlay: PauseOverlay,
    mounted: Option<MountedOverlay>,
}

impl OverlayHost {
    pub fn new(registry: KeyRegistry, overlay: PauseOverlay) -> Self {
        Self {
            registry,
            overlay,
            mounted: None,
        }
    }

    pub fn state(&self) -> OverlayState {
        if self.mounted.is_some() {
            OverlayState::Open
        } else {
            OverlayState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }

    pub fn mounted(&self) -> Option<&MountedOverlay> {
        self.mounted.as_ref()
    }

    /// CLOSED → OPEN. Returns `false` (and drops `actions`) if already open,
    /// so a second binding is never acquired.
    pub fn open(&mut self, actions: OverlayActions) -> bool {
        if self.mounted.is_some() {
            log::debug!("overlay already open, ignoring open request");
            return false;
        }
        self.mounted = Some(self.overlay.mount(&self.registry, actions));
        true
    }

    /// OPEN → CLOSED. Returns `false` if already closed.
    pub fn close(&mut self) -> bool {
        match self.mounted.take() {
            Some(mounted) => {
                mounted.unmount();
                true
            }
            None => false,
        }
    }

    /// Flip visibility. `actions` is only called when opening.
    pub fn toggle(&mut self, actions: impl FnOnce() -> OverlayActions) -> OverlayState {
        if self.is_open() {
            self.close();
        } else {
            self.open(actions());
        }
        self.state()
    }

    /// Route a menu selection to the mounted overlay. Ignored while closed.
    /// Returns whether a callback ran.
    pub fn select(&self, action: MenuAction) -> bool {
        match &self.mounted {
            Some(mounted) => mounted.select(action),
            None => false,
        }
    }
}
