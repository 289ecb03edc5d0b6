//! State management for the GameShell client.
//!
//! Contains the host state machine, resource types and Bevy components used
//! throughout the client.

use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;
use gameshell_logic::config::OverlayConfig;
use gameshell_logic::input::KeyRegistry;
use gameshell_logic::overlay::{MenuAction, MountedOverlay, OverlayActions};

// ============================================================================
// STATES
// ============================================================================

/// Host-owned overlay state. `Paused` is OPEN, `Playing` is CLOSED.
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShellState {
    #[default]
    Playing,
    Paused,
}

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Resource, Default)]
pub struct ShellConfig(pub OverlayConfig);

/// The process-wide key source. Keyboard presses are forwarded here by name.
#[derive(Resource, Default, Clone)]
pub struct ShellInput(pub KeyRegistry);

/// The mounted pause overlay, present only while `Paused`.
#[derive(Resource, Default)]
pub struct ActivePauseMenu(pub Option<MountedOverlay>);

/// Actions signalled by the overlay, applied once per frame.
#[derive(Resource, Default, Clone)]
pub struct ActionOutbox(Arc<Mutex<Vec<MenuAction>>>);

impl ActionOutbox {
    /// Callbacks that queue each action here.
    pub fn actions(&self) -> OverlayActions {
        let queue = Arc::clone(&self.0);
        OverlayActions::forwarding_to(move |action| {
            queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(action);
        })
    }

    pub fn drain(&self) -> Vec<MenuAction> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

// ============================================================================
// BEVY COMPONENTS
// ============================================================================

/// Root node of the pause overlay; the whole tree is despawned on exit.
#[derive(Component)]
pub struct PauseMenuRoot;

#[derive(Component, Debug, Clone, Copy)]
pub struct PauseMenuButton(pub MenuAction);

#[derive(Component)]
pub struct HudText;
