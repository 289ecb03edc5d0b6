//! Keyboard handling for the GameShell client.
//!
//! Bevy's `KeyCode` debug names match the identifiers the overlay logic uses
//! (`Escape`, `KeyP`, `F10`), so presses are forwarded by name.
//!
//! One system reads the keyboard, so each press is seen once even when the
//! open key and the cancel key are the same key.

use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

use crate::state::{ShellConfig, ShellInput, ShellState};

pub fn key_name(key_code: KeyCode) -> String {
    format!("{:?}", key_code)
}

fn counts_as_press(event: &KeyboardInput, config: &ShellConfig) -> bool {
    event.state == ButtonState::Pressed && !(event.repeat && config.0.ignore_repeats)
}

/// Each press is read once. While `Playing` the open key pauses; every press
/// is delivered to the key registry, where the mounted overlay (if any)
/// picks up its cancel key.
pub fn route_keyboard(
    config: Res<ShellConfig>,
    input: Res<ShellInput>,
    state: Res<State<ShellState>>,
    mut keys: EventReader<KeyboardInput>,
    mut next_state: ResMut<NextState<ShellState>>,
) {
    for event in keys.read() {
        if !counts_as_press(event, &config) {
            continue;
        }
        let name = key_name(event.key_code);
        if *state.get() == ShellState::Playing && name == config.0.open_key {
            info!("open key '{}' pressed, pausing", config.0.open_key);
            next_state.set(ShellState::Paused);
        }
        input.0.dispatch(&name);
    }
}
