//! GameShell Client - Bevy game shell with a pause-menu overlay
//!
//! The shell owns `ShellState`; the overlay controller from
//! `gameshell-logic` is mounted while paused and signals resume, settings
//! and quit back to the shell.
//!
//! Usage:
//!   cargo run -p gameshell-client
//!   cargo run -p gameshell-client -- --config data/overlay_config.json
//!   cargo run -p gameshell-client -- --open-key KeyP --cancel-key Escape

mod input;
mod state;
mod ui;

use bevy::prelude::*;
use gameshell_logic::config::OverlayConfig;

use crate::state::ShellConfig;
use crate::ui::{setup_hud, PauseMenuPlugin};

fn main() {
    // Parsed before the log plugin exists, so failures are reported once
    // logging is up.
    let loaded = OverlayConfig::from_args();

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "GameShell".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: bevy::window::PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    let config = match loaded {
        Ok(config) => {
            info!(
                "overlay config: open='{}' cancel='{}' ignore_repeats={}",
                config.open_key, config.cancel_key, config.ignore_repeats
            );
            config
        }
        Err(e) => {
            warn!("{}; using default overlay config", e);
            OverlayConfig::default()
        }
    };

    app.insert_resource(ShellConfig(config))
        .add_plugins(PauseMenuPlugin)
        .add_systems(Startup, setup_hud)
        .run();
}
