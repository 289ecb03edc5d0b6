//! Pure overlay logic for GameShell.
//!
//! This crate contains the pause-menu overlay controller and everything it
//! needs, independent of any engine or UI toolkit. A host delivers key
//! presses by name and mounts/unmounts the overlay; the overlay signals the
//! host through three callbacks. The Bevy client and the headless simtest
//! harness are both hosts.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Open/cancel key selection, JSON + CLI loading, validation |
//! | [`host`] | Host-owned `OverlayState` holder (OPEN iff mounted) |
//! | [`input`] | Process-wide key registry with RAII `KeyBinding` guards |
//! | [`keys`] | Key identifiers (`KeyboardEvent.code` names) |
//! | [`overlay`] | Modal overlay controller: mount, select, unmount |

pub mod config;
pub mod host;
pub mod input;
pub mod keys;
pub mod overlay;
