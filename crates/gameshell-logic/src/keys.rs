//! Key identifiers.
//!
//! Keys are named the way browsers name `KeyboardEvent.code` values
//! (`"Escape"`, `"KeyP"`, `"Digit1"`, `"F10"`). Bevy's `KeyCode` debug
//! names follow the same convention, so a host can forward presses by name
//! without a lookup table.

/// The cancellation key. Pressing it while an overlay is mounted resumes.
pub const ESCAPE: &str = "Escape";

pub const ENTER: &str = "Enter";
pub const SPACE: &str = "Space";
pub const TAB: &str = "Tab";
pub const PAUSE: &str = "Pause";

/// Named keys that are not letters, digits, or function keys.
const NAMED_KEYS: &[&str] = &[
    ESCAPE,
    ENTER,
    SPACE,
    TAB,
    PAUSE,
    "Backspace",
    "ArrowUp",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "Backquote",
];

/// Whether `name` is a key identifier a host can deliver.
///
/// Accepts the named keys above plus `KeyA`..`KeyZ`, `Digit0`..`Digit9`
/// and `F1`..`F12`.
pub fn is_known_key(name: &str) -> bool {
    if NAMED_KEYS.contains(&name) {
        return true;
    }
    if let Some(rest) = name.strip_prefix("Key") {
        let mut chars = rest.chars();
        return matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase());
    }
    if let Some(rest) = name.strip_prefix("Digit") {
        let mut chars = rest.chars();
        return matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit());
    }
    if let Some(rest) = name.strip_prefix('F') {
        return matches!(rest.parse::<u8>(), Ok(1..=12)) && !rest.starts_with('0');
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_is_known() {
        assert!(is_known_key(ESCAPE));
    }

    #[test]
    fn letters_and_digits() {
        assert!(is_known_key("KeyP"));
        assert!(is_known_key("Digit0"));
        assert!(!is_known_key("Keyp"));
        assert!(!is_known_key("KeyPP"));
        assert!(!is_known_key("Digit10"));
    }

    #[test]
    fn function_keys() {
        assert!(is_known_key("F1"));
        assert!(is_known_key("F12"));
        assert!(!is_known_key("F13"));
        assert!(!is_known_key("F0"));
        assert!(!is_known_key("F01"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(!is_known_key(""));
        assert!(!is_known_key("escape"));
        assert!(!is_known_key("Esc"));
    }
}
