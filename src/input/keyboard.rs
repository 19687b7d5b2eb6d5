//! Keyboard state
//!
//! Key codes are USB HID usage ids (the same numbering SDL uses for scancodes), so a
//! native key maps onto a [`Key`] without a lookup table.

use bitflags::bitflags;

use super::buffer::{DeviceSnapshot, DeviceStateBuffer, DeviceValue};
use crate::error::{Result, WindowingError};

/// What happened to a key or button during a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum KeyEvent {
    #[default]
    None,
    Up,
    Down,
    Repeat,
}

impl DeviceValue for KeyEvent {
    fn is_down(self) -> bool {
        self == KeyEvent::Down
    }

    fn is_up(self) -> bool {
        self == KeyEvent::Up
    }

    fn is_repeat(self) -> bool {
        self == KeyEvent::Repeat
    }
}

bitflags! {
    /// Modifier keys held when a key or button event fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 0x01;
        const CONTROL = 0x02;
        const ALT = 0x04;
        const SUPER = 0x08;
        const CAPS_LOCK = 0x10;
        const NUM_LOCK = 0x20;
    }
}

/// A keyboard key, identified by its device code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u16);

impl Key {
    /// Number of key codes tracked per keyboard.
    pub const COUNT: usize = 512;

    pub const A: Key = Key(4);
    pub const B: Key = Key(5);
    pub const C: Key = Key(6);
    pub const D: Key = Key(7);
    pub const E: Key = Key(8);
    pub const F: Key = Key(9);
    pub const Q: Key = Key(20);
    pub const R: Key = Key(21);
    pub const S: Key = Key(22);
    pub const W: Key = Key(26);
    pub const X: Key = Key(27);
    pub const Z: Key = Key(29);
    pub const NUM_1: Key = Key(30);
    pub const NUM_0: Key = Key(39);
    pub const ENTER: Key = Key(40);
    pub const ESCAPE: Key = Key(41);
    pub const BACKSPACE: Key = Key(42);
    pub const TAB: Key = Key(43);
    pub const SPACE: Key = Key(44);
    pub const F1: Key = Key(58);
    pub const F12: Key = Key(69);
    pub const RIGHT: Key = Key(79);
    pub const LEFT: Key = Key(80);
    pub const DOWN: Key = Key(81);
    pub const UP: Key = Key(82);
    pub const LEFT_CONTROL: Key = Key(224);
    pub const LEFT_SHIFT: Key = Key(225);
    pub const LEFT_ALT: Key = Key(226);
    pub const RIGHT_CONTROL: Key = Key(228);
    pub const RIGHT_SHIFT: Key = Key(229);
    pub const RIGHT_ALT: Key = Key(230);

    /// Key for a raw device code.
    pub fn from_code(code: u16) -> Result<Self> {
        if (code as usize) < Self::COUNT {
            Ok(Self(code))
        } else {
            Err(WindowingError::IndexOutOfRange {
                index: code as usize,
                len: Self::COUNT,
            })
        }
    }

    pub const fn code(self) -> u16 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Key callback payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEventArgs {
    pub key: Key,
    pub modifiers: KeyModifiers,
    pub scan_code: i32,
    pub event: KeyEvent,
}

impl KeyEventArgs {
    pub fn control(&self) -> bool {
        self.modifiers.contains(KeyModifiers::CONTROL)
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SHIFT)
    }

    pub fn alt(&self) -> bool {
        self.modifiers.contains(KeyModifiers::ALT)
    }

    pub fn super_key(&self) -> bool {
        self.modifiers.contains(KeyModifiers::SUPER)
    }
}

/// Per-frame keyboard state of one window.
///
/// Written by the key callback on the dispatcher thread, readable anywhere.
#[derive(Debug)]
pub struct KeyboardState {
    keys: DeviceStateBuffer<KeyEvent>,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyboardState {
    pub fn new() -> Self {
        Self {
            keys: DeviceStateBuffer::new(Key::COUNT),
        }
    }

    // Key codes are range-checked when the Key is built, so the buffer lookups
    // below cannot fail.

    pub fn key(&self, key: Key) -> KeyEvent {
        self.keys.get(key.index()).unwrap_or_default()
    }

    pub fn previous_key(&self, key: Key) -> KeyEvent {
        self.keys.get_previous(key.index()).unwrap_or_default()
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.key(key) == KeyEvent::Down
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        self.key(key) == KeyEvent::Up
    }

    /// Held last frame, not held now.
    pub fn is_key_clicked(&self, key: Key) -> bool {
        self.keys.is_clicked(key.index()).unwrap_or(false)
    }

    pub fn is_any_key_down(&self) -> bool {
        self.keys.is_any_down()
    }

    pub fn is_any_key_up(&self) -> bool {
        self.keys.is_any_up()
    }

    pub fn is_any_key_repeat(&self) -> bool {
        self.keys.is_any_repeat()
    }

    pub fn snapshot(&self) -> KeyboardSnapshot {
        KeyboardSnapshot {
            keys: self.keys.snapshot(),
        }
    }

    pub(crate) fn set(&self, key: Key, event: KeyEvent) {
        // cannot fail, see above
        let _ = self.keys.set(key.index(), event);
    }

    pub(crate) fn reset(&self) {
        self.keys.reset();
    }
}

/// Keyboard state frozen at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardSnapshot {
    keys: DeviceSnapshot<KeyEvent>,
}

impl KeyboardSnapshot {
    pub fn key(&self, key: Key) -> KeyEvent {
        self.keys.get(key.index()).unwrap_or_default()
    }

    pub fn previous_key(&self, key: Key) -> KeyEvent {
        self.keys.get_previous(key.index()).unwrap_or_default()
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.key(key) == KeyEvent::Down
    }

    pub fn is_key_released(&self, key: Key) -> bool {
        self.key(key) == KeyEvent::Up
    }

    pub fn is_key_clicked(&self, key: Key) -> bool {
        self.keys.is_clicked(key.index()).unwrap_or(false)
    }

    pub fn is_any_key_down(&self) -> bool {
        self.keys.is_any_down()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_code() {
        assert_eq!(Key::from_code(44).unwrap(), Key::SPACE);
        assert_eq!(Key::SPACE.index(), 44);
        assert!(matches!(
            Key::from_code(512),
            Err(WindowingError::IndexOutOfRange { index: 512, len: 512 })
        ));
    }

    #[test]
    fn test_key_down_then_idle_frame() {
        let keyboard = KeyboardState::new();

        // frame 1
        keyboard.reset();
        keyboard.set(Key::W, KeyEvent::Down);
        assert!(keyboard.is_key_pressed(Key::W));
        assert!(!keyboard.is_key_released(Key::W));
        assert!(keyboard.is_any_key_down());

        // frame 2, no events
        keyboard.reset();
        assert!(!keyboard.is_key_pressed(Key::W));
        assert_eq!(keyboard.previous_key(Key::W), KeyEvent::Down);
        assert!(keyboard.is_key_clicked(Key::W));
        assert!(!keyboard.is_any_key_down());
    }

    #[test]
    fn test_repeat_sets_flag() {
        let keyboard = KeyboardState::new();
        keyboard.set(Key::A, KeyEvent::Repeat);
        assert!(keyboard.is_any_key_repeat());
        assert!(!keyboard.is_any_key_up());
        keyboard.set(Key::A, KeyEvent::Up);
        assert!(keyboard.is_any_key_up());
        assert!(keyboard.is_key_released(Key::A));
    }

    #[test]
    fn test_snapshot_survives_frames() {
        let keyboard = KeyboardState::new();
        keyboard.set(Key::ESCAPE, KeyEvent::Down);
        let snapshot = keyboard.snapshot();

        keyboard.reset();
        keyboard.reset();

        assert!(snapshot.is_key_pressed(Key::ESCAPE));
        assert!(snapshot.is_any_key_down());
        assert!(!keyboard.is_key_pressed(Key::ESCAPE));
    }

    #[test]
    fn test_modifier_helpers() {
        let args = KeyEventArgs {
            key: Key::S,
            modifiers: KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            scan_code: 22,
            event: KeyEvent::Down,
        };
        assert!(args.control());
        assert!(args.shift());
        assert!(!args.alt());
        assert!(!args.super_key());
    }

    #[test]
    fn test_modifier_bits_match_native_layout() {
        assert_eq!(KeyModifiers::SHIFT.bits(), 0x01);
        assert_eq!(KeyModifiers::CONTROL.bits(), 0x02);
        assert_eq!(KeyModifiers::ALT.bits(), 0x04);
        assert_eq!(KeyModifiers::SUPER.bits(), 0x08);
        assert_eq!(KeyModifiers::CAPS_LOCK.bits(), 0x10);
        assert_eq!(KeyModifiers::NUM_LOCK.bits(), 0x20);
        assert_eq!(KeyModifiers::all().bits(), 0x3f);
        assert_eq!(
            KeyModifiers::from_bits(0x03),
            Some(KeyModifiers::SHIFT | KeyModifiers::CONTROL)
        );
    }
}
