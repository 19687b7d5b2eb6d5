//! Mouse state

use parking_lot::RwLock;

use super::buffer::{DeviceSnapshot, DeviceStateBuffer};
use super::keyboard::{KeyEvent, KeyModifiers};
use crate::geometry::Vec2;

/// Mouse buttons. Codes start at 1; code 0 is unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    Button1 = 1,
    Button2 = 2,
    Button3 = 3,
    Button4 = 4,
    Button5 = 5,
    Button6 = 6,
    Button7 = 7,
    Button8 = 8,
}

impl MouseButton {
    pub const LEFT: MouseButton = MouseButton::Button1;
    pub const RIGHT: MouseButton = MouseButton::Button2;
    pub const MIDDLE: MouseButton = MouseButton::Button3;

    /// Buffer length needed to index every button by code.
    pub const COUNT: usize = 9;

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Button1),
            2 => Some(Self::Button2),
            3 => Some(Self::Button3),
            4 => Some(Self::Button4),
            5 => Some(Self::Button5),
            6 => Some(Self::Button6),
            7 => Some(Self::Button7),
            8 => Some(Self::Button8),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Mouse callback payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEventArgs {
    /// `None` for motion, wheel and enter/leave notifications.
    pub button: Option<MouseButton>,
    pub modifiers: KeyModifiers,
    pub delta: Vec2,
    pub position: Vec2,
    pub event: KeyEvent,
}

impl MouseEventArgs {
    pub fn motion(position: Vec2, delta: Vec2) -> Self {
        Self {
            button: None,
            modifiers: KeyModifiers::empty(),
            delta,
            position,
            event: KeyEvent::None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Motion {
    position: Vec2,
    previous_position: Vec2,
    delta: Vec2,
    scroll: Vec2,
    previous_scroll: Vec2,
    scroll_delta: Vec2,
}

/// Per-frame mouse state of one window.
#[derive(Debug)]
pub struct MouseState {
    buttons: DeviceStateBuffer<KeyEvent>,
    motion: RwLock<Motion>,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    pub fn new() -> Self {
        Self {
            buttons: DeviceStateBuffer::new(MouseButton::COUNT),
            motion: RwLock::new(Motion::default()),
        }
    }

    // MouseButton codes are always below COUNT.

    pub fn button(&self, button: MouseButton) -> KeyEvent {
        self.buttons.get(button.index()).unwrap_or_default()
    }

    pub fn previous_button(&self, button: MouseButton) -> KeyEvent {
        self.buttons.get_previous(button.index()).unwrap_or_default()
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.button(button) == KeyEvent::Down
    }

    pub fn is_button_released(&self, button: MouseButton) -> bool {
        self.button(button) == KeyEvent::Up
    }

    pub fn is_button_clicked(&self, button: MouseButton) -> bool {
        self.buttons.is_clicked(button.index()).unwrap_or(false)
    }

    pub fn is_any_button_down(&self) -> bool {
        self.buttons.is_any_down()
    }

    pub fn is_any_button_up(&self) -> bool {
        self.buttons.is_any_up()
    }

    pub fn is_any_button_repeat(&self) -> bool {
        self.buttons.is_any_repeat()
    }

    pub fn position(&self) -> Vec2 {
        self.motion.read().position
    }

    pub fn previous_position(&self) -> Vec2 {
        self.motion.read().previous_position
    }

    /// Cursor movement since the previous frame.
    pub fn delta(&self) -> Vec2 {
        self.motion.read().delta
    }

    /// Wheel offset accumulated this frame.
    pub fn scroll(&self) -> Vec2 {
        self.motion.read().scroll
    }

    pub fn previous_scroll(&self) -> Vec2 {
        self.motion.read().previous_scroll
    }

    pub fn scroll_delta(&self) -> Vec2 {
        self.motion.read().scroll_delta
    }

    pub fn snapshot(&self) -> MouseSnapshot {
        MouseSnapshot {
            buttons: self.buttons.snapshot(),
            position: self.position(),
            delta: self.delta(),
            scroll: self.scroll(),
        }
    }

    pub(crate) fn set_button(&self, button: MouseButton, event: KeyEvent) {
        let _ = self.buttons.set(button.index(), event);
    }

    pub(crate) fn set_position(&self, position: Vec2) {
        let mut motion = self.motion.write();
        motion.position = position;
        motion.delta = position - motion.previous_position;
    }

    pub(crate) fn add_scroll(&self, offset: Vec2) {
        let mut motion = self.motion.write();
        motion.scroll = motion.scroll + offset;
        motion.scroll_delta = motion.scroll - motion.previous_scroll;
    }

    pub(crate) fn reset(&self) {
        {
            let mut motion = self.motion.write();
            motion.previous_position = motion.position;
            motion.previous_scroll = motion.scroll;
            motion.delta = Vec2::ZERO;
            motion.scroll = Vec2::ZERO;
            motion.scroll_delta = Vec2::ZERO;
        }
        self.buttons.reset();
    }
}

/// Mouse state frozen at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseSnapshot {
    buttons: DeviceSnapshot<KeyEvent>,
    position: Vec2,
    delta: Vec2,
    scroll: Vec2,
}

impl MouseSnapshot {
    pub fn button(&self, button: MouseButton) -> KeyEvent {
        self.buttons.get(button.index()).unwrap_or_default()
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.button(button) == KeyEvent::Down
    }

    pub fn is_button_clicked(&self, button: MouseButton) -> bool {
        self.buttons.is_clicked(button.index()).unwrap_or(false)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }
}
