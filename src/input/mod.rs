//! Frame-polled input state
//!
//! Keyboard, mouse and joystick state built on a shared double buffer
//! ([`buffer::DeviceStateBuffer`]). "Current" holds what happened this frame and
//! "previous" what happened the frame before, which is enough to answer pressed,
//! released and clicked queries.
//!
//! # Thread Safety
//!
//! Only the dispatcher thread writes (from native callbacks and the per-frame
//! poll). Any thread may read; every buffer is guarded by reader/writer locks.

pub mod buffer;
pub mod joystick;
pub mod keyboard;
pub mod mouse;

pub use buffer::{DeviceSnapshot, DeviceStateBuffer, DeviceValue};
pub use joystick::{
    Hat, JoystickInfo, JoystickPoll, JoystickSlotTable, JoystickSnapshot, JoystickState,
    MAX_JOYSTICKS,
};
pub use keyboard::{Key, KeyEvent, KeyEventArgs, KeyModifiers, KeyboardSnapshot, KeyboardState};
pub use mouse::{MouseButton, MouseEventArgs, MouseSnapshot, MouseState};
