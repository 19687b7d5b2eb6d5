//! Thread-affine window binding with frame-polled device state.
//!
//! A [`Dispatcher`] owns the native windowing context on a dedicated thread.
//! [`Window`] handles marshal native calls to it and expose keyboard, mouse and
//! joystick state that any thread can poll frame by frame.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod native;
pub mod property;
pub mod window;

pub use cli::Cli;
pub use config::Options;
pub use dispatcher::{Dispatcher, ExecutionState, PendingInvoke};
pub use error::{NativeError, Result, WindowingError};
pub use geometry::{Point, Rect, Size, Vec2};
pub use logging::LogLevel;
pub use property::PropertyCell;
pub use window::{
    CursorMode, PlatformOptions, Window, WindowBorder, WindowCreateInfo, WindowEvent, WindowState,
};
