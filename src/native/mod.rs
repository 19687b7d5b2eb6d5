//! Native windowing context
//!
//! The native library is thread-affine: every call has to come from the thread
//! that initialized it. A [`Platform`] is installed in a thread-local slot on the
//! dispatcher thread and reached only through [`with`], which refuses to run on any
//! other thread.
//!
//! Native callbacks are delivered as a batch of [`NativeEvent`]s returned from
//! [`Platform::poll_events`] / [`Platform::wait_events`]. The platform is no longer
//! borrowed while the batch is dispatched, so handlers may issue further native
//! calls.

pub mod headless;
#[cfg(feature = "sdl")]
pub mod sdl;

use std::cell::RefCell;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::error::{NativeError, Result, WindowingError};
use crate::geometry::{Point, Size, Vec2};
use crate::input::{JoystickInfo, JoystickPoll, Key, KeyEvent, KeyModifiers, MouseButton};
use crate::window::{CursorMode, WindowCreateInfo};

pub type NativeResult<T> = std::result::Result<T, NativeError>;

/// Handle of a native window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// One native callback invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    WindowMoved {
        window: WindowId,
        position: Point,
    },
    WindowResized {
        window: WindowId,
        size: Size,
    },
    FramebufferResized {
        window: WindowId,
        size: Size,
    },
    Focus {
        window: WindowId,
        focused: bool,
    },
    Iconified {
        window: WindowId,
        iconified: bool,
    },
    Maximized {
        window: WindowId,
        maximized: bool,
    },
    Key {
        window: WindowId,
        key: Key,
        scan_code: i32,
        event: KeyEvent,
        modifiers: KeyModifiers,
    },
    MouseButton {
        window: WindowId,
        button: MouseButton,
        event: KeyEvent,
        modifiers: KeyModifiers,
    },
    CursorMoved {
        window: WindowId,
        position: Vec2,
    },
    CursorEntered {
        window: WindowId,
        entered: bool,
    },
    Scroll {
        window: WindowId,
        offset: Vec2,
    },
    Char {
        window: WindowId,
        ch: char,
    },
    Drop {
        window: WindowId,
        paths: Vec<PathBuf>,
    },
    /// Device-level; delivered to every window.
    JoystickConnection {
        id: usize,
        connected: bool,
    },
    Refresh {
        window: WindowId,
    },
    CloseRequested {
        window: WindowId,
    },
}

impl NativeEvent {
    /// Window the event targets, `None` for device-level events.
    pub fn window(&self) -> Option<WindowId> {
        match self {
            NativeEvent::WindowMoved { window, .. }
            | NativeEvent::WindowResized { window, .. }
            | NativeEvent::FramebufferResized { window, .. }
            | NativeEvent::Focus { window, .. }
            | NativeEvent::Iconified { window, .. }
            | NativeEvent::Maximized { window, .. }
            | NativeEvent::Key { window, .. }
            | NativeEvent::MouseButton { window, .. }
            | NativeEvent::CursorMoved { window, .. }
            | NativeEvent::CursorEntered { window, .. }
            | NativeEvent::Scroll { window, .. }
            | NativeEvent::Char { window, .. }
            | NativeEvent::Drop { window, .. }
            | NativeEvent::Refresh { window }
            | NativeEvent::CloseRequested { window } => Some(*window),
            NativeEvent::JoystickConnection { .. } => None,
        }
    }
}

/// The synchronous call surface of a native windowing library.
///
/// Implementations are owned by one thread for their whole life. Calls that cannot
/// report failure directly record it and hand it out through
/// [`take_error`](Platform::take_error).
pub trait Platform {
    /// Backend name for logging.
    fn name(&self) -> &str;

    fn create_window(&mut self, info: &WindowCreateInfo) -> NativeResult<WindowId>;
    fn destroy_window(&mut self, window: WindowId);

    /// Collect pending events without blocking.
    fn poll_events(&mut self) -> Vec<NativeEvent>;
    /// Block until at least one event arrives or `timeout` passes.
    fn wait_events(&mut self, timeout: Duration) -> Vec<NativeEvent>;

    fn window_position(&self, window: WindowId) -> Point;
    fn set_window_position(&mut self, window: WindowId, position: Point);
    fn window_size(&self, window: WindowId) -> Size;
    fn set_window_size(&mut self, window: WindowId, size: Size);
    fn framebuffer_size(&self, window: WindowId) -> Size;
    fn set_window_title(&mut self, window: WindowId, title: &str);

    fn iconify_window(&mut self, window: WindowId);
    fn maximize_window(&mut self, window: WindowId);
    fn restore_window(&mut self, window: WindowId);
    fn show_window(&mut self, window: WindowId);
    fn hide_window(&mut self, window: WindowId);
    /// Enter or leave fullscreen. Geometry is saved on entry and restored on exit.
    fn set_fullscreen(&mut self, window: WindowId, fullscreen: bool);
    fn set_decorated(&mut self, window: WindowId, decorated: bool);
    fn set_resizable(&mut self, window: WindowId, resizable: bool);
    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode);
    fn set_window_opacity(&mut self, window: WindowId, opacity: f32);
    fn set_should_close(&mut self, window: WindowId, should_close: bool);
    fn cursor_position(&self, window: WindowId) -> Vec2;

    fn clipboard_string(&mut self) -> Option<String>;
    fn set_clipboard_string(&mut self, text: &str);

    fn joystick_present(&self, id: usize) -> bool;
    fn joystick_info(&self, id: usize) -> Option<JoystickInfo>;
    fn poll_joystick(&mut self, id: usize) -> Option<JoystickPoll>;

    /// The error raised since the last call, if any. Clears it.
    fn take_error(&mut self) -> Option<NativeError>;
}

thread_local! {
    static PLATFORM: RefCell<Option<Box<dyn Platform>>> = const { RefCell::new(None) };
}

/// Make `platform` the native context of the calling thread.
pub(crate) fn install(platform: Box<dyn Platform>) {
    tracing::debug!(backend = platform.name(), "native context installed");
    PLATFORM.with(|slot| *slot.borrow_mut() = Some(platform));
}

/// Tear down the native context of the calling thread.
pub(crate) fn uninstall() -> Option<Box<dyn Platform>> {
    PLATFORM.with(|slot| slot.borrow_mut().take())
}

/// Whether the calling thread owns a native context.
pub fn is_installed() -> bool {
    PLATFORM.with(|slot| slot.borrow().is_some())
}

/// Run `f` against the native context of the calling thread.
///
/// Fails with [`WindowingError::ThreadAffinity`] off the owner thread. An error the
/// platform recorded while running `f` is returned instead of `f`'s value.
pub fn with<R>(f: impl FnOnce(&mut dyn Platform) -> R) -> Result<R> {
    PLATFORM.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| {
            WindowingError::ThreadAffinity("native context is already in use".to_string())
        })?;
        let platform = slot.as_deref_mut().ok_or_else(|| {
            WindowingError::ThreadAffinity(format!(
                "thread {:?} does not own a native context",
                thread::current().name().unwrap_or("<unnamed>")
            ))
        })?;

        let value = f(&mut *platform);
        match platform.take_error() {
            Some(err) => {
                tracing::warn!(code = err.code, description = %err.description, "native call failed");
                Err(err.into())
            }
            None => Ok(value),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::headless::HeadlessController;
    use super::*;

    #[test]
    fn test_with_fails_off_owner_thread() {
        let result = thread::spawn(|| with(|p| p.poll_events().len()))
            .join()
            .expect("thread panicked");
        assert!(matches!(result, Err(WindowingError::ThreadAffinity(_))));
    }

    #[test]
    fn test_with_surfaces_buffered_error() {
        thread::spawn(|| {
            let controller = HeadlessController::new();
            install(Box::new(controller.platform()));
            assert!(is_installed());

            controller.raise_error(NativeError::new(65544, "lost device"));
            let err = with(|p| p.poll_events()).unwrap_err();
            assert_eq!(
                err,
                WindowingError::Native(NativeError::new(65544, "lost device"))
            );

            // drained
            assert!(with(|p| p.poll_events()).is_ok());
            assert!(uninstall().is_some());
            assert!(!is_installed());
        })
        .join()
        .expect("thread panicked");
    }

    #[test]
    fn test_nested_with_is_rejected() {
        thread::spawn(|| {
            let controller = HeadlessController::new();
            install(Box::new(controller.platform()));
            let nested = with(|_| with(|p| p.poll_events()));
            assert!(matches!(nested, Ok(Err(WindowingError::ThreadAffinity(_)))));
            uninstall();
        })
        .join()
        .expect("thread panicked");
    }

    #[test]
    fn test_event_window() {
        let window = WindowId(7);
        assert_eq!(NativeEvent::Refresh { window }.window(), Some(window));
        assert_eq!(
            NativeEvent::JoystickConnection {
                id: 3,
                connected: true
            }
            .window(),
            None
        );
    }
}
