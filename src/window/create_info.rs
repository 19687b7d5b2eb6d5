//! Window creation parameters and attribute enums.

use std::time::Duration;

use crate::geometry::{Point, Size};

/// Presentation state of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    #[default]
    Normal,
    FullScreen,
    Maximized,
    Minimized,
    Hidden,
}

/// Window decoration style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowBorder {
    /// No decorations.
    Hidden,
    #[default]
    Resizable,
    /// Decorated but not resizable by the user.
    Fixed,
}

impl WindowBorder {
    pub fn is_decorated(self) -> bool {
        !matches!(self, WindowBorder::Hidden)
    }

    pub fn is_resizable(self) -> bool {
        matches!(self, WindowBorder::Resizable)
    }
}

/// Cursor visibility and capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorMode {
    Hidden,
    #[default]
    Visible,
    /// Hidden and locked to the window; motion is reported as unbounded deltas.
    Disabled,
}

/// Everything needed to create a native window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowCreateInfo {
    pub position: Point,
    pub size: Size,
    pub state: WindowState,
    pub title: String,
    pub border: WindowBorder,
    pub cursor_mode: CursorMode,
    pub opacity: f32,
}

impl WindowCreateInfo {
    pub fn new(position: Point, size: Size, state: WindowState, title: impl Into<String>) -> Self {
        Self {
            position,
            size,
            state,
            title: title.into(),
            border: WindowBorder::default(),
            cursor_mode: CursorMode::default(),
            opacity: 1.0,
        }
    }

    pub fn with_border(mut self, border: WindowBorder) -> Self {
        self.border = border;
        self
    }

    pub fn with_cursor_mode(mut self, cursor_mode: CursorMode) -> Self {
        self.cursor_mode = cursor_mode;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// How a window drives the native event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformOptions {
    /// Block in `wait_events` for up to `wait_timeout` instead of polling.
    pub event_driven: bool,
    pub wait_timeout: Duration,
}

impl PlatformOptions {
    pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

    pub fn event_driven(wait_timeout: Duration) -> Self {
        Self {
            event_driven: true,
            wait_timeout,
        }
    }
}

impl Default for PlatformOptions {
    fn default() -> Self {
        Self {
            event_driven: false,
            wait_timeout: Self::DEFAULT_WAIT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_info_defaults() {
        let info = WindowCreateInfo::new(
            Point::new(100, 100),
            Size::new(640, 480),
            WindowState::Normal,
            "demo",
        );
        assert_eq!(info.border, WindowBorder::Resizable);
        assert_eq!(info.cursor_mode, CursorMode::Visible);
        assert_eq!(info.opacity, 1.0);
        assert_eq!(info.title, "demo");
    }

    #[test]
    fn test_border_flags() {
        assert!(!WindowBorder::Hidden.is_decorated());
        assert!(WindowBorder::Fixed.is_decorated());
        assert!(!WindowBorder::Fixed.is_resizable());
        assert!(WindowBorder::Resizable.is_resizable());
    }

    #[test]
    fn test_platform_options_default() {
        let options = PlatformOptions::default();
        assert!(!options.event_driven);
        assert_eq!(options.wait_timeout, Duration::from_secs(1));
        assert_eq!(options.wait_timeout, PlatformOptions::DEFAULT_WAIT_TIMEOUT);
        assert!(PlatformOptions::event_driven(Duration::from_millis(5)).event_driven);
    }
}
