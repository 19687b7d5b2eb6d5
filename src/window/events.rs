//! Window notifications
//!
//! Every native callback a window receives is turned into a [`WindowEvent`] and
//! passed to the subscribed handlers, synchronously, on the dispatcher thread.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::create_info::WindowState;
use super::Window;
use crate::geometry::{Point, Size};
use crate::input::{KeyEventArgs, MouseEventArgs};

/// Cancellable close request passed with [`WindowEvent::Closing`].
#[derive(Debug, Default)]
pub struct CloseRequest {
    cancelled: AtomicBool,
}

impl CloseRequest {
    /// Keep the window open.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
pub enum WindowEvent {
    Moved(Point),
    Resized(Size),
    FramebufferResized(Size),
    FocusGained,
    FocusLost,
    StateChanged(WindowState),
    KeyDown(KeyEventArgs),
    KeyUp(KeyEventArgs),
    KeyRepeat(KeyEventArgs),
    MouseDown(MouseEventArgs),
    MouseUp(MouseEventArgs),
    MouseRepeat(MouseEventArgs),
    MouseMove(MouseEventArgs),
    MouseWheel(MouseEventArgs),
    MouseEntered(MouseEventArgs),
    MouseLeft(MouseEventArgs),
    TextInput(char),
    Drop(Vec<PathBuf>),
    JoystickConnection { id: usize, connected: bool },
    Refresh,
    /// The user asked to close the window; handlers may cancel.
    Closing(Arc<CloseRequest>),
    /// The native window has been destroyed.
    Closed,
}

/// Token returned by [`Window::subscribe`](super::Window::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type EventHandler = Arc<dyn Fn(&Window, &WindowEvent) + Send + Sync>;

#[derive(Default)]
pub(crate) struct Handlers {
    next_id: AtomicU64,
    handlers: RwLock<Vec<(SubscriptionId, EventHandler)>>,
}

impl Handlers {
    pub(crate) fn subscribe(&self, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, handler));
        id
    }

    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Call every handler. The list is copied first so handlers may subscribe or
    /// unsubscribe while running.
    pub(crate) fn emit(&self, window: &Window, event: &WindowEvent) {
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler(window, event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.handlers.read().len()
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_request_cancel() {
        let request = CloseRequest::default();
        assert!(!request.is_cancelled());
        request.cancel();
        assert!(request.is_cancelled());
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let handlers = Handlers::default();
        let first = handlers.subscribe(Arc::new(|_, _| {}));
        let second = handlers.subscribe(Arc::new(|_, _| {}));
        assert_ne!(first, second);
        assert_eq!(handlers.len(), 2);

        assert!(handlers.unsubscribe(first));
        assert!(!handlers.unsubscribe(first));
        assert_eq!(handlers.len(), 1);
    }
}
