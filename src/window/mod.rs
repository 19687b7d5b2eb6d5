//! Window façade
//!
//! A [`Window`] is a cheap handle to state shared between the caller and the
//! dispatcher thread. Attribute getters and input queries read property cells and
//! device buffers directly; everything that touches the native window is sent to
//! the dispatcher.
//!
//! Native callbacks reach a window through a per-dispatcher registry: the event
//! batch returned by the platform is routed by [`WindowId`], and device-level
//! events (joystick hot-plug) go to every registered window.

pub mod create_info;
pub mod events;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

pub use create_info::{CursorMode, PlatformOptions, WindowBorder, WindowCreateInfo, WindowState};
pub use events::{CloseRequest, EventHandler, SubscriptionId, WindowEvent};

use crate::dispatcher::{Dispatcher, PendingInvoke};
use crate::error::{Result, WindowingError};
use crate::geometry::{Point, Rect, Size, Vec2};
use crate::input::{
    JoystickSlotTable, JoystickState, KeyEvent, KeyEventArgs, KeyboardState, MouseEventArgs,
    MouseState, MAX_JOYSTICKS,
};
use crate::native::{self, NativeEvent, Platform, WindowId};
use crate::property::PropertyCell;
use events::Handlers;

// ============================================================================
// Registry
// ============================================================================

thread_local! {
    /// Windows created on this dispatcher thread.
    static WINDOWS: RefCell<HashMap<WindowId, Weak<WindowShared>>> = RefCell::new(HashMap::new());
}

fn register(shared: &Arc<WindowShared>) {
    WINDOWS.with(|windows| {
        windows
            .borrow_mut()
            .insert(shared.id, Arc::downgrade(shared));
    });
}

fn unregister(id: WindowId) {
    WINDOWS.with(|windows| {
        if let Ok(mut windows) = windows.try_borrow_mut() {
            windows.remove(&id);
        }
    });
}

fn lookup(id: WindowId) -> Option<Arc<WindowShared>> {
    WINDOWS.with(|windows| windows.borrow().get(&id).and_then(Weak::upgrade))
}

fn has_live_windows() -> bool {
    WINDOWS.with(|windows| {
        windows
            .borrow()
            .values()
            .any(|shared| shared.strong_count() > 0)
    })
}

fn registered_windows() -> Vec<Arc<WindowShared>> {
    let mut live: Vec<Arc<WindowShared>> = WINDOWS.with(|windows| {
        windows
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .collect()
    });
    live.sort_by_key(|shared| shared.id);
    live
}

/// Route a batch of native events to their windows.
///
/// Every event is delivered even if an earlier one failed; the first failure is
/// returned.
fn dispatch(events: Vec<NativeEvent>) -> Result<()> {
    let mut first_error = None;
    for event in events {
        let targets = match event.window() {
            Some(id) => lookup(id).into_iter().collect(),
            None => registered_windows(),
        };
        if targets.is_empty() {
            tracing::trace!(?event, "no window for event");
        }
        for target in targets {
            if let Err(err) = target.handle(event.clone()) {
                tracing::warn!(window = target.id.0, error = %err, "event handling failed");
                first_error.get_or_insert(err);
            }
        }
    }
    first_error.map_or(Ok(()), Err)
}

// ============================================================================
// Shared State
// ============================================================================

struct WindowShared {
    id: WindowId,
    dispatcher: Arc<Dispatcher>,
    options: PlatformOptions,

    title: PropertyCell<String>,
    state: PropertyCell<WindowState>,
    border: PropertyCell<WindowBorder>,
    cursor_mode: PropertyCell<CursorMode>,
    opacity: PropertyCell<f32>,
    x: PropertyCell<i32>,
    y: PropertyCell<i32>,
    width: PropertyCell<i32>,
    height: PropertyCell<i32>,
    framebuffer_size: PropertyCell<Size>,
    focused: PropertyCell<bool>,
    exiting: PropertyCell<bool>,
    exists: PropertyCell<bool>,

    keyboard: KeyboardState,
    mouse: MouseState,
    joysticks: JoystickSlotTable,
    handlers: Handlers,

    closed: Mutex<bool>,
    closed_signal: Condvar,
}

impl WindowShared {
    fn ensure_exists(&self) -> Result<()> {
        if self.exists.get() {
            Ok(())
        } else {
            Err(WindowingError::Disposed("window"))
        }
    }

    fn emit(self: &Arc<Self>, event: WindowEvent) {
        let window = Window {
            shared: Arc::clone(self),
        };
        self.handlers.emit(&window, &event);
    }

    /// One frame: roll the device buffers, sample cursor and joysticks, then pump
    /// native events into the fresh frame. Runs on the dispatcher thread.
    fn process_frame(self: &Arc<Self>) -> Result<()> {
        if self.exiting.get() {
            return Ok(());
        }
        self.ensure_exists()?;

        let id = self.id;
        self.mouse.reset();
        self.keyboard.reset();
        let cursor = native::with(|p| p.cursor_position(id))?;
        self.mouse.set_position(cursor);

        let mut failure = None;
        self.joysticks
            .update_all(|slot| match native::with(|p| p.poll_joystick(slot)) {
                Ok(poll) => poll,
                Err(err) => {
                    failure.get_or_insert(err);
                    None
                }
            });
        if let Some(err) = failure {
            return Err(err);
        }

        let options = self.options;
        let events = native::with(|p| {
            if options.event_driven {
                p.wait_events(options.wait_timeout)
            } else {
                p.poll_events()
            }
        })?;
        dispatch(events)
    }

    fn handle(self: &Arc<Self>, event: NativeEvent) -> Result<()> {
        match event {
            NativeEvent::WindowMoved { position, .. } => {
                self.x.set(position.x);
                self.y.set(position.y);
                self.emit(WindowEvent::Moved(position));
            }
            NativeEvent::WindowResized { size, .. } => {
                self.width.set(size.width);
                self.height.set(size.height);
                self.emit(WindowEvent::Resized(size));
            }
            NativeEvent::FramebufferResized { size, .. } => {
                self.framebuffer_size.set(size);
                self.emit(WindowEvent::FramebufferResized(size));
            }
            NativeEvent::Focus { focused, .. } => {
                self.focused.set(focused);
                self.emit(if focused {
                    WindowEvent::FocusGained
                } else {
                    WindowEvent::FocusLost
                });
            }
            NativeEvent::Iconified { iconified, .. } => {
                self.change_state(iconified, WindowState::Minimized);
            }
            NativeEvent::Maximized { maximized, .. } => {
                self.change_state(maximized, WindowState::Maximized);
            }
            NativeEvent::Key {
                key,
                scan_code,
                event,
                modifiers,
                ..
            } => {
                self.keyboard.set(key, event);
                let args = KeyEventArgs {
                    key,
                    modifiers,
                    scan_code,
                    event,
                };
                match event {
                    KeyEvent::Down => self.emit(WindowEvent::KeyDown(args)),
                    KeyEvent::Up => self.emit(WindowEvent::KeyUp(args)),
                    KeyEvent::Repeat => self.emit(WindowEvent::KeyRepeat(args)),
                    KeyEvent::None => {}
                }
            }
            NativeEvent::MouseButton {
                button,
                event,
                modifiers,
                ..
            } => {
                self.mouse.set_button(button, event);
                let args = MouseEventArgs {
                    button: Some(button),
                    modifiers,
                    delta: self.mouse.delta(),
                    position: self.mouse.position(),
                    event,
                };
                match event {
                    KeyEvent::Down => self.emit(WindowEvent::MouseDown(args)),
                    KeyEvent::Up => self.emit(WindowEvent::MouseUp(args)),
                    KeyEvent::Repeat => self.emit(WindowEvent::MouseRepeat(args)),
                    KeyEvent::None => {}
                }
            }
            NativeEvent::CursorMoved { position, .. } => {
                self.mouse.set_position(position);
                let args = MouseEventArgs::motion(position, self.mouse.delta());
                self.emit(WindowEvent::MouseMove(args));
            }
            NativeEvent::CursorEntered { entered, .. } => {
                let args = MouseEventArgs::motion(self.mouse.position(), Vec2::ZERO);
                self.emit(if entered {
                    WindowEvent::MouseEntered(args)
                } else {
                    WindowEvent::MouseLeft(args)
                });
            }
            NativeEvent::Scroll { offset, .. } => {
                self.mouse.add_scroll(offset);
                let args = MouseEventArgs::motion(self.mouse.position(), offset);
                self.emit(WindowEvent::MouseWheel(args));
            }
            NativeEvent::Char { ch, .. } => self.emit(WindowEvent::TextInput(ch)),
            NativeEvent::Drop { paths, .. } => self.emit(WindowEvent::Drop(paths)),
            NativeEvent::JoystickConnection { id, connected } => {
                if connected {
                    match native::with(|p| p.joystick_info(id))? {
                        Some(info) => {
                            self.joysticks.connect(id, &info)?;
                        }
                        None => tracing::warn!(joystick = id, "connected joystick has no info"),
                    }
                    self.emit(WindowEvent::JoystickConnection { id, connected });
                } else {
                    self.emit(WindowEvent::JoystickConnection { id, connected });
                    self.joysticks.disconnect(id)?;
                }
            }
            NativeEvent::Refresh { .. } => self.emit(WindowEvent::Refresh),
            NativeEvent::CloseRequested { .. } => self.handle_close()?,
        }
        Ok(())
    }

    /// Enter `state` when `active`, fall back to normal when leaving it.
    fn change_state(self: &Arc<Self>, active: bool, state: WindowState) {
        let next = if active {
            state
        } else if self.state.get() == state {
            WindowState::Normal
        } else {
            return;
        };
        self.state.set(next);
        self.emit(WindowEvent::StateChanged(next));
    }

    fn handle_close(self: &Arc<Self>) -> Result<()> {
        if !self.exists.get() {
            return Ok(());
        }

        let request = Arc::new(CloseRequest::default());
        self.emit(WindowEvent::Closing(Arc::clone(&request)));
        if request.is_cancelled() {
            tracing::debug!(window = self.id.0, "close cancelled");
            let id = self.id;
            return native::with(|p| p.set_should_close(id, false));
        }

        self.destroy()?;
        self.emit(WindowEvent::Closed);
        self.exiting.set(true);
        *self.closed.lock() = true;
        self.closed_signal.notify_all();
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        let id = self.id;
        self.exists.set(false);
        unregister(id);
        native::with(|p| p.destroy_window(id))?;
        tracing::info!(window = id.0, "window destroyed");
        Ok(())
    }
}

impl Drop for WindowShared {
    fn drop(&mut self) {
        if !self.exists.get() {
            return;
        }
        let id = self.id;
        let result = self.dispatcher.invoke(move || {
            unregister(id);
            native::with(|p| p.destroy_window(id))
        });
        match result {
            Ok(()) => tracing::debug!(window = id.0, "window released"),
            Err(err) => tracing::debug!(window = id.0, error = %err, "window release failed"),
        }
    }
}

fn apply_state(p: &mut dyn Platform, id: WindowId, from: WindowState, to: WindowState) {
    match from {
        WindowState::FullScreen => p.set_fullscreen(id, false),
        WindowState::Maximized | WindowState::Minimized => p.restore_window(id),
        WindowState::Hidden => p.show_window(id),
        WindowState::Normal => {}
    }
    match to {
        WindowState::FullScreen => p.set_fullscreen(id, true),
        WindowState::Maximized => p.maximize_window(id),
        WindowState::Minimized => p.iconify_window(id),
        WindowState::Hidden => p.hide_window(id),
        WindowState::Normal => {}
    }
}

fn check_opacity(opacity: f32) -> Result<()> {
    if (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(WindowingError::InvalidArgument(format!(
            "opacity {opacity} is outside 0..=1"
        )))
    }
}

/// Shut the native library down after a failed creation, unless another window
/// on this thread still needs it.
fn creation_failed(dispatcher: &Dispatcher, err: WindowingError) -> WindowingError {
    if has_live_windows() {
        tracing::warn!(error = %err, "window creation failed");
        return err;
    }
    tracing::error!(error = %err, "window creation failed, terminating native context");
    if let Err(shutdown) = dispatcher.terminate() {
        tracing::warn!(error = %shutdown, "native context teardown failed");
    }
    err
}

fn create_on_owner(
    dispatcher: Arc<Dispatcher>,
    info: WindowCreateInfo,
    options: PlatformOptions,
) -> Result<Arc<WindowShared>> {
    if !dispatcher.is_owner_thread() {
        return Err(WindowingError::ThreadAffinity(
            "windows are created on the dispatcher thread".to_string(),
        ));
    }

    let created = native::with(|p| p.create_window(&info))
        .and_then(|created| created.map_err(WindowingError::from));
    let id = match created {
        Ok(id) => id,
        Err(err) => return Err(creation_failed(&dispatcher, err)),
    };
    let readback = native::with(|p| (p.window_position(id), p.window_size(id), p.framebuffer_size(id)));
    let (position, size, framebuffer_size) = match readback {
        Ok(values) => values,
        Err(err) => {
            let _ = native::with(|p| p.destroy_window(id));
            return Err(creation_failed(&dispatcher, err));
        }
    };

    let shared = Arc::new(WindowShared {
        id,
        dispatcher,
        options,
        title: PropertyCell::new(info.title.clone()),
        state: PropertyCell::new(info.state),
        border: PropertyCell::new(info.border),
        cursor_mode: PropertyCell::new(info.cursor_mode),
        opacity: PropertyCell::new(info.opacity),
        x: PropertyCell::new(position.x),
        y: PropertyCell::new(position.y),
        width: PropertyCell::new(size.width),
        height: PropertyCell::new(size.height),
        framebuffer_size: PropertyCell::new(framebuffer_size),
        focused: PropertyCell::new(false),
        exiting: PropertyCell::new(false),
        exists: PropertyCell::new(true),
        keyboard: KeyboardState::new(),
        mouse: MouseState::new(),
        joysticks: JoystickSlotTable::new(),
        handlers: Handlers::default(),
        closed: Mutex::new(false),
        closed_signal: Condvar::new(),
    });
    register(&shared);

    // From here on a failure drops `shared`, which destroys the native window.
    let present = native::with(|p| {
        (0..MAX_JOYSTICKS)
            .filter(|&slot| p.joystick_present(slot))
            .filter_map(|slot| p.joystick_info(slot).map(|info| (slot, info)))
            .collect::<Vec<_>>()
    })?;
    for (slot, joystick) in &present {
        shared.joysticks.connect(*slot, joystick)?;
    }

    if info.state != WindowState::FullScreen && position != info.position {
        native::with(|p| p.set_window_position(id, info.position))?;
        shared.x.set(info.position.x);
        shared.y.set(info.position.y);
    }

    tracing::info!(
        window = id.0,
        title = %info.title,
        width = size.width,
        height = size.height,
        joysticks = present.len(),
        "window created"
    );
    Ok(shared)
}

// ============================================================================
// Window
// ============================================================================

/// Handle to a native window owned by a [`Dispatcher`].
///
/// Clones refer to the same window. The native window is destroyed when it is
/// closed or when the last handle is dropped.
#[derive(Clone)]
pub struct Window {
    shared: Arc<WindowShared>,
}

impl Window {
    /// Create a native window on `dispatcher`.
    ///
    /// Joysticks that are already plugged in are picked up immediately.
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        info: WindowCreateInfo,
        options: PlatformOptions,
    ) -> Result<Self> {
        check_opacity(info.opacity)?;
        let owner = Arc::clone(&dispatcher);
        let shared = dispatcher.invoke(move || create_on_owner(owner, info, options))?;
        Ok(Self { shared })
    }

    pub fn id(&self) -> WindowId {
        self.shared.id
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.shared.dispatcher
    }

    pub fn options(&self) -> PlatformOptions {
        self.shared.options
    }

    /// Run `f` against the native window on the dispatcher thread.
    fn native<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn Platform, WindowId) -> R + Send + 'static,
        R: Send + 'static,
    {
        self.shared.ensure_exists()?;
        let id = self.shared.id;
        self.shared
            .dispatcher
            .invoke(move || native::with(|p| f(p, id)))
    }

    // ------------------------------------------------------------------------
    // Frame processing
    // ------------------------------------------------------------------------

    /// Advance input state one frame and deliver pending native events.
    ///
    /// Returns immediately once the window is exiting.
    pub fn process_events(&self) -> Result<()> {
        if self.is_exiting() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        self.shared
            .dispatcher
            .invoke(move || shared.process_frame())
    }

    /// Asynchronous [`process_events`](Self::process_events).
    pub fn begin_process_events(&self) -> PendingInvoke<()> {
        if self.is_exiting() {
            return PendingInvoke::ready(Ok(()));
        }
        let shared = Arc::clone(&self.shared);
        self.shared
            .dispatcher
            .begin_invoke(move || shared.process_frame())
    }

    // ------------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------------

    pub fn title(&self) -> String {
        self.shared.title.get()
    }

    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        self.shared.ensure_exists()?;
        let title = title.into();
        if !self.shared.title.set_if_changed(title.clone()) {
            return Ok(());
        }
        self.native(move |p, id| p.set_window_title(id, &title))
    }

    pub fn x(&self) -> i32 {
        self.shared.x.get()
    }

    pub fn y(&self) -> i32 {
        self.shared.y.get()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x(), self.y())
    }

    pub fn set_position(&self, position: Point) -> Result<()> {
        self.shared.ensure_exists()?;
        if self.position() == position {
            return Ok(());
        }
        self.shared.x.set(position.x);
        self.shared.y.set(position.y);
        self.native(move |p, id| p.set_window_position(id, position))
    }

    pub fn set_x(&self, x: i32) -> Result<()> {
        self.set_position(Point::new(x, self.y()))
    }

    pub fn set_y(&self, y: i32) -> Result<()> {
        self.set_position(Point::new(self.x(), y))
    }

    pub fn width(&self) -> i32 {
        self.shared.width.get()
    }

    pub fn height(&self) -> i32 {
        self.shared.height.get()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn set_size(&self, size: Size) -> Result<()> {
        self.shared.ensure_exists()?;
        if size.width <= 0 || size.height <= 0 {
            return Err(WindowingError::InvalidArgument(format!(
                "window size {}x{} must be positive",
                size.width, size.height
            )));
        }
        if self.size() == size {
            return Ok(());
        }
        self.shared.width.set(size.width);
        self.shared.height.set(size.height);
        self.native(move |p, id| p.set_window_size(id, size))
    }

    pub fn set_width(&self, width: i32) -> Result<()> {
        self.set_size(Size::new(width, self.height()))
    }

    pub fn set_height(&self, height: i32) -> Result<()> {
        self.set_size(Size::new(self.width(), height))
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.position(), self.size())
    }

    /// Drawable size in pixels; differs from [`size`](Self::size) on scaled displays.
    pub fn framebuffer_size(&self) -> Size {
        self.shared.framebuffer_size.get()
    }

    pub fn window_state(&self) -> WindowState {
        self.shared.state.get()
    }

    pub fn set_window_state(&self, state: WindowState) -> Result<()> {
        self.shared.ensure_exists()?;
        let previous = self.shared.state.replace(state);
        if previous == state {
            return Ok(());
        }
        tracing::debug!(window = self.id().0, ?previous, ?state, "window state change");
        self.native(move |p, id| apply_state(p, id, previous, state))
    }

    pub fn border(&self) -> WindowBorder {
        self.shared.border.get()
    }

    pub fn set_border(&self, border: WindowBorder) -> Result<()> {
        self.shared.ensure_exists()?;
        if !self.shared.border.set_if_changed(border) {
            return Ok(());
        }
        self.native(move |p, id| {
            p.set_decorated(id, border.is_decorated());
            p.set_resizable(id, border.is_resizable());
        })
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.shared.cursor_mode.get()
    }

    pub fn set_cursor_mode(&self, mode: CursorMode) -> Result<()> {
        self.shared.ensure_exists()?;
        if !self.shared.cursor_mode.set_if_changed(mode) {
            return Ok(());
        }
        self.native(move |p, id| p.set_cursor_mode(id, mode))
    }

    pub fn opacity(&self) -> f32 {
        self.shared.opacity.get()
    }

    pub fn set_opacity(&self, opacity: f32) -> Result<()> {
        self.shared.ensure_exists()?;
        check_opacity(opacity)?;
        if !self.shared.opacity.set_if_changed(opacity) {
            return Ok(());
        }
        self.native(move |p, id| p.set_window_opacity(id, opacity))
    }

    pub fn is_focused(&self) -> bool {
        self.shared.focused.get()
    }

    pub fn is_exiting(&self) -> bool {
        self.shared.exiting.get()
    }

    /// Stop (or resume) frame processing.
    pub fn set_exiting(&self, exiting: bool) {
        self.shared.exiting.set(exiting);
    }

    /// Whether the native window is still alive.
    pub fn exists(&self) -> bool {
        self.shared.exists.get()
    }

    /// Client coordinates to screen coordinates.
    pub fn point_to_screen(&self, point: Point) -> Point {
        let origin = self.position();
        Point::new(origin.x + point.x, origin.y + point.y)
    }

    pub fn clipboard(&self) -> Result<Option<String>> {
        self.native(|p, _| p.clipboard_string())
    }

    pub fn set_clipboard(&self, text: impl Into<String>) -> Result<()> {
        let text = text.into();
        self.native(move |p, _| p.set_clipboard_string(&text))
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    pub fn keyboard(&self) -> &KeyboardState {
        &self.shared.keyboard
    }

    pub fn mouse(&self) -> &MouseState {
        &self.shared.mouse
    }

    pub fn joysticks(&self) -> &JoystickSlotTable {
        &self.shared.joysticks
    }

    /// State of joystick `id`, `None` while nothing is plugged into that slot.
    pub fn joystick(&self, id: usize) -> Result<Option<Arc<JoystickState>>> {
        self.shared.joysticks.get(id)
    }

    // ------------------------------------------------------------------------
    // Notifications and closing
    // ------------------------------------------------------------------------

    /// Register `handler` for every notification of this window.
    ///
    /// Handlers run on the dispatcher thread while the native callback is being
    /// processed.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Window, &WindowEvent) + Send + Sync + 'static,
    {
        self.shared.handlers.subscribe(Arc::new(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.handlers.unsubscribe(id)
    }

    /// Ask the window to close, as if the user clicked the close button.
    ///
    /// Subscribers see [`WindowEvent::Closing`] and may cancel.
    pub fn close(&self) -> Result<()> {
        self.shared.ensure_exists()?;
        let shared = Arc::clone(&self.shared);
        self.shared.dispatcher.invoke(move || shared.handle_close())
    }

    /// Block until the window has been closed.
    pub fn wait_close(&self) -> Result<()> {
        if self.shared.dispatcher.is_owner_thread() {
            return Err(WindowingError::ThreadAffinity(
                "wait_close would block the dispatcher thread".to_string(),
            ));
        }
        let mut closed = self.shared.closed.lock();
        while !*closed {
            self.shared.closed_signal.wait(&mut closed);
        }
        Ok(())
    }

    /// [`wait_close`](Self::wait_close) with a deadline. Returns whether the
    /// window closed in time.
    pub fn wait_close_timeout(&self, timeout: Duration) -> Result<bool> {
        if self.shared.dispatcher.is_owner_thread() {
            return Err(WindowingError::ThreadAffinity(
                "wait_close would block the dispatcher thread".to_string(),
            ));
        }
        let deadline = Instant::now() + timeout;
        let mut closed = self.shared.closed.lock();
        while !*closed {
            if self
                .shared
                .closed_signal
                .wait_until(&mut closed, deadline)
                .timed_out()
            {
                break;
            }
        }
        Ok(*closed)
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("id", &self.shared.id)
            .field("title", &self.title())
            .field("bounds", &self.bounds())
            .field("state", &self.window_state())
            .field("exists", &self.exists())
            .finish()
    }
}
