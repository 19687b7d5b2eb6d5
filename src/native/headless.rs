//! In-process platform with no display
//!
//! [`HeadlessPlatform`] keeps window attributes in memory and reports the events a
//! desktop window manager would. A [`HeadlessController`] shares its state and can
//! be used from any thread to inject input, plug joysticks and provoke errors.

use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use super::{NativeEvent, NativeResult, Platform, WindowId};
use crate::error::{NativeError, Result, WindowingError};
use crate::geometry::{Point, Rect, Size, Vec2};
use crate::input::{
    JoystickInfo, JoystickPoll, Key, KeyEvent, KeyModifiers, MouseButton, MAX_JOYSTICKS,
};
use crate::window::{CursorMode, WindowCreateInfo, WindowState};

/// Size of the single virtual monitor.
pub const SCREEN_SIZE: Size = Size::new(1920, 1080);

/// Error code for calls naming a window that does not exist.
pub const ERROR_INVALID_WINDOW: i32 = 0x0001_0002;

/// Attributes of one virtual window.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessWindow {
    pub title: String,
    pub position: Point,
    pub size: Size,
    pub visible: bool,
    pub iconified: bool,
    pub maximized: bool,
    pub fullscreen: bool,
    pub decorated: bool,
    pub resizable: bool,
    pub cursor_mode: CursorMode,
    pub opacity: f32,
    pub should_close: bool,
    pub cursor: Vec2,
    saved_geometry: Option<Rect>,
}

impl HeadlessWindow {
    fn new(info: &WindowCreateInfo) -> Self {
        let mut window = Self {
            title: info.title.clone(),
            position: info.position,
            size: info.size,
            visible: info.state != WindowState::Hidden,
            iconified: info.state == WindowState::Minimized,
            maximized: info.state == WindowState::Maximized,
            fullscreen: false,
            decorated: info.border.is_decorated(),
            resizable: info.border.is_resizable(),
            cursor_mode: info.cursor_mode,
            opacity: info.opacity,
            should_close: false,
            cursor: Vec2::ZERO,
            saved_geometry: None,
        };
        if info.state == WindowState::FullScreen {
            window.enter_fullscreen();
        }
        window
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    fn enter_fullscreen(&mut self) {
        self.saved_geometry = Some(self.bounds());
        self.position = Point::new(0, 0);
        self.size = SCREEN_SIZE;
        self.fullscreen = true;
    }

    fn leave_fullscreen(&mut self) {
        if let Some(saved) = self.saved_geometry.take() {
            self.position = saved.corner;
            self.size = saved.extent;
        }
        self.fullscreen = false;
    }
}

#[derive(Debug, Clone)]
struct HeadlessJoystick {
    info: JoystickInfo,
    input: JoystickPoll,
}

#[derive(Debug, Default)]
struct State {
    next_window: u64,
    windows: BTreeMap<WindowId, HeadlessWindow>,
    events: VecDeque<NativeEvent>,
    joysticks: [Option<HeadlessJoystick>; MAX_JOYSTICKS],
    error: Option<NativeError>,
    create_failure: Option<NativeError>,
    clipboard: Option<String>,
}

impl State {
    fn push(&mut self, event: NativeEvent) {
        self.events.push_back(event);
    }

    fn fail(&mut self, error: NativeError) {
        self.error = Some(error);
    }

    /// Apply `f` to a window, recording an error when it does not exist.
    fn with_window(&mut self, id: WindowId, f: impl FnOnce(&mut HeadlessWindow, &mut Vec<NativeEvent>)) {
        let mut events = Vec::new();
        match self.windows.get_mut(&id) {
            Some(window) => f(window, &mut events),
            None => {
                self.fail(NativeError::new(
                    ERROR_INVALID_WINDOW,
                    format!("invalid window handle {}", id.0),
                ));
                return;
            }
        }
        self.events.extend(events);
    }

    fn window(&self, id: WindowId) -> Option<&HeadlessWindow> {
        self.windows.get(&id)
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    events_ready: Condvar,
}

/// Scripting handle for a [`HeadlessPlatform`]. Cheap to clone, usable anywhere.
#[derive(Debug, Clone, Default)]
pub struct HeadlessController {
    shared: Arc<Shared>,
}

impl HeadlessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform bound to this controller's state.
    pub fn platform(&self) -> HeadlessPlatform {
        HeadlessPlatform {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Queue a raw event and wake a waiting `wait_events`.
    pub fn push_event(&self, event: NativeEvent) {
        self.shared.state.lock().push(event);
        self.shared.events_ready.notify_all();
    }

    pub fn key(&self, window: WindowId, key: Key, event: KeyEvent) {
        self.key_with_modifiers(window, key, event, KeyModifiers::empty());
    }

    pub fn key_with_modifiers(
        &self,
        window: WindowId,
        key: Key,
        event: KeyEvent,
        modifiers: KeyModifiers,
    ) {
        self.push_event(NativeEvent::Key {
            window,
            key,
            scan_code: i32::from(key.code()),
            event,
            modifiers,
        });
    }

    pub fn mouse_button(&self, window: WindowId, button: MouseButton, event: KeyEvent) {
        self.push_event(NativeEvent::MouseButton {
            window,
            button,
            event,
            modifiers: KeyModifiers::empty(),
        });
    }

    /// Move the cursor; also what `cursor_position` reports from now on.
    pub fn move_cursor(&self, window: WindowId, position: Vec2) {
        {
            let mut state = self.shared.state.lock();
            if let Some(w) = state.windows.get_mut(&window) {
                w.cursor = position;
            }
            state.push(NativeEvent::CursorMoved { window, position });
        }
        self.shared.events_ready.notify_all();
    }

    pub fn scroll(&self, window: WindowId, offset: Vec2) {
        self.push_event(NativeEvent::Scroll { window, offset });
    }

    pub fn type_text(&self, window: WindowId, text: &str) {
        {
            let mut state = self.shared.state.lock();
            for ch in text.chars() {
                state.push(NativeEvent::Char { window, ch });
            }
        }
        self.shared.events_ready.notify_all();
    }

    pub fn drop_files(&self, window: WindowId, paths: Vec<PathBuf>) {
        self.push_event(NativeEvent::Drop { window, paths });
    }

    pub fn set_focus(&self, window: WindowId, focused: bool) {
        self.push_event(NativeEvent::Focus { window, focused });
    }

    /// What the user clicking the close button does.
    pub fn request_close(&self, window: WindowId) {
        {
            let mut state = self.shared.state.lock();
            if let Some(w) = state.windows.get_mut(&window) {
                w.should_close = true;
            }
            state.push(NativeEvent::CloseRequested { window });
        }
        self.shared.events_ready.notify_all();
    }

    /// Plug a device into slot `id` with neutral input.
    pub fn connect_joystick(&self, id: usize, info: JoystickInfo) -> Result<()> {
        check_joystick(id)?;
        {
            let mut state = self.shared.state.lock();
            let input = JoystickPoll {
                buttons: vec![false; info.button_count],
                axes: vec![0.0; info.axis_count],
                hats: vec![Default::default(); info.hat_count],
            };
            state.joysticks[id] = Some(HeadlessJoystick { info, input });
            state.push(NativeEvent::JoystickConnection {
                id,
                connected: true,
            });
        }
        self.shared.events_ready.notify_all();
        Ok(())
    }

    pub fn disconnect_joystick(&self, id: usize) -> Result<()> {
        check_joystick(id)?;
        {
            let mut state = self.shared.state.lock();
            if state.joysticks[id].take().is_some() {
                state.push(NativeEvent::JoystickConnection {
                    id,
                    connected: false,
                });
            }
        }
        self.shared.events_ready.notify_all();
        Ok(())
    }

    /// Raw input the next `poll_joystick(id)` reports.
    pub fn set_joystick_input(&self, id: usize, input: JoystickPoll) -> Result<()> {
        check_joystick(id)?;
        match self.shared.state.lock().joysticks[id].as_mut() {
            Some(joystick) => {
                joystick.input = input;
                Ok(())
            }
            None => Err(WindowingError::InvalidArgument(format!(
                "joystick {id} is not connected"
            ))),
        }
    }

    /// Record an asynchronous error, reported by the next native call.
    pub fn raise_error(&self, error: NativeError) {
        self.shared.state.lock().fail(error);
    }

    /// Make the next `create_window` fail with `error`.
    pub fn fail_next_window(&self, error: NativeError) {
        self.shared.state.lock().create_failure = Some(error);
    }

    pub fn window(&self, id: WindowId) -> Option<HeadlessWindow> {
        self.shared.state.lock().window(id).cloned()
    }

    pub fn window_ids(&self) -> Vec<WindowId> {
        self.shared.state.lock().windows.keys().copied().collect()
    }

    pub fn pending_events(&self) -> usize {
        self.shared.state.lock().events.len()
    }

    pub fn clipboard(&self) -> Option<String> {
        self.shared.state.lock().clipboard.clone()
    }
}

fn check_joystick(id: usize) -> Result<()> {
    if id < MAX_JOYSTICKS {
        Ok(())
    } else {
        Err(WindowingError::IndexOutOfRange {
            index: id,
            len: MAX_JOYSTICKS,
        })
    }
}

/// The platform half. Install it on a dispatcher thread.
#[derive(Debug)]
pub struct HeadlessPlatform {
    shared: Arc<Shared>,
}

impl HeadlessPlatform {
    fn query<R: Default>(&self, id: WindowId, f: impl FnOnce(&HeadlessWindow) -> R) -> R {
        let mut state = self.shared.state.lock();
        match state.window(id).map(f) {
            Some(value) => value,
            None => {
                state.fail(NativeError::new(
                    ERROR_INVALID_WINDOW,
                    format!("invalid window handle {}", id.0),
                ));
                R::default()
            }
        }
    }

    fn update(&mut self, id: WindowId, f: impl FnOnce(&mut HeadlessWindow, &mut Vec<NativeEvent>)) {
        self.shared.state.lock().with_window(id, f);
    }
}

fn geometry_events(window: WindowId, before: Rect, after: Rect, events: &mut Vec<NativeEvent>) {
    if before.corner != after.corner {
        events.push(NativeEvent::WindowMoved {
            window,
            position: after.corner,
        });
    }
    if before.extent != after.extent {
        events.push(NativeEvent::WindowResized {
            window,
            size: after.extent,
        });
        events.push(NativeEvent::FramebufferResized {
            window,
            size: after.extent,
        });
    }
}

impl Platform for HeadlessPlatform {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_window(&mut self, info: &WindowCreateInfo) -> NativeResult<WindowId> {
        let mut state = self.shared.state.lock();
        if let Some(error) = state.create_failure.take() {
            return Err(error);
        }
        state.next_window += 1;
        let id = WindowId(state.next_window);
        state.windows.insert(id, HeadlessWindow::new(info));
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        let mut state = self.shared.state.lock();
        if state.windows.remove(&window).is_none() {
            state.fail(NativeError::new(
                ERROR_INVALID_WINDOW,
                format!("invalid window handle {}", window.0),
            ));
        }
        state
            .events
            .retain(|event| event.window() != Some(window));
    }

    fn poll_events(&mut self) -> Vec<NativeEvent> {
        self.shared.state.lock().events.drain(..).collect()
    }

    fn wait_events(&mut self, timeout: Duration) -> Vec<NativeEvent> {
        let mut state = self.shared.state.lock();
        if state.events.is_empty() {
            let _ = self.shared.events_ready.wait_for(&mut state, timeout);
        }
        state.events.drain(..).collect()
    }

    fn window_position(&self, window: WindowId) -> Point {
        self.query(window, |w| w.position)
    }

    fn set_window_position(&mut self, window: WindowId, position: Point) {
        self.update(window, |w, events| {
            let before = w.bounds();
            w.position = position;
            geometry_events(window, before, w.bounds(), events);
        });
    }

    fn window_size(&self, window: WindowId) -> Size {
        self.query(window, |w| w.size)
    }

    fn set_window_size(&mut self, window: WindowId, size: Size) {
        self.update(window, |w, events| {
            let before = w.bounds();
            w.size = size;
            geometry_events(window, before, w.bounds(), events);
        });
    }

    fn framebuffer_size(&self, window: WindowId) -> Size {
        self.query(window, |w| w.size)
    }

    fn set_window_title(&mut self, window: WindowId, title: &str) {
        self.update(window, |w, _| w.title = title.to_string());
    }

    fn iconify_window(&mut self, window: WindowId) {
        self.update(window, |w, events| {
            if !w.iconified {
                w.iconified = true;
                events.push(NativeEvent::Iconified {
                    window,
                    iconified: true,
                });
            }
        });
    }

    fn maximize_window(&mut self, window: WindowId) {
        self.update(window, |w, events| {
            if !w.maximized {
                w.maximized = true;
                events.push(NativeEvent::Maximized {
                    window,
                    maximized: true,
                });
            }
        });
    }

    fn restore_window(&mut self, window: WindowId) {
        self.update(window, |w, events| {
            if w.iconified {
                w.iconified = false;
                events.push(NativeEvent::Iconified {
                    window,
                    iconified: false,
                });
            } else if w.maximized {
                w.maximized = false;
                events.push(NativeEvent::Maximized {
                    window,
                    maximized: false,
                });
            }
        });
    }

    fn show_window(&mut self, window: WindowId) {
        self.update(window, |w, _| w.visible = true);
    }

    fn hide_window(&mut self, window: WindowId) {
        self.update(window, |w, _| w.visible = false);
    }

    fn set_fullscreen(&mut self, window: WindowId, fullscreen: bool) {
        self.update(window, |w, events| {
            if w.fullscreen == fullscreen {
                return;
            }
            let before = w.bounds();
            if fullscreen {
                w.enter_fullscreen();
            } else {
                w.leave_fullscreen();
            }
            geometry_events(window, before, w.bounds(), events);
        });
    }

    fn set_decorated(&mut self, window: WindowId, decorated: bool) {
        self.update(window, |w, _| w.decorated = decorated);
    }

    fn set_resizable(&mut self, window: WindowId, resizable: bool) {
        self.update(window, |w, _| w.resizable = resizable);
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        self.update(window, |w, _| w.cursor_mode = mode);
    }

    fn set_window_opacity(&mut self, window: WindowId, opacity: f32) {
        self.update(window, |w, _| w.opacity = opacity);
    }

    fn set_should_close(&mut self, window: WindowId, should_close: bool) {
        self.update(window, |w, _| w.should_close = should_close);
    }

    fn cursor_position(&self, window: WindowId) -> Vec2 {
        self.query(window, |w| w.cursor)
    }

    fn clipboard_string(&mut self) -> Option<String> {
        self.shared.state.lock().clipboard.clone()
    }

    fn set_clipboard_string(&mut self, text: &str) {
        self.shared.state.lock().clipboard = Some(text.to_string());
    }

    fn joystick_present(&self, id: usize) -> bool {
        id < MAX_JOYSTICKS && self.shared.state.lock().joysticks[id].is_some()
    }

    fn joystick_info(&self, id: usize) -> Option<JoystickInfo> {
        let state = self.shared.state.lock();
        state
            .joysticks
            .get(id)
            .and_then(|slot| slot.as_ref())
            .map(|joystick| joystick.info.clone())
    }

    fn poll_joystick(&mut self, id: usize) -> Option<JoystickPoll> {
        let state = self.shared.state.lock();
        state
            .joysticks
            .get(id)
            .and_then(|slot| slot.as_ref())
            .map(|joystick| joystick.input.clone())
    }

    fn take_error(&mut self) -> Option<NativeError> {
        self.shared.state.lock().error.take()
    }
}
