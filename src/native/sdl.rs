//! SDL2 platform
//!
//! Enabled with the `sdl` cargo feature. SDL scancodes already use USB HID usage
//! ids, so they map onto [`Key`] codes one to one.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use sdl2::event::{Event, WindowEvent as SdlWindowEvent};
use sdl2::joystick::{HatState, Joystick};
use sdl2::keyboard::Mod;
use sdl2::mouse::MouseButton as SdlMouseButton;
use sdl2::video::{FullscreenType, Window as SdlWindow, WindowPos};
use sdl2::{EventPump, JoystickSubsystem, Sdl, VideoSubsystem};

use super::{NativeEvent, NativeResult, Platform, WindowId};
use crate::error::NativeError;
use crate::geometry::{Point, Size, Vec2};
use crate::input::{
    Hat, JoystickInfo, JoystickPoll, Key, KeyEvent, KeyModifiers, MouseButton, MAX_JOYSTICKS,
};
use crate::window::{CursorMode, WindowCreateInfo, WindowState};

pub struct SdlPlatform {
    sdl: Sdl,
    video: VideoSubsystem,
    joystick: JoystickSubsystem,
    event_pump: EventPump,
    windows: HashMap<WindowId, SdlWindow>,
    joysticks: [Option<Joystick>; MAX_JOYSTICKS],
    error: Cell<Option<NativeError>>,
}

impl SdlPlatform {
    /// Initialize SDL video and joystick support. Must run on the dispatcher thread.
    pub fn new() -> NativeResult<Self> {
        tracing::info!("Initializing SDL2");

        let sdl = sdl2::init().map_err(|e| NativeError::message(format!("SDL2 init: {e}")))?;
        let video = sdl
            .video()
            .map_err(|e| NativeError::message(format!("video subsystem: {e}")))?;
        let joystick = sdl
            .joystick()
            .map_err(|e| NativeError::message(format!("joystick subsystem: {e}")))?;
        let event_pump = sdl
            .event_pump()
            .map_err(|e| NativeError::message(format!("event pump: {e}")))?;

        tracing::info!(driver = video.current_video_driver(), "SDL2 video ready");

        let mut platform = Self {
            sdl,
            video,
            joystick,
            event_pump,
            windows: HashMap::new(),
            joysticks: Default::default(),
            error: Cell::new(None),
        };

        let present = platform.joystick.num_joysticks().unwrap_or(0);
        for index in 0..present.min(MAX_JOYSTICKS as u32) {
            platform.open_joystick(index);
        }
        Ok(platform)
    }

    fn fail(&self, description: impl Into<String>) {
        self.error.set(Some(NativeError::message(description)));
    }

    fn query<R: Default>(&self, id: WindowId, f: impl FnOnce(&SdlWindow) -> R) -> R {
        match self.windows.get(&id) {
            Some(window) => f(window),
            None => {
                self.fail(format!("invalid window handle {}", id.0));
                R::default()
            }
        }
    }

    fn update(&mut self, id: WindowId, f: impl FnOnce(&mut SdlWindow) -> Result<(), String>) {
        let result = match self.windows.get_mut(&id) {
            Some(window) => f(window),
            None => Err(format!("invalid window handle {}", id.0)),
        };
        if let Err(description) = result {
            self.fail(description);
        }
    }

    fn open_joystick(&mut self, index: u32) -> bool {
        let slot = index as usize;
        if slot >= MAX_JOYSTICKS {
            tracing::warn!(index, "joystick beyond the last slot ignored");
            return false;
        }
        if self.joysticks[slot].is_some() {
            return true;
        }
        match self.joystick.open(index) {
            Ok(joystick) => {
                self.joysticks[slot] = Some(joystick);
                true
            }
            Err(e) => {
                self.fail(format!("open joystick {index}: {e}"));
                false
            }
        }
    }

    fn slot_of_instance(&self, instance: u32) -> Option<usize> {
        self.joysticks.iter().position(|joystick| {
            joystick
                .as_ref()
                .is_some_and(|joystick| joystick.instance_id() == instance)
        })
    }

    fn modifiers(&self) -> KeyModifiers {
        map_modifiers(self.sdl.keyboard().mod_state())
    }

    fn translate(&mut self, event: Event, out: &mut Vec<NativeEvent>) {
        match event {
            Event::KeyDown {
                window_id,
                scancode: Some(scancode),
                keymod,
                repeat,
                ..
            } => {
                let event = if repeat { KeyEvent::Repeat } else { KeyEvent::Down };
                push_key(out, window_id, scancode as i32, keymod, event);
            }
            Event::KeyUp {
                window_id,
                scancode: Some(scancode),
                keymod,
                ..
            } => push_key(out, window_id, scancode as i32, keymod, KeyEvent::Up),
            Event::MouseButtonDown {
                window_id,
                mouse_btn,
                ..
            } => {
                if let Some(button) = map_mouse_button(mouse_btn) {
                    out.push(NativeEvent::MouseButton {
                        window: WindowId(window_id.into()),
                        button,
                        event: KeyEvent::Down,
                        modifiers: self.modifiers(),
                    });
                }
            }
            Event::MouseButtonUp {
                window_id,
                mouse_btn,
                ..
            } => {
                if let Some(button) = map_mouse_button(mouse_btn) {
                    out.push(NativeEvent::MouseButton {
                        window: WindowId(window_id.into()),
                        button,
                        event: KeyEvent::Up,
                        modifiers: self.modifiers(),
                    });
                }
            }
            Event::MouseMotion {
                window_id, x, y, ..
            } => out.push(NativeEvent::CursorMoved {
                window: WindowId(window_id.into()),
                position: Vec2::new(x as f32, y as f32),
            }),
            Event::MouseWheel {
                window_id, x, y, ..
            } => out.push(NativeEvent::Scroll {
                window: WindowId(window_id.into()),
                offset: Vec2::new(x as f32, y as f32),
            }),
            Event::TextInput {
                window_id, text, ..
            } => {
                let window = WindowId(window_id.into());
                out.extend(text.chars().map(|ch| NativeEvent::Char { window, ch }));
            }
            Event::DropFile {
                window_id,
                filename,
                ..
            } => out.push(NativeEvent::Drop {
                window: WindowId(window_id.into()),
                paths: vec![PathBuf::from(filename)],
            }),
            Event::Window {
                window_id,
                win_event,
                ..
            } => self.translate_window_event(WindowId(window_id.into()), win_event, out),
            Event::JoyDeviceAdded { which, .. } => {
                if self.open_joystick(which) {
                    out.push(NativeEvent::JoystickConnection {
                        id: which as usize,
                        connected: true,
                    });
                }
            }
            Event::JoyDeviceRemoved { which, .. } => {
                if let Some(slot) = self.slot_of_instance(which) {
                    self.joysticks[slot] = None;
                    out.push(NativeEvent::JoystickConnection {
                        id: slot,
                        connected: false,
                    });
                }
            }
            _ => {}
        }
    }

    fn translate_window_event(
        &self,
        window: WindowId,
        event: SdlWindowEvent,
        out: &mut Vec<NativeEvent>,
    ) {
        match event {
            SdlWindowEvent::Moved(x, y) => out.push(NativeEvent::WindowMoved {
                window,
                position: Point::new(x, y),
            }),
            SdlWindowEvent::SizeChanged(width, height) => {
                out.push(NativeEvent::WindowResized {
                    window,
                    size: Size::new(width, height),
                });
                out.push(NativeEvent::FramebufferResized {
                    window,
                    size: self.framebuffer_size(window),
                });
            }
            SdlWindowEvent::FocusGained => out.push(NativeEvent::Focus {
                window,
                focused: true,
            }),
            SdlWindowEvent::FocusLost => out.push(NativeEvent::Focus {
                window,
                focused: false,
            }),
            SdlWindowEvent::Minimized => out.push(NativeEvent::Iconified {
                window,
                iconified: true,
            }),
            SdlWindowEvent::Maximized => out.push(NativeEvent::Maximized {
                window,
                maximized: true,
            }),
            SdlWindowEvent::Restored => {
                out.push(NativeEvent::Iconified {
                    window,
                    iconified: false,
                });
                out.push(NativeEvent::Maximized {
                    window,
                    maximized: false,
                });
            }
            SdlWindowEvent::Enter => out.push(NativeEvent::CursorEntered {
                window,
                entered: true,
            }),
            SdlWindowEvent::Leave => out.push(NativeEvent::CursorEntered {
                window,
                entered: false,
            }),
            SdlWindowEvent::Exposed => out.push(NativeEvent::Refresh { window }),
            SdlWindowEvent::Close => out.push(NativeEvent::CloseRequested { window }),
            _ => {}
        }
    }

    fn drain(&mut self, first: Option<Event>) -> Vec<NativeEvent> {
        let mut raw: Vec<Event> = first.into_iter().collect();
        raw.extend(self.event_pump.poll_iter());

        let mut out = Vec::with_capacity(raw.len());
        for event in raw {
            self.translate(event, &mut out);
        }
        out
    }
}

fn push_key(
    out: &mut Vec<NativeEvent>,
    window_id: u32,
    scan_code: i32,
    keymod: Mod,
    event: KeyEvent,
) {
    let key = match u16::try_from(scan_code)
        .ok()
        .and_then(|code| Key::from_code(code).ok())
    {
        Some(key) => key,
        None => {
            tracing::trace!(scan_code, "scancode outside the key table");
            return;
        }
    };
    out.push(NativeEvent::Key {
        window: WindowId(window_id.into()),
        key,
        scan_code,
        event,
        modifiers: map_modifiers(keymod),
    });
}

fn map_modifiers(keymod: Mod) -> KeyModifiers {
    let mut modifiers = KeyModifiers::empty();
    if keymod.intersects(Mod::LSHIFTMOD | Mod::RSHIFTMOD) {
        modifiers |= KeyModifiers::SHIFT;
    }
    if keymod.intersects(Mod::LCTRLMOD | Mod::RCTRLMOD) {
        modifiers |= KeyModifiers::CONTROL;
    }
    if keymod.intersects(Mod::LALTMOD | Mod::RALTMOD) {
        modifiers |= KeyModifiers::ALT;
    }
    if keymod.intersects(Mod::LGUIMOD | Mod::RGUIMOD) {
        modifiers |= KeyModifiers::SUPER;
    }
    if keymod.contains(Mod::CAPSMOD) {
        modifiers |= KeyModifiers::CAPS_LOCK;
    }
    if keymod.contains(Mod::NUMMOD) {
        modifiers |= KeyModifiers::NUM_LOCK;
    }
    modifiers
}

fn map_mouse_button(button: SdlMouseButton) -> Option<MouseButton> {
    match button {
        SdlMouseButton::Left => Some(MouseButton::LEFT),
        SdlMouseButton::Right => Some(MouseButton::RIGHT),
        SdlMouseButton::Middle => Some(MouseButton::MIDDLE),
        SdlMouseButton::X1 => Some(MouseButton::Button4),
        SdlMouseButton::X2 => Some(MouseButton::Button5),
        SdlMouseButton::Unknown => None,
    }
}

fn map_hat(hat: HatState) -> Hat {
    match hat {
        HatState::Centered => Hat::CENTERED,
        HatState::Up => Hat::UP,
        HatState::Right => Hat::RIGHT,
        HatState::Down => Hat::DOWN,
        HatState::Left => Hat::LEFT,
        HatState::RightUp => Hat::RIGHT_UP,
        HatState::RightDown => Hat::RIGHT_DOWN,
        HatState::LeftUp => Hat::LEFT_UP,
        HatState::LeftDown => Hat::LEFT_DOWN,
    }
}

fn normalize_axis(value: i16) -> f32 {
    (f32::from(value) / 32767.0).clamp(-1.0, 1.0)
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value.max(1)).unwrap_or(1)
}

impl Platform for SdlPlatform {
    fn name(&self) -> &str {
        "sdl2"
    }

    fn create_window(&mut self, info: &WindowCreateInfo) -> NativeResult<WindowId> {
        let mut builder =
            self.video
                .window(&info.title, to_u32(info.size.width), to_u32(info.size.height));
        builder.position(info.position.x, info.position.y).allow_highdpi();
        if info.border.is_resizable() {
            builder.resizable();
        }
        if !info.border.is_decorated() {
            builder.borderless();
        }
        match info.state {
            WindowState::Hidden => {
                builder.hidden();
            }
            WindowState::Maximized => {
                builder.maximized();
            }
            WindowState::Minimized => {
                builder.minimized();
            }
            WindowState::FullScreen => {
                builder.fullscreen_desktop();
            }
            WindowState::Normal => {}
        }

        let mut window = builder
            .build()
            .map_err(|e| NativeError::message(format!("create window: {e}")))?;
        if info.opacity < 1.0 {
            window
                .set_opacity(info.opacity)
                .map_err(|e| NativeError::message(format!("set opacity: {e}")))?;
        }

        let id = WindowId(window.id().into());
        self.windows.insert(id, window);
        self.set_cursor_mode(id, info.cursor_mode);
        Ok(id)
    }

    fn destroy_window(&mut self, window: WindowId) {
        if self.windows.remove(&window).is_none() {
            self.fail(format!("invalid window handle {}", window.0));
        }
    }

    fn poll_events(&mut self) -> Vec<NativeEvent> {
        self.drain(None)
    }

    fn wait_events(&mut self, timeout: Duration) -> Vec<NativeEvent> {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        let first = self.event_pump.wait_event_timeout(millis);
        self.drain(first)
    }

    fn window_position(&self, window: WindowId) -> Point {
        self.query(window, |w| {
            let (x, y) = w.position();
            Point::new(x, y)
        })
    }

    fn set_window_position(&mut self, window: WindowId, position: Point) {
        self.update(window, |w| {
            w.set_position(
                WindowPos::Positioned(position.x),
                WindowPos::Positioned(position.y),
            );
            Ok(())
        });
    }

    fn window_size(&self, window: WindowId) -> Size {
        self.query(window, |w| {
            let (width, height) = w.size();
            Size::new(width as i32, height as i32)
        })
    }

    fn set_window_size(&mut self, window: WindowId, size: Size) {
        self.update(window, |w| {
            w.set_size(to_u32(size.width), to_u32(size.height))
                .map_err(|e| format!("set size: {e}"))
        });
    }

    fn framebuffer_size(&self, window: WindowId) -> Size {
        self.query(window, |w| {
            let (width, height) = w.drawable_size();
            Size::new(width as i32, height as i32)
        })
    }

    fn set_window_title(&mut self, window: WindowId, title: &str) {
        self.update(window, |w| {
            w.set_title(title).map_err(|e| format!("set title: {e}"))
        });
    }

    fn iconify_window(&mut self, window: WindowId) {
        self.update(window, |w| {
            w.minimize();
            Ok(())
        });
    }

    fn maximize_window(&mut self, window: WindowId) {
        self.update(window, |w| {
            w.maximize();
            Ok(())
        });
    }

    fn restore_window(&mut self, window: WindowId) {
        self.update(window, |w| {
            w.restore();
            Ok(())
        });
    }

    fn show_window(&mut self, window: WindowId) {
        self.update(window, |w| {
            w.show();
            Ok(())
        });
    }

    fn hide_window(&mut self, window: WindowId) {
        self.update(window, |w| {
            w.hide();
            Ok(())
        });
    }

    fn set_fullscreen(&mut self, window: WindowId, fullscreen: bool) {
        // SDL keeps the windowed geometry and restores it on leaving desktop fullscreen.
        let mode = if fullscreen {
            FullscreenType::Desktop
        } else {
            FullscreenType::Off
        };
        self.update(window, |w| {
            w.set_fullscreen(mode)
                .map_err(|e| format!("set fullscreen: {e}"))
        });
    }

    fn set_decorated(&mut self, window: WindowId, decorated: bool) {
        self.update(window, |w| {
            w.set_bordered(decorated);
            Ok(())
        });
    }

    fn set_resizable(&mut self, window: WindowId, resizable: bool) {
        self.update(window, |w| {
            w.set_resizable(resizable);
            Ok(())
        });
    }

    fn set_cursor_mode(&mut self, window: WindowId, mode: CursorMode) {
        if !self.windows.contains_key(&window) {
            self.fail(format!("invalid window handle {}", window.0));
            return;
        }
        let mouse = self.sdl.mouse();
        match mode {
            CursorMode::Visible => {
                mouse.set_relative_mouse_mode(false);
                mouse.show_cursor(true);
            }
            CursorMode::Hidden => {
                mouse.set_relative_mouse_mode(false);
                mouse.show_cursor(false);
            }
            CursorMode::Disabled => {
                mouse.show_cursor(false);
                mouse.set_relative_mouse_mode(true);
            }
        }
    }

    fn set_window_opacity(&mut self, window: WindowId, opacity: f32) {
        self.update(window, |w| {
            w.set_opacity(opacity)
                .map_err(|e| format!("set opacity: {e}"))
        });
    }

    fn set_should_close(&mut self, window: WindowId, should_close: bool) {
        // SDL has no persistent close flag; a close is only ever an event.
        tracing::trace!(window = window.0, should_close, "close flag ignored by SDL");
    }

    fn cursor_position(&self, _window: WindowId) -> Vec2 {
        let state = self.event_pump.mouse_state();
        Vec2::new(state.x() as f32, state.y() as f32)
    }

    fn clipboard_string(&mut self) -> Option<String> {
        let clipboard = self.video.clipboard();
        if !clipboard.has_clipboard_text() {
            return None;
        }
        match clipboard.clipboard_text() {
            Ok(text) => Some(text),
            Err(e) => {
                self.fail(format!("get clipboard: {e}"));
                None
            }
        }
    }

    fn set_clipboard_string(&mut self, text: &str) {
        if let Err(e) = self.video.clipboard().set_clipboard_text(text) {
            self.fail(format!("set clipboard: {e}"));
        }
    }

    fn joystick_present(&self, id: usize) -> bool {
        self.joysticks.get(id).is_some_and(Option::is_some)
    }

    fn joystick_info(&self, id: usize) -> Option<JoystickInfo> {
        let joystick = self.joysticks.get(id)?.as_ref()?;
        Some(JoystickInfo {
            name: joystick.name(),
            guid: joystick.guid().string(),
            button_count: joystick.num_buttons() as usize,
            axis_count: joystick.num_axes() as usize,
            hat_count: joystick.num_hats() as usize,
        })
    }

    fn poll_joystick(&mut self, id: usize) -> Option<JoystickPoll> {
        let joystick = self.joysticks.get(id)?.as_ref()?;
        Some(JoystickPoll {
            buttons: (0..joystick.num_buttons())
                .map(|i| joystick.button(i).unwrap_or(false))
                .collect(),
            axes: (0..joystick.num_axes())
                .map(|i| joystick.axis(i).map(normalize_axis).unwrap_or(0.0))
                .collect(),
            hats: (0..joystick.num_hats())
                .map(|i| joystick.hat(i).map(map_hat).unwrap_or(Hat::CENTERED))
                .collect(),
        })
    }

    fn take_error(&mut self) -> Option<NativeError> {
        self.error.take()
    }
}
