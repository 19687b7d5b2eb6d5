//! Joystick state
//!
//! Up to [`MAX_JOYSTICKS`] devices are tracked in a [`JoystickSlotTable`] indexed by
//! native device id. Each connected device gets a [`JoystickState`] holding one
//! double buffer per input category.

use std::collections::HashSet;
use std::sync::Arc;

use bitflags::bitflags;
use parking_lot::RwLock;

use super::buffer::{DeviceSnapshot, DeviceStateBuffer, DeviceValue};
use crate::error::{Result, WindowingError};

/// Number of joystick slots.
pub const MAX_JOYSTICKS: usize = 16;

bitflags! {
    /// Hat (D-pad) direction. The empty set is centered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hat: u8 {
        const UP = 1;
        const RIGHT = 2;
        const DOWN = 4;
        const LEFT = 8;
        const RIGHT_UP = Self::RIGHT.bits() | Self::UP.bits();
        const RIGHT_DOWN = Self::RIGHT.bits() | Self::DOWN.bits();
        const LEFT_UP = Self::LEFT.bits() | Self::UP.bits();
        const LEFT_DOWN = Self::LEFT.bits() | Self::DOWN.bits();
    }
}

impl Hat {
    pub const CENTERED: Hat = Hat::empty();
}

impl DeviceValue for Hat {
    fn is_down(self) -> bool {
        !self.is_empty()
    }
}

/// Static description of a device, reported by the platform on connect.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JoystickInfo {
    pub name: String,
    pub guid: String,
    pub button_count: usize,
    pub axis_count: usize,
    pub hat_count: usize,
}

/// Raw input arrays polled from the platform for one device.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoystickPoll {
    pub buttons: Vec<bool>,
    pub axes: Vec<f32>,
    pub hats: Vec<Hat>,
}

/// Frame state of one connected joystick.
#[derive(Debug)]
pub struct JoystickState {
    id: usize,
    name: String,
    guid: String,
    buttons: DeviceStateBuffer<bool>,
    axes: DeviceStateBuffer<f32>,
    hats: DeviceStateBuffer<Hat>,
    /// `(button, caller code)` pairs whose click was already handed out this frame.
    consumed: RwLock<HashSet<(usize, i32)>>,
}

impl JoystickState {
    pub fn new(id: usize, info: &JoystickInfo) -> Self {
        Self {
            id,
            name: info.name.clone(),
            guid: info.guid.clone(),
            buttons: DeviceStateBuffer::new(info.button_count),
            axes: DeviceStateBuffer::new(info.axis_count),
            hats: DeviceStateBuffer::new(info.hat_count),
            consumed: RwLock::new(HashSet::new()),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    pub fn hat_count(&self) -> usize {
        self.hats.len()
    }

    pub fn is_button_down(&self, index: usize) -> Result<bool> {
        self.buttons.get(index)
    }

    pub fn is_button_down_previous(&self, index: usize) -> Result<bool> {
        self.buttons.get_previous(index)
    }

    /// Held last frame, released now.
    pub fn is_button_clicked(&self, index: usize) -> Result<bool> {
        self.buttons.is_clicked(index)
    }

    /// Like [`is_button_clicked`](Self::is_button_clicked), but a given
    /// `(index, code)` pair reports the click at most once per frame.
    ///
    /// Independent consumers polling the same button pass different codes so each
    /// sees the click once; a consumer polling twice in one frame sees it once.
    pub fn is_single_click(&self, index: usize, code: i32) -> Result<bool> {
        if !self.buttons.is_clicked(index)? {
            return Ok(false);
        }

        let pair = (index, code);
        if self.consumed.read().contains(&pair) {
            return Ok(false);
        }
        Ok(self.consumed.write().insert(pair))
    }

    pub fn axis(&self, index: usize) -> Result<f32> {
        self.axes.get(index)
    }

    pub fn axis_previous(&self, index: usize) -> Result<f32> {
        self.axes.get_previous(index)
    }

    pub fn hat(&self, index: usize) -> Result<Hat> {
        self.hats.get(index)
    }

    pub fn hat_previous(&self, index: usize) -> Result<Hat> {
        self.hats.get_previous(index)
    }

    pub fn buttons(&self) -> Vec<bool> {
        self.buttons.current()
    }

    pub fn axes(&self) -> Vec<f32> {
        self.axes.current()
    }

    pub fn hats(&self) -> Vec<Hat> {
        self.hats.current()
    }

    pub fn snapshot(&self) -> JoystickSnapshot {
        JoystickSnapshot {
            id: self.id,
            name: self.name.clone(),
            guid: self.guid.clone(),
            buttons: self.buttons.snapshot(),
            axes: self.axes.snapshot(),
            hats: self.hats.snapshot(),
        }
    }

    /// Start a new frame from a native poll and forget consumed clicks.
    ///
    /// A category the poll reports no values for keeps its buffers untouched.
    pub fn update(&self, poll: &JoystickPoll) {
        if !poll.hats.is_empty() {
            self.hats.advance(&poll.hats);
        }
        if !poll.axes.is_empty() {
            self.axes.advance(&poll.axes);
        }
        if !poll.buttons.is_empty() {
            self.buttons.advance(&poll.buttons);
        }
        self.consumed.write().clear();
    }
}

/// Joystick state frozen at one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct JoystickSnapshot {
    id: usize,
    name: String,
    guid: String,
    buttons: DeviceSnapshot<bool>,
    axes: DeviceSnapshot<f32>,
    hats: DeviceSnapshot<Hat>,
}

impl JoystickSnapshot {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guid(&self) -> &str {
        &self.guid
    }

    pub fn is_button_down(&self, index: usize) -> Result<bool> {
        self.buttons.get(index)
    }

    pub fn is_button_clicked(&self, index: usize) -> Result<bool> {
        self.buttons.is_clicked(index)
    }

    pub fn axis(&self, index: usize) -> Result<f32> {
        self.axes.get(index)
    }

    pub fn hat(&self, index: usize) -> Result<Hat> {
        self.hats.get(index)
    }
}

/// Fixed table of joystick slots indexed by native device id.
#[derive(Debug)]
pub struct JoystickSlotTable {
    slots: RwLock<[Option<Arc<JoystickState>>; MAX_JOYSTICKS]>,
}

impl Default for JoystickSlotTable {
    fn default() -> Self {
        Self::new()
    }
}

fn check_slot(id: usize) -> Result<()> {
    if id < MAX_JOYSTICKS {
        Ok(())
    } else {
        Err(WindowingError::IndexOutOfRange {
            index: id,
            len: MAX_JOYSTICKS,
        })
    }
}

impl JoystickSlotTable {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(std::array::from_fn(|_| None)),
        }
    }

    /// Allocate state for a newly connected device, replacing any stale entry.
    pub fn connect(&self, id: usize, info: &JoystickInfo) -> Result<Arc<JoystickState>> {
        check_slot(id)?;
        let state = Arc::new(JoystickState::new(id, info));
        self.slots.write()[id] = Some(Arc::clone(&state));
        tracing::info!(
            joystick = id,
            name = %info.name,
            buttons = info.button_count,
            axes = info.axis_count,
            hats = info.hat_count,
            "joystick connected"
        );
        Ok(state)
    }

    /// Empty the slot. Readers holding the state keep it alive until they drop it.
    pub fn disconnect(&self, id: usize) -> Result<Option<Arc<JoystickState>>> {
        check_slot(id)?;
        let previous = self.slots.write()[id].take();
        if previous.is_some() {
            tracing::info!(joystick = id, "joystick disconnected");
        }
        Ok(previous)
    }

    /// State of the device in slot `id`, or `None` when nothing is connected there.
    pub fn get(&self, id: usize) -> Result<Option<Arc<JoystickState>>> {
        check_slot(id)?;
        Ok(self.slots.read()[id].clone())
    }

    pub fn connected(&self) -> Vec<Arc<JoystickState>> {
        self.slots.read().iter().flatten().cloned().collect()
    }

    pub fn connected_count(&self) -> usize {
        self.slots.read().iter().filter(|slot| slot.is_some()).count()
    }

    /// Advance every connected device one frame using `poll` for its raw input.
    ///
    /// The slot lock is not held while polling.
    pub fn update_all(&self, mut poll: impl FnMut(usize) -> Option<JoystickPoll>) {
        for state in self.connected() {
            if let Some(input) = poll(state.id()) {
                state.update(&input);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn pad() -> JoystickInfo {
        JoystickInfo {
            name: "Test Pad".to_string(),
            guid: "030000005e0400008e02000014010000".to_string(),
            button_count: 4,
            axis_count: 2,
            hat_count: 1,
        }
    }

    fn poll(buttons: [bool; 4]) -> JoystickPoll {
        JoystickPoll {
            buttons: buttons.to_vec(),
            axes: vec![0.0, 0.0],
            hats: vec![Hat::CENTERED],
        }
    }

    #[test]
    fn test_hat_flags() {
        assert_eq!(Hat::RIGHT_UP, Hat::RIGHT | Hat::UP);
        assert!(Hat::CENTERED.is_empty());
        assert!(Hat::LEFT.is_down());
        assert!(!Hat::CENTERED.is_down());
        assert_eq!(Hat::default(), Hat::CENTERED);
    }

    #[test]
    fn test_connect_and_disconnect() {
        let table = JoystickSlotTable::new();
        assert!(table.get(3).unwrap().is_none());

        table.connect(3, &pad()).unwrap();
        let state = table.get(3).unwrap().expect("slot 3 connected");
        assert_eq!(state.id(), 3);
        assert_eq!(state.name(), "Test Pad");
        assert_eq!(state.button_count(), 4);
        assert_eq!(table.connected_count(), 1);

        table.disconnect(3).unwrap();
        assert!(table.get(3).unwrap().is_none());
        assert_eq!(table.connected_count(), 0);

        // the reader's handle is still usable after the slot was cleared
        assert_eq!(state.is_button_down(0), Ok(false));
    }

    #[test]
    fn test_slot_range() {
        let table = JoystickSlotTable::new();
        assert!(matches!(
            table.get(MAX_JOYSTICKS),
            Err(WindowingError::IndexOutOfRange { index: 16, len: 16 })
        ));
        assert!(table.connect(20, &pad()).is_err());
        assert!(table.disconnect(16).is_err());
    }

    #[test]
    fn test_button_index_range() {
        let state = JoystickState::new(0, &pad());
        assert!(state.is_button_down(4).is_err());
        assert!(state.axis(2).is_err());
        assert!(state.hat(1).is_err());
        assert!(state.hat_previous(1).is_err());
        assert!(state.is_single_click(10, 0).is_err());
    }

    #[test]
    fn test_update_moves_frames() {
        let state = JoystickState::new(0, &pad());
        state.update(&JoystickPoll {
            buttons: vec![true, false, false, false],
            axes: vec![0.5, -0.25],
            hats: vec![Hat::UP],
        });
        assert_eq!(state.is_button_down(0), Ok(true));
        assert_eq!(state.axis(0), Ok(0.5));
        assert_eq!(state.hat(0), Ok(Hat::UP));

        state.update(&poll([false; 4]));
        assert_eq!(state.is_button_down_previous(0), Ok(true));
        assert_eq!(state.is_button_clicked(0), Ok(true));
        assert_eq!(state.axis_previous(1), Ok(-0.25));
        assert_eq!(state.hat_previous(0), Ok(Hat::UP));
        assert_eq!(state.hat(0), Ok(Hat::CENTERED));
    }

    #[test]
    fn test_empty_category_is_left_alone() {
        let state = JoystickState::new(0, &pad());
        state.update(&JoystickPoll {
            buttons: vec![true, true, false, false],
            axes: vec![],
            hats: vec![],
        });
        state.update(&JoystickPoll {
            buttons: vec![],
            axes: vec![],
            hats: vec![],
        });
        assert_eq!(state.buttons(), vec![true, true, false, false]);
    }

    #[test]
    fn test_single_click_once_per_code_per_frame() {
        let state = JoystickState::new(0, &pad());
        state.update(&poll([false, true, false, false]));
        state.update(&poll([false; 4]));

        assert_eq!(state.is_single_click(1, 7), Ok(true));
        assert_eq!(state.is_single_click(1, 7), Ok(false));
        assert_eq!(state.is_single_click(1, 8), Ok(true));
        assert_eq!(state.is_button_clicked(1), Ok(true));

        // a button that was not clicked never reports
        assert_eq!(state.is_single_click(0, 7), Ok(false));

        // next frame clears both the click and the consumed set
        state.update(&poll([false, true, false, false]));
        assert_eq!(state.is_single_click(1, 7), Ok(false));
        state.update(&poll([false; 4]));
        assert_eq!(state.is_single_click(1, 7), Ok(true));
    }

    #[test]
    fn test_single_click_race_has_one_winner() {
        let state = Arc::new(JoystickState::new(0, &pad()));
        state.update(&poll([true, false, false, false]));
        state.update(&poll([false; 4]));

        let winners: usize = (0..8)
            .map(|_| {
                let state = Arc::clone(&state);
                thread::spawn(move || state.is_single_click(0, 42).unwrap())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().expect("thread panicked") as usize)
            .sum();

        assert_eq!(winners, 1);
    }

    #[test]
    fn test_held_button_never_single_clicks_during_updates() {
        let state = Arc::new(JoystickState::new(0, &pad()));
        state.update(&poll([true, false, false, false]));

        let readers: Vec<_> = (0..4)
            .map(|code| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    (0..50_000)
                        .filter(|_| state.is_single_click(0, code).unwrap())
                        .count()
                })
            })
            .collect();

        for _ in 0..50_000 {
            state.update(&poll([true, false, false, false]));
        }

        let clicks: usize = readers
            .into_iter()
            .map(|reader| reader.join().expect("reader panicked"))
            .sum();
        assert_eq!(clicks, 0);
        assert_eq!(state.is_button_down(0), Ok(true));
    }

    #[test]
    fn test_update_all_polls_connected_only() {
        let table = JoystickSlotTable::new();
        table.connect(1, &pad()).unwrap();
        table.connect(5, &pad()).unwrap();

        let mut polled = Vec::new();
        table.update_all(|id| {
            polled.push(id);
            Some(poll([true, false, false, false]))
        });

        assert_eq!(polled, vec![1, 5]);
        let state = table.get(5).unwrap().unwrap();
        assert_eq!(state.is_button_down(0), Ok(true));
    }

    #[test]
    fn test_snapshot_keeps_frame() {
        let state = JoystickState::new(2, &pad());
        state.update(&poll([true, false, false, false]));
        let snapshot = state.snapshot();
        state.update(&poll([false; 4]));

        assert_eq!(snapshot.id(), 2);
        assert_eq!(snapshot.is_button_down(0), Ok(true));
        assert_eq!(state.is_button_down(0), Ok(false));
    }
}
