//! Double-buffered device state.
//!
//! A [`DeviceStateBuffer`] holds the state of every code of one device category
//! (keys, mouse buttons, joystick buttons/axes/hats) for the current frame and the
//! frame before it. The dispatcher thread is the only writer; any thread may read.
//!
//! Lock order is always `previous` before `current`, for readers and for the
//! frame rollers [`DeviceStateBuffer::reset`] and [`DeviceStateBuffer::advance`].
//! A roller keeps `previous` locked until `current` is rewritten, so a reader
//! comparing both halves never sees a frame boundary in between.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};

use crate::error::{Result, WindowingError};

/// A value stored per device code.
///
/// `Default` is the neutral value written by [`DeviceStateBuffer::reset`].
pub trait DeviceValue: Copy + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// The code is held down.
    fn is_down(self) -> bool {
        false
    }

    /// The code was released.
    fn is_up(self) -> bool {
        false
    }

    /// The code is auto-repeating.
    fn is_repeat(self) -> bool {
        false
    }
}

impl DeviceValue for bool {
    fn is_down(self) -> bool {
        self
    }
}

impl DeviceValue for f32 {}

fn check_code(code: usize, len: usize) -> Result<()> {
    if code < len {
        Ok(())
    } else {
        Err(WindowingError::IndexOutOfRange { index: code, len })
    }
}

fn clicked<T: DeviceValue>(previous: T, current: T) -> bool {
    previous.is_down() && !current.is_down()
}

/// Rolling "anything happened this frame" flags.
#[derive(Debug, Default)]
struct Activity {
    down: AtomicBool,
    up: AtomicBool,
    repeat: AtomicBool,
}

impl Activity {
    fn record<T: DeviceValue>(&self, value: T) {
        if value.is_down() {
            self.down.store(true, Ordering::Release);
        }
        if value.is_up() {
            self.up.store(true, Ordering::Release);
        }
        if value.is_repeat() {
            self.repeat.store(true, Ordering::Release);
        }
    }

    fn clear(&self) {
        self.down.store(false, Ordering::Release);
        self.up.store(false, Ordering::Release);
        self.repeat.store(false, Ordering::Release);
    }
}

/// Current and previous state of one device category.
pub struct DeviceStateBuffer<T> {
    len: usize,
    current: RwLock<Box<[T]>>,
    previous: RwLock<Box<[T]>>,
    activity: Activity,
}

impl<T: DeviceValue> DeviceStateBuffer<T> {
    /// Create a buffer for codes `0..len`, all neutral.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: RwLock::new(vec![T::default(); len].into_boxed_slice()),
            previous: RwLock::new(vec![T::default(); len].into_boxed_slice()),
            activity: Activity::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Start a new frame: `previous` takes the contents of `current`, which is then
    /// cleared to neutral.
    ///
    /// Call once per frame boundary, before the poll that repopulates `current`.
    pub fn reset(&self) {
        let mut previous = self.previous.write();
        let current = self.current.upgradable_read();
        previous.copy_from_slice(&current);

        let mut current = RwLockUpgradableReadGuard::upgrade(current);
        current.fill(T::default());
        self.activity.clear();
        drop(previous);
    }

    /// Start a new frame straight from a polled array: `previous` takes the
    /// contents of `current`, which is then overwritten with `values`.
    ///
    /// Unlike [`reset`](Self::reset) followed by [`copy_from`](Self::copy_from),
    /// no neutral frame is ever visible, so a value held across the boundary never
    /// reads as released. Codes past the end of `values` keep their value.
    pub fn advance(&self, values: &[T]) {
        let count = values.len().min(self.len);
        let mut previous = self.previous.write();
        let current = self.current.upgradable_read();
        previous.copy_from_slice(&current);

        let mut current = RwLockUpgradableReadGuard::upgrade(current);
        current[..count].copy_from_slice(&values[..count]);
        self.activity.clear();
        for value in &values[..count] {
            self.activity.record(*value);
        }
        drop(previous);
    }

    /// Write one code of the current frame.
    pub fn set(&self, code: usize, value: T) -> Result<()> {
        check_code(code, self.len)?;
        self.current.write()[code] = value;
        self.activity.record(value);
        Ok(())
    }

    /// Overwrite the current frame from a polled array.
    ///
    /// Extra values are ignored; codes past the end of `values` keep their value.
    pub fn copy_from(&self, values: &[T]) {
        let count = values.len().min(self.len);
        let mut current = self.current.write();
        current[..count].copy_from_slice(&values[..count]);
        for value in &values[..count] {
            self.activity.record(*value);
        }
    }

    pub fn get(&self, code: usize) -> Result<T> {
        check_code(code, self.len)?;
        Ok(self.current.read()[code])
    }

    pub fn get_previous(&self, code: usize) -> Result<T> {
        check_code(code, self.len)?;
        Ok(self.previous.read()[code])
    }

    pub fn is_pressed(&self, code: usize) -> Result<bool> {
        Ok(self.get(code)?.is_down())
    }

    pub fn is_released(&self, code: usize) -> Result<bool> {
        Ok(self.get(code)?.is_up())
    }

    /// Held on the previous frame and no longer held now.
    pub fn is_clicked(&self, code: usize) -> Result<bool> {
        check_code(code, self.len)?;
        let previous = self.previous.read();
        let current = self.current.read();
        Ok(clicked(previous[code], current[code]))
    }

    pub fn is_any_down(&self) -> bool {
        self.activity.down.load(Ordering::Acquire)
    }

    pub fn is_any_up(&self) -> bool {
        self.activity.up.load(Ordering::Acquire)
    }

    pub fn is_any_repeat(&self) -> bool {
        self.activity.repeat.load(Ordering::Acquire)
    }

    /// Copy of the current frame.
    pub fn current(&self) -> Vec<T> {
        self.current.read().to_vec()
    }

    /// Copy of the previous frame.
    pub fn previous(&self) -> Vec<T> {
        self.previous.read().to_vec()
    }

    /// Independent copy of both frames.
    pub fn snapshot(&self) -> DeviceSnapshot<T> {
        let previous = self.previous.read();
        let current = self.current.read();
        DeviceSnapshot {
            current: current.clone(),
            previous: previous.clone(),
            any_down: self.is_any_down(),
            any_up: self.is_any_up(),
            any_repeat: self.is_any_repeat(),
        }
    }
}

impl<T: DeviceValue> fmt::Debug for DeviceStateBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceStateBuffer")
            .field("len", &self.len)
            .field("current", &*self.current.read())
            .finish_non_exhaustive()
    }
}

/// Immutable copy of a [`DeviceStateBuffer`] taken at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSnapshot<T> {
    current: Box<[T]>,
    previous: Box<[T]>,
    any_down: bool,
    any_up: bool,
    any_repeat: bool,
}

impl<T: DeviceValue> DeviceSnapshot<T> {
    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn get(&self, code: usize) -> Result<T> {
        check_code(code, self.current.len())?;
        Ok(self.current[code])
    }

    pub fn get_previous(&self, code: usize) -> Result<T> {
        check_code(code, self.previous.len())?;
        Ok(self.previous[code])
    }

    pub fn is_pressed(&self, code: usize) -> Result<bool> {
        Ok(self.get(code)?.is_down())
    }

    pub fn is_released(&self, code: usize) -> Result<bool> {
        Ok(self.get(code)?.is_up())
    }

    pub fn is_clicked(&self, code: usize) -> Result<bool> {
        Ok(clicked(self.get_previous(code)?, self.get(code)?))
    }

    pub fn is_any_down(&self) -> bool {
        self.any_down
    }

    pub fn is_any_up(&self) -> bool {
        self.any_up
    }

    pub fn is_any_repeat(&self) -> bool {
        self.any_repeat
    }

    pub fn current(&self) -> &[T] {
        &self.current
    }

    pub fn previous(&self) -> &[T] {
        &self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keyboard::KeyEvent;
    use proptest::prelude::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::thread;

    fn key_event() -> impl Strategy<Value = KeyEvent> {
        prop_oneof![
            Just(KeyEvent::None),
            Just(KeyEvent::Up),
            Just(KeyEvent::Down),
            Just(KeyEvent::Repeat),
        ]
    }

    #[test]
    fn test_new_buffer_is_neutral() {
        let buffer = DeviceStateBuffer::<KeyEvent>::new(8);
        assert_eq!(buffer.len(), 8);
        assert!(buffer.current().iter().all(|e| *e == KeyEvent::None));
        assert!(buffer.previous().iter().all(|e| *e == KeyEvent::None));
        assert!(!buffer.is_any_down());
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let buffer = DeviceStateBuffer::<bool>::new(4);
        assert_eq!(
            buffer.get(4),
            Err(WindowingError::IndexOutOfRange { index: 4, len: 4 })
        );
        assert!(buffer.get_previous(100).is_err());
        assert!(buffer.set(4, true).is_err());
        assert!(buffer.is_clicked(9).is_err());
    }

    #[test]
    fn test_reset_moves_current_into_previous() {
        let buffer = DeviceStateBuffer::<KeyEvent>::new(4);
        buffer.set(1, KeyEvent::Down).unwrap();
        buffer.set(2, KeyEvent::Repeat).unwrap();

        buffer.reset();

        assert_eq!(buffer.get_previous(1).unwrap(), KeyEvent::Down);
        assert_eq!(buffer.get_previous(2).unwrap(), KeyEvent::Repeat);
        assert_eq!(buffer.get(1).unwrap(), KeyEvent::None);
        assert_eq!(buffer.get(2).unwrap(), KeyEvent::None);
    }

    #[test]
    fn test_activity_flags_roll_per_frame() {
        let buffer = DeviceStateBuffer::<KeyEvent>::new(4);
        buffer.set(0, KeyEvent::Down).unwrap();
        buffer.set(1, KeyEvent::Repeat).unwrap();
        assert!(buffer.is_any_down());
        assert!(buffer.is_any_repeat());
        assert!(!buffer.is_any_up());

        buffer.reset();
        assert!(!buffer.is_any_down());
        assert!(!buffer.is_any_repeat());

        buffer.set(0, KeyEvent::Up).unwrap();
        assert!(buffer.is_any_up());
    }

    #[rstest]
    #[case(KeyEvent::Down, KeyEvent::Up, true)]
    #[case(KeyEvent::Down, KeyEvent::None, true)]
    #[case(KeyEvent::Down, KeyEvent::Repeat, true)]
    #[case(KeyEvent::Down, KeyEvent::Down, false)]
    #[case(KeyEvent::Up, KeyEvent::Up, false)]
    #[case(KeyEvent::Up, KeyEvent::Down, false)]
    #[case(KeyEvent::None, KeyEvent::None, false)]
    fn test_click_truth_table(
        #[case] before: KeyEvent,
        #[case] after: KeyEvent,
        #[case] expected: bool,
    ) {
        let buffer = DeviceStateBuffer::<KeyEvent>::new(2);
        buffer.set(1, before).unwrap();
        buffer.reset();
        buffer.set(1, after).unwrap();
        assert_eq!(buffer.is_clicked(1).unwrap(), expected);
    }

    #[test]
    fn test_pressed_and_released() {
        let buffer = DeviceStateBuffer::<KeyEvent>::new(3);
        buffer.set(0, KeyEvent::Down).unwrap();
        buffer.set(1, KeyEvent::Up).unwrap();
        assert!(buffer.is_pressed(0).unwrap());
        assert!(!buffer.is_released(0).unwrap());
        assert!(buffer.is_released(1).unwrap());
        assert!(!buffer.is_pressed(2).unwrap());
    }

    #[test]
    fn test_copy_from_truncates() {
        let buffer = DeviceStateBuffer::<f32>::new(2);
        buffer.copy_from(&[0.25, -1.0, 0.75]);
        assert_eq!(buffer.current(), vec![0.25, -1.0]);

        buffer.copy_from(&[0.5]);
        assert_eq!(buffer.current(), vec![0.5, -1.0]);
    }

    #[test]
    fn test_advance_rolls_without_neutral_frame() {
        let buffer = DeviceStateBuffer::<bool>::new(3);
        buffer.advance(&[true, false, true]);
        assert_eq!(buffer.current(), vec![true, false, true]);
        assert_eq!(buffer.previous(), vec![false; 3]);

        buffer.advance(&[true, true]);
        assert_eq!(buffer.previous(), vec![true, false, true]);
        assert_eq!(buffer.current(), vec![true, true, true]);
        assert!(!buffer.is_clicked(0).unwrap());
        assert!(buffer.is_any_down());

        buffer.advance(&[false, false, false]);
        assert!(buffer.is_clicked(0).unwrap());
        assert!(!buffer.is_any_down());
    }

    #[test]
    fn test_held_value_never_reads_clicked_during_advance() {
        let buffer = Arc::new(DeviceStateBuffer::<bool>::new(1));
        buffer.advance(&[true]);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    (0..20_000)
                        .filter(|_| buffer.is_clicked(0).unwrap())
                        .count()
                })
            })
            .collect();

        for _ in 0..20_000 {
            buffer.advance(&[true]);
        }

        let clicks: usize = readers
            .into_iter()
            .map(|reader| reader.join().expect("reader panicked"))
            .sum();
        assert_eq!(clicks, 0);
    }

    #[test]
    fn test_reset_never_shows_half_rolled_frame() {
        let buffer = Arc::new(DeviceStateBuffer::<bool>::new(1));
        buffer.set(0, true).unwrap();
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for _ in 0..20_000 {
                        let snapshot = buffer.snapshot();
                        // a roll flips the value every frame; equal halves would be torn
                        assert_ne!(snapshot.get(0).unwrap(), snapshot.get_previous(0).unwrap());
                    }
                })
            })
            .collect();

        for frame in 0..20_000 {
            if frame % 2 == 0 {
                buffer.reset();
            } else {
                buffer.advance(&[true]);
            }
        }

        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }

    #[test]
    fn test_snapshot_is_independent() {
        let buffer = DeviceStateBuffer::<bool>::new(3);
        buffer.set(0, true).unwrap();
        buffer.reset();
        let snapshot = buffer.snapshot();

        buffer.set(2, true).unwrap();
        buffer.reset();
        buffer.reset();

        assert!(snapshot.get_previous(0).unwrap());
        assert!(!snapshot.get(2).unwrap());
        assert!(snapshot.is_clicked(0).unwrap());
        assert!(!buffer.get_previous(0).unwrap());
        assert_eq!(snapshot.len(), 3);
    }

    #[test]
    fn test_readers_during_resets() {
        let buffer = Arc::new(DeviceStateBuffer::<bool>::new(64));
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for i in 0..2_000 {
                        let code = i % 64;
                        // every frame holds all-true or all-false
                        let snapshot = buffer.snapshot();
                        let first = snapshot.current()[0];
                        assert!(snapshot.current().iter().all(|v| *v == first));
                        buffer.is_clicked(code).unwrap();
                    }
                })
            })
            .collect();

        for frame in 0..500 {
            buffer.reset();
            buffer.copy_from(&[frame % 2 == 0; 64]);
        }

        for reader in readers {
            reader.join().expect("reader panicked");
        }
    }

    proptest! {
        #[test]
        fn prop_reset_then_set(
            initial in proptest::collection::vec(key_event(), 16),
            code in 0usize..16,
            value in key_event(),
        ) {
            let buffer = DeviceStateBuffer::<KeyEvent>::new(16);
            buffer.copy_from(&initial);
            let before = buffer.get(code).unwrap();

            buffer.reset();
            prop_assert_eq!(buffer.get(code).unwrap(), KeyEvent::None);
            buffer.set(code, value).unwrap();

            prop_assert_eq!(buffer.get_previous(code).unwrap(), before);
            prop_assert_eq!(buffer.get(code).unwrap(), value);
            prop_assert_eq!(buffer.previous(), initial);
        }
    }
}
