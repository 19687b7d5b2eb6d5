//! Thread-safe property cell.
//!
//! Window attributes are written by native callbacks on the dispatcher thread and
//! read from any thread. A value is always replaced wholesale, so a reader sees
//! either the old or the new value, never a mix.

use std::fmt;

use parking_lot::RwLock;

/// A reader/writer guarded value.
pub struct PropertyCell<T> {
    value: RwLock<T>,
}

impl<T: Clone> PropertyCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Copy out the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.value.write(), value)
    }
}

impl<T: Clone + PartialEq> PropertyCell<T> {
    /// Replace the value if it differs; returns whether it changed.
    pub fn set_if_changed(&self, value: T) -> bool {
        let mut guard = self.value.write();
        if *guard == value {
            return false;
        }
        *guard = value;
        true
    }
}

impl<T: Clone + Default> Default for PropertyCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for PropertyCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyCell").field(&*self.value.read()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_get_set() {
        let cell = PropertyCell::new(String::from("Untitled"));
        assert_eq!(cell.get(), "Untitled");
        cell.set("Main".to_string());
        assert_eq!(cell.get(), "Main");
    }

    #[test]
    fn test_replace_returns_old() {
        let cell = PropertyCell::new(3);
        assert_eq!(cell.replace(7), 3);
        assert_eq!(cell.get(), 7);
    }

    #[test]
    fn test_set_if_changed() {
        let cell = PropertyCell::new(1.0f32);
        assert!(!cell.set_if_changed(1.0));
        assert!(cell.set_if_changed(0.5));
        assert_eq!(cell.get(), 0.5);
    }

    /// Readers race one writer; every observed value must be one that was written.
    /// Each written value is a pair whose halves must always agree.
    #[test]
    fn test_no_torn_reads_under_contention() {
        let cell = Arc::new(PropertyCell::new((0u64, String::from("0"))));
        let done = Arc::new(AtomicBool::new(false));

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    while !done.load(Ordering::Acquire) {
                        let (n, text) = cell.get();
                        assert_eq!(n.to_string(), text, "torn read");
                        assert!(n <= 5_000);
                    }
                })
            })
            .collect();

        for i in 1..=5_000u64 {
            cell.set((i, i.to_string()));
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            reader.join().expect("reader panicked");
        }
        assert_eq!(cell.get(), (5_000, "5000".to_string()));
    }
}
