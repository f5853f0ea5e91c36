//! Single-owner refresh flag

use std::sync::atomic::{AtomicBool, Ordering};

/// Held while a refresh call is outstanding.
///
/// Acquisition is a compare-and-swap on a shared flag; dropping the guard
/// clears it, including on early return or panic.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefreshGuard<'a> {
    /// Take the flag, or `None` if another guard holds it.
    pub fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
