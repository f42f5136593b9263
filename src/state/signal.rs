//! Binary signal with timed wait — the handoff primitive between the voice
//! thread (which raises audio requests) and the audio thread (which services
//! them).
//!
//! Semantics: settable, clearable, and waitable with a timeout.  `set` wakes
//! every waiter; the flag stays set until someone calls [`Signal::clear`], so
//! a `set` that happens before the wait is never lost.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A manually-reset boolean flag backed by a mutex + condvar.
pub struct Signal {
    flag: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    /// Create a signal in the cleared state.
    pub fn new() -> Self {
        Self {
            flag: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Raise the signal and wake all waiters.  Idempotent.
    pub fn set(&self) {
        let mut flag = self.flag.lock().unwrap();
        *flag = true;
        self.cond.notify_all();
    }

    /// Lower the signal.  Idempotent.
    pub fn clear(&self) {
        *self.flag.lock().unwrap() = false;
    }

    /// Current state without blocking.
    pub fn is_set(&self) -> bool {
        *self.flag.lock().unwrap()
    }

    /// Block until the signal is set or `timeout` elapses.
    ///
    /// Returns `true` when the signal was set (possibly before the call),
    /// `false` on timeout.  The flag is *not* cleared by waiting.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let flag = self.flag.lock().unwrap();
        if *flag {
            return true;
        }
        let (flag, _result) = self
            .cond
            .wait_timeout_while(flag, timeout, |set| !*set)
            .unwrap();
        *flag
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn starts_cleared() {
        let signal = Signal::new();
        assert!(!signal.is_set());
    }

    #[test]
    fn set_then_clear() {
        let signal = Signal::new();
        signal.set();
        assert!(signal.is_set());
        signal.clear();
        assert!(!signal.is_set());
    }

    #[test]
    fn set_is_idempotent() {
        let signal = Signal::new();
        signal.set();
        signal.set();
        assert!(signal.is_set());
    }

    #[test]
    fn wait_returns_immediately_when_already_set() {
        let signal = Signal::new();
        signal.set();

        let start = Instant::now();
        assert!(signal.wait_timeout(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn wait_times_out_when_never_set() {
        let signal = Signal::new();
        let start = Instant::now();
        assert!(!signal.wait_timeout(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn wait_does_not_clear_the_flag() {
        let signal = Signal::new();
        signal.set();
        assert!(signal.wait_timeout(Duration::from_millis(10)));
        assert!(signal.is_set(), "waiting must not consume the signal");
    }

    #[test]
    fn waiter_is_woken_by_set_from_another_thread() {
        let signal = Arc::new(Signal::new());
        let waiter = Arc::clone(&signal);

        let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(5)));

        thread::sleep(Duration::from_millis(30));
        signal.set();

        assert!(handle.join().unwrap(), "waiter should observe the set");
    }
}
