//! Cancellation primitive for the blocking-thread runtime.
//!
//! Everything here runs on plain OS threads, so cancellation is a flag plus
//! a broadcast `Condvar` that every interruptible sleep in the table waits
//! on alongside its own timeout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Default)]
pub struct ShutdownToken {
    flag: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
        let _guard = self.lock.lock();
        self.wake.notify_all();
    }

    /// Sleeps for `duration` or until cancelled, whichever comes first.
    /// Returns `true` if the sleep ran to completion (not cancelled).
    pub fn sleep(&self, duration: Duration) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let deadline = Instant::now() + duration;
        let mut guard = self.lock.lock();
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            let remaining = deadline - now;
            let timed_out = self.wake.wait_for(&mut guard, remaining).timed_out();
            if timed_out {
                return !self.is_cancelled();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn sleep_completes_when_not_cancelled() {
        let token = ShutdownToken::new();
        assert!(token.sleep(Duration::from_millis(5)));
    }

    #[test]
    fn cancel_wakes_a_sleeping_thread_promptly() {
        let token = Arc::new(ShutdownToken::new());
        let waiter = {
            let token = token.clone();
            thread::spawn(move || token.sleep(Duration::from_secs(30)))
        };
        thread::sleep(Duration::from_millis(20));
        token.cancel();
        let completed = waiter.join().unwrap();
        assert!(!completed);
    }
}
