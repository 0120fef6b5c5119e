//! Local cancellation for blocking waits
//!
//! A [`CancelToken`] is shared between the thread blocked in a poll loop
//! and whoever may want to stop it (a Ctrl-C handler, another thread, a
//! test). Raising the token wakes a sleeping waiter immediately.
//!
//! Cancellation is local only: the remote job keeps running.
//!
//! On SIGINT/SIGTERM the CLI handler:
//! 1. First signal: raises the token, the wait returns `Cancelled`
//! 2. Second signal: exits immediately with code 80

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Exit code for cancelled runs
pub const EXIT_CODE_CANCELLED: i32 = 80;

#[derive(Debug, Default)]
struct Flag {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

impl Flag {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable cancellation signal
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<Flag>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the token and wake every waiter
    pub fn cancel(&self) {
        let mut cancelled = self.flag.lock();
        *cancelled = true;
        self.flag.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.flag.lock()
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns true if the token was raised before or during the wait.
    pub fn wait_for(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut cancelled = self.flag.lock();

        // Condvar waits may wake spuriously
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = self
                .flag
                .wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }

        *cancelled
    }
}

/// Action to take after receiving a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// First signal: cancel the wait
    Cancel,
    /// Second signal: exit immediately
    ImmediateExit,
    /// Third+ signal: ignore
    Ignore,
}

/// Counts interrupts and drives a [`CancelToken`]
#[derive(Debug)]
pub struct SignalHandler {
    token: CancelToken,
    signal_count: AtomicU8,
}

impl SignalHandler {
    pub fn new(token: CancelToken) -> Self {
        Self {
            token,
            signal_count: AtomicU8::new(0),
        }
    }

    pub fn signal_count(&self) -> u8 {
        self.signal_count.load(Ordering::SeqCst)
    }

    /// Handle one interrupt and report what the process should do
    pub fn handle_signal(&self) -> SignalAction {
        let count = self.signal_count.fetch_add(1, Ordering::SeqCst);

        match count {
            0 => {
                self.token.cancel();
                SignalAction::Cancel
            }
            1 => SignalAction::ImmediateExit,
            _ => SignalAction::Ignore,
        }
    }

    /// Install the process-wide Ctrl-C handler.
    ///
    /// Must be called at most once per process.
    pub fn install(self) -> Result<(), ctrlc::Error> {
        let handler = Arc::new(self);
        ctrlc::set_handler(move || match handler.handle_signal() {
            SignalAction::Cancel => {
                tracing::warn!("interrupt received, cancelling wait (remote job keeps running)");
            }
            SignalAction::ImmediateExit => {
                eprintln!("\nReceived second interrupt, exiting immediately...");
                std::process::exit(EXIT_CODE_CANCELLED);
            }
            SignalAction::Ignore => {}
        })
    }
}
