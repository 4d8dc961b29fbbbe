//! Process-wide access to the terminfo database
//!
//! curses answers every query against a single "current" terminal. That
//! pointer is global to the process, so every operation that reads or
//! switches it runs while holding the one [`Database`] guard returned by
//! [`lock`]. The guard also records which context curses currently
//! honors, which lets activation skip the switch when nothing changed.
//!
//! Holding the guard is the only way to reach the lookup and expansion
//! primitives, so two threads can never interleave "activate A" and
//! "look up in A" with an activation of B in between.

mod capability;
mod context;
mod expand;
pub(crate) mod ffi;

pub use capability::Capability;
pub(crate) use context::Context;

use std::ptr::{self, NonNull};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

/// Which context curses currently treats as the terminal
struct ActiveContext {
    current: Option<NonNull<ffi::TERMINAL>>,
}

// SAFETY: the pointer is only dereferenced by curses, and only while the
// DATABASE mutex is held.
unsafe impl Send for ActiveContext {}

static DATABASE: Mutex<ActiveContext> = Mutex::new(ActiveContext { current: None });

/// Exclusive access to the process-wide terminfo state
pub(crate) struct Database {
    active: MutexGuard<'static, ActiveContext>,
}

/// Acquire the database guard, blocking until no other operation runs
///
/// Must not be called while the current thread already holds the guard.
pub(crate) fn lock() -> Database {
    // The marker is written only after the curses call it mirrors has
    // returned, so a poisoned lock still guards consistent state.
    let active = DATABASE.lock().unwrap_or_else(PoisonError::into_inner);
    Database { active }
}

impl Database {
    /// Whether `context` is the one curses currently honors
    pub fn is_active(&self, context: &Context) -> bool {
        self.active.current == Some(context.as_ptr())
    }

    /// Make `context` current, switching only when it is not already
    pub fn activate(&mut self, context: &Context) {
        if self.is_active(context) {
            return;
        }
        let ptr = context.as_ptr();
        // SAFETY: `ptr` is a live context owned by a session; the guard
        // serializes the switch with every lookup.
        unsafe { ffi::set_curterm(ptr.as_ptr()) };
        self.active.current = Some(ptr);
        trace!(context = ?ptr, "activated terminfo context");
    }

    /// Clear the current terminal, returning whatever curses had installed
    fn deactivate(&mut self) -> *mut ffi::TERMINAL {
        // SAFETY: installing a null terminal is always allowed.
        let previous = unsafe { ffi::set_curterm(ptr::null_mut()) };
        self.active.current = None;
        previous
    }
}
