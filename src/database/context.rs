//! Owned terminfo contexts
//!
//! A [`Context`] is the per-terminal block `setupterm` allocates. Each one
//! is owned by exactly one value and handed back to curses when dropped.

use std::env;
use std::ffi::CString;
use std::os::unix::io::RawFd;
use std::ptr::{self, NonNull};

use libc::c_int;
use tracing::{debug, warn};

use super::{ffi, lock, Database};
use crate::error::{Error, Result};

/// Exclusively owned handle to a curses `TERMINAL`
pub(crate) struct Context {
    ptr: NonNull<ffi::TERMINAL>,
}

// SAFETY: the handle is only passed to curses under the database guard, and
// ownership is unique (setup never hands out a context that is still in use).
unsafe impl Send for Context {}
unsafe impl Sync for Context {}

impl Context {
    pub fn as_ptr(&self) -> NonNull<ffi::TERMINAL> {
        self.ptr
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        lock().release(self.ptr);
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Context").field(&self.ptr).finish()
    }
}

impl Database {
    /// Load the entry for `term` (or `$TERM` when `None`) bound to `fd`
    ///
    /// On success the new context is current and the returned diagnostic is
    /// `0` for a fully supported terminal. On failure nothing is left
    /// installed and no memory is retained.
    pub fn setup(&mut self, term: Option<&str>, fd: RawFd) -> Result<(Context, i32)> {
        let name = term
            .map(|t| {
                CString::new(t).map_err(|_| {
                    Error::InvalidArgument(format!("terminal type {t:?} contains a NUL byte"))
                })
            })
            .transpose()?;

        // setupterm reuses the current terminal when the name and fd match,
        // which would give two owners the same block.
        self.deactivate();

        let mut errret: c_int = ffi::TGETENT_ERR;
        let name_ptr = name.as_ref().map_or(ptr::null(), |n| n.as_ptr());
        // SAFETY: `name_ptr` is null or a NUL-terminated string that outlives
        // the call; `errret` is a valid out-pointer.
        let status = unsafe { ffi::setupterm(name_ptr, fd, &mut errret) };

        // Whatever setupterm installed is now ours, success or not.
        let installed = NonNull::new(self.deactivate());

        if status != ffi::OK {
            if let Some(leftover) = installed {
                warn!(?leftover, "releasing context left behind by failed setupterm");
                // SAFETY: nothing else references a context from a failed setup.
                unsafe { ffi::del_curterm(leftover.as_ptr()) };
            }
            let shown = display_name(term);
            debug!(term = %shown, errret, "setupterm failed");
            return Err(match errret {
                ffi::TGETENT_YES => Error::Hardcopy(shown),
                ffi::TGETENT_NO => Error::TypeNotFound(shown),
                ffi::TGETENT_ERR => Error::DatabaseUnavailable,
                code => Error::Setup(code),
            });
        }

        let ptr = installed.ok_or(Error::Setup(errret))?;
        // SAFETY: `ptr` was just allocated by setupterm.
        unsafe { ffi::set_curterm(ptr.as_ptr()) };
        self.active.current = Some(ptr);

        let diagnostic = if errret == ffi::TGETENT_YES { 0 } else { errret };
        debug!(
            term = %display_name(term),
            fd,
            diagnostic,
            context = ?ptr,
            "terminfo context ready"
        );
        Ok((Context { ptr }, diagnostic))
    }

    /// Hand a context back to curses
    fn release(&mut self, ptr: NonNull<ffi::TERMINAL>) {
        if self.active.current == Some(ptr) {
            self.deactivate();
        }
        // SAFETY: called once, from the owning Context's Drop.
        unsafe { ffi::del_curterm(ptr.as_ptr()) };
        debug!(context = ?ptr, "released terminfo context");
    }
}

fn display_name(term: Option<&str>) -> String {
    match term {
        Some(t) => t.to_string(),
        None => env::var("TERM").unwrap_or_default(),
    }
}
