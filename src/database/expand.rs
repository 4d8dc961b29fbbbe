//! Parameter and padding expansion
//!
//! `tputs` reports every output byte through a bare `int (*)(int)` callback
//! with no user data, so the buffer it fills is published through a
//! process-wide slot. The slot is bound only for the duration of one call
//! and only by the thread holding the database guard.

use std::ffi::CStr;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};

use libc::c_int;
use tracing::trace;

use super::{ffi, Database};
use crate::error::{Error, Result};

static PAD_SINK: AtomicPtr<Vec<u8>> = AtomicPtr::new(ptr::null_mut());

/// Scoped binding of an output buffer into [`PAD_SINK`]
///
/// The slot is cleared on drop, so it never outlives the borrowed buffer
/// even when the expansion fails.
struct SinkBinding<'a> {
    _buf: PhantomData<&'a mut Vec<u8>>,
    _db: PhantomData<&'a mut Database>,
}

impl<'a> SinkBinding<'a> {
    fn bind(_db: &'a mut Database, buf: &'a mut Vec<u8>) -> Self {
        PAD_SINK.store(buf as *mut Vec<u8>, Ordering::Release);
        SinkBinding {
            _buf: PhantomData,
            _db: PhantomData,
        }
    }
}

impl Drop for SinkBinding<'_> {
    fn drop(&mut self) {
        PAD_SINK.store(ptr::null_mut(), Ordering::Release);
    }
}

extern "C" fn emit(ch: c_int) -> c_int {
    let sink = PAD_SINK.load(Ordering::Acquire);
    // SAFETY: a non-null slot points at the buffer bound by the thread that
    // holds the database guard, and that thread is the one inside tputs.
    match unsafe { sink.as_mut() } {
        Some(buf) => {
            buf.push(ch as u8);
            ch
        }
        None => libc::EOF,
    }
}

impl Database {
    /// Substitute nine parameter slots into `template`
    pub fn tparm(&mut self, template: &CStr, params: &ffi::TparmArgs) -> Result<Vec<u8>> {
        if pops_string_parameter(template.to_bytes()) {
            return Err(Error::InvalidArgument(
                "templates with string parameters are not supported".to_string(),
            ));
        }
        let [p1, p2, p3, p4, p5, p6, p7, p8, p9] = *params;
        // SAFETY: the template pops only integers, and exactly nine longs are
        // supplied; the guard is held.
        let out = unsafe { ffi::tparm(template.as_ptr(), p1, p2, p3, p4, p5, p6, p7, p8, p9) };
        if out.is_null() {
            return Err(Error::ExpansionFailed);
        }
        // SAFETY: tparm returns its static result buffer, copied before the
        // guard is released.
        let expanded = unsafe { CStr::from_ptr(out) }.to_bytes().to_vec();
        trace!(?template, len = expanded.len(), "tparm");
        Ok(expanded)
    }

    /// Apply the padding directives in `template` for `affected_lines` lines
    pub fn tputs(&mut self, template: &CStr, affected_lines: c_int) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let status = {
            let _binding = SinkBinding::bind(self, &mut output);
            // SAFETY: `template` is NUL-terminated and `emit` only touches
            // the buffer bound above.
            unsafe { ffi::tputs(template.as_ptr(), affected_lines, emit) }
        };
        if status == ffi::ERR {
            return Err(Error::PaddingFailed);
        }
        trace!(?template, affected_lines, len = output.len(), "tputs");
        Ok(output)
    }
}

/// Whether a template pops a string argument (`%s` or `%l`)
///
/// tparm would read such a parameter as a pointer, so these templates are
/// refused before the call.
fn pops_string_parameter(template: &[u8]) -> bool {
    let mut bytes = template.iter().copied();
    while let Some(b) = bytes.next() {
        if b != b'%' {
            continue;
        }
        match bytes.next() {
            None | Some(b'%') => {}
            // %'c' character constant
            Some(b'\'') => {
                bytes.next();
                bytes.next();
            }
            // %P[a-z] / %g[a-z] variable names
            Some(b'P') | Some(b'g') => {
                bytes.next();
            }
            Some(b'l') => return true,
            Some(first) => {
                // %[[:]flags][width[.precision]][doxXs]
                let mut c = first;
                if c == b':' {
                    match bytes.next() {
                        Some(next) => c = next,
                        None => return false,
                    }
                } else if matches!(c, b'+' | b'-') {
                    // arithmetic operators unless introduced by ':'
                    continue;
                }
                while matches!(c, b'-' | b'+' | b'#' | b' ' | b'.' | b'0'..=b'9') {
                    match bytes.next() {
                        Some(next) => c = next,
                        None => return false,
                    }
                }
                if c == b's' {
                    return true;
                }
            }
        }
    }
    false
}
