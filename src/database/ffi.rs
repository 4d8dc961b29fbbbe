//! Raw bindings to the curses terminfo layer
//!
//! Only the low-level terminfo entry points are bound here; nothing from the
//! screen-management half of curses is used.
//!
//! Reference: https://invisible-island.net/ncurses/man/curs_terminfo.3x.html

#![allow(non_camel_case_types)]

use libc::{c_char, c_int, c_long};

/// Opaque per-terminal state block owned by the curses library
#[repr(C)]
pub struct TERMINAL {
    _private: [u8; 0],
}

/// Output callback used by `tputs`
pub type putc_fn = extern "C" fn(c_int) -> c_int;

pub const OK: c_int = 0;
pub const ERR: c_int = -1;

/// `tigetflag` result for a name that is not a boolean capability
pub const NOT_BOOLEAN: c_int = -1;
/// `tigetnum` result for an absent or canceled numeric capability
pub const ABSENT_OR_CANCELLED_NUMERIC: c_int = -1;
/// `tigetnum` result for a name that is not a numeric capability
pub const NOT_NUMERIC: c_int = -2;

/// `tigetstr` result for a name that is not a string capability
pub fn not_string() -> *mut c_char {
    usize::MAX as *mut c_char
}

/// `setupterm` error codes reported through `errret`
pub const TGETENT_YES: c_int = 1;
pub const TGETENT_NO: c_int = 0;
pub const TGETENT_ERR: c_int = -1;

#[cfg_attr(unix, link(name = "ncurses"))]
extern "C" {
    pub fn setupterm(term: *const c_char, filedes: c_int, errret: *mut c_int) -> c_int;
    pub fn set_curterm(nterm: *mut TERMINAL) -> *mut TERMINAL;
    pub fn del_curterm(oterm: *mut TERMINAL) -> c_int;

    pub fn tigetflag(capname: *const c_char) -> c_int;
    pub fn tigetnum(capname: *const c_char) -> c_int;
    pub fn tigetstr(capname: *const c_char) -> *mut c_char;

    /// Varargs form; callers always pass exactly nine `long` parameters.
    pub fn tparm(template: *const c_char, ...) -> *mut c_char;
    pub fn tputs(template: *const c_char, affcnt: c_int, putc: putc_fn) -> c_int;
}

/// Number of parameter slots `tparm` reads
pub const TPARM_SLOTS: usize = 9;

pub type TparmArgs = [c_long; TPARM_SLOTS];
