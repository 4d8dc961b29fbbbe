//! Terminfo sessions
//!
//! Capability lookups and control-string expansion over the system terminfo
//! database (curses `setupterm` and friends), plus tty window-size access.
//!
//! - [`Session`]: one terminal type per session; typed lookups, parameter
//!   expansion (`tparm`) and padding expansion (`tputs`)
//! - [`Terminal`]: a session bound to an output stream, with control
//!   strings, batched writes and screen size
//! - [`window_size`] / [`set_window_size`]: TIOCGWINSZ / TIOCSWINSZ
//! - [`Config`]: settings for terminal handles
//!
//! curses keeps a single "current terminal" for the whole process. Sessions
//! switch it on demand, and every session operation in the process runs
//! under one lock, so sessions can be shared between threads but their
//! operations never overlap.
//!
//! ```no_run
//! use terminfo_session::Session;
//!
//! let session = Session::open(Some("vt100"), 1)?;
//! let cuf = session.get_string("cuf")?;
//! let right3 = session.expand_parameters(&cuf, &[3])?;
//! assert_eq!(right3, b"\x1b[3C");
//! # Ok::<(), terminfo_session::Error>(())
//! ```

#[cfg(not(unix))]
compile_error!("terminfo-session needs a unix target: curses and tty file descriptors");

mod config;
mod database;
mod error;
mod session;
mod terminal;
mod winsize;

pub use config::Config;
pub use database::Capability;
pub use error::{CapabilityKind, Error, Result};
pub use session::{Session, MAX_PARAMETERS};
pub use terminal::Terminal;
pub use winsize::{set_window_size, window_size, WindowSize};
