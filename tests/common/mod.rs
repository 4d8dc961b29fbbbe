//! Shared helpers for integration tests

#![allow(dead_code)]

use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::sync::{Once, OnceLock};

use terminfo_session::{Error, Session};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Route library logs to the test writer (filter with RUST_LOG)
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A session on a scratch file, or `None` when `term` is not installed
///
/// The file is returned so the descriptor outlives the session.
pub fn open_or_skip(term: &str) -> Option<(Session, File)> {
    init_tracing();
    let out = tempfile::tempfile().expect("create scratch file");
    match Session::open(Some(term), out.as_raw_fd()) {
        Ok(session) => Some((session, out)),
        Err(Error::TypeNotFound(_) | Error::DatabaseUnavailable) => {
            eprintln!("skipping: {term} terminfo entry not installed");
            None
        }
        Err(e) => panic!("unexpected setup error for {term}: {e}"),
    }
}

/// A vt100 session shared by every test in the binary
pub fn shared_vt100() -> Option<&'static Session> {
    static VT100: OnceLock<Option<(Session, File)>> = OnceLock::new();
    VT100
        .get_or_init(|| open_or_skip("vt100"))
        .as_ref()
        .map(|(session, _)| session)
}
