//! Terminfo sessions
//!
//! A [`Session`] owns one terminfo context and makes it current before every
//! operation, so several sessions for different terminal types can be used
//! side by side even though curses itself only knows one terminal at a time.
//!
//! All session operations in the process are serialized behind a single
//! lock: an operation activates its context and performs its lookup or
//! expansion without any other session being able to switch contexts in
//! between. Sessions are therefore `Send + Sync`, but operations from
//! different threads never run in parallel.

use std::ffi::CString;
use std::os::unix::io::RawFd;

use libc::c_long;

use crate::database::{self, ffi, Capability, Context, Database};
use crate::error::{CapabilityKind, Error, Result};

/// Maximum number of parameters accepted by [`Session::expand_parameters`]
pub const MAX_PARAMETERS: usize = ffi::TPARM_SLOTS;

/// A terminfo context for one terminal type and output descriptor
#[derive(Default)]
pub struct Session {
    context: Option<Context>,
    diagnostic: i32,
}

impl Session {
    /// Create an uninitialized session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and initialize it in one step
    pub fn open(term: Option<&str>, fd: RawFd) -> Result<Self> {
        let mut session = Self::new();
        session.init(term, fd)?;
        Ok(session)
    }

    /// Load the terminfo entry for `term` (`$TERM` when `None`) on `fd`
    ///
    /// Returns the diagnostic code: `0` for a fully supported terminal. A
    /// session can be initialized successfully only once; after a failed
    /// attempt it stays uninitialized and may be retried.
    pub fn init(&mut self, term: Option<&str>, fd: RawFd) -> Result<i32> {
        if self.context.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let (context, diagnostic) = database::lock().setup(term, fd)?;
        self.context = Some(context);
        self.diagnostic = diagnostic;
        Ok(diagnostic)
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_some()
    }

    /// Diagnostic code reported by the successful `init`
    pub fn diagnostic(&self) -> i32 {
        self.diagnostic
    }

    /// Look up `name` in one of the three capability tables
    ///
    /// Returns the raw tagged value; the typed getters below turn the
    /// non-matching cases into errors.
    pub fn lookup(&self, name: &str, kind: CapabilityKind) -> Result<Capability> {
        let cname = capability_name(name)?;
        let db = self.activate()?;
        Ok(match kind {
            CapabilityKind::Boolean => db.flag(&cname),
            CapabilityKind::Numeric => db.number(&cname),
            CapabilityKind::String => db.string(&cname),
        })
    }

    /// Look up a boolean capability such as `am`
    pub fn get_flag(&self, name: &str) -> Result<bool> {
        self.lookup(name, CapabilityKind::Boolean)?.into_flag(name)
    }

    /// Look up a numeric capability such as `cols`
    pub fn get_number(&self, name: &str) -> Result<i32> {
        self.lookup(name, CapabilityKind::Numeric)?.into_number(name)
    }

    /// Look up a string capability such as `cup`
    ///
    /// The result is the raw template: expand parameters and padding before
    /// sending it to a terminal.
    pub fn get_string(&self, name: &str) -> Result<Vec<u8>> {
        self.lookup(name, CapabilityKind::String)?.into_string(name)
    }

    /// Substitute up to nine integer parameters into `template`
    ///
    /// Parameters that are not supplied are zero.
    pub fn expand_parameters(
        &self,
        template: impl AsRef<[u8]>,
        params: &[i64],
    ) -> Result<Vec<u8>> {
        let template = template.as_ref();
        if template.is_empty() {
            return Err(Error::MissingArgument("template"));
        }
        let template = c_template(template)?;
        let args = tparm_args(params)?;
        self.activate()?.tparm(&template, &args)
    }

    /// Apply the padding directives (`$<..>`) in `template`
    ///
    /// `affected_lines` scales proportional delays (`$<n*>`).
    pub fn expand_padding(
        &self,
        template: impl AsRef<[u8]>,
        affected_lines: i32,
    ) -> Result<Vec<u8>> {
        let template = c_template(template.as_ref())?;
        self.activate()?.tputs(&template, affected_lines)
    }

    /// Take the database guard with this session's context current
    fn activate(&self) -> Result<Database> {
        let context = self.context.as_ref().ok_or(Error::NotInitialized)?;
        let mut db = database::lock();
        db.activate(context);
        Ok(db)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("diagnostic", &self.diagnostic)
            .finish()
    }
}

fn capability_name(name: &str) -> Result<CString> {
    if name.is_empty() {
        return Err(Error::MissingArgument("capability name"));
    }
    CString::new(name).map_err(|_| {
        Error::InvalidArgument(format!("capability name {name:?} contains a NUL byte"))
    })
}

fn c_template(template: &[u8]) -> Result<CString> {
    CString::new(template)
        .map_err(|_| Error::InvalidArgument("template contains a NUL byte".to_string()))
}

fn tparm_args(params: &[i64]) -> Result<ffi::TparmArgs> {
    if params.len() > MAX_PARAMETERS {
        return Err(Error::InvalidArgument(format!(
            "at most {MAX_PARAMETERS} parameters are supported, got {}",
            params.len()
        )));
    }
    let mut args: ffi::TparmArgs = [0; ffi::TPARM_SLOTS];
    for (slot, &param) in args.iter_mut().zip(params) {
        *slot = c_long::try_from(param)
            .map_err(|_| Error::InvalidArgument(format!("parameter {param} is out of range")))?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tparm_args_pads_with_zero() {
        let args = tparm_args(&[3, 7]).unwrap();
        assert_eq!(args, [3, 7, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_tparm_args_rejects_ten_parameters() {
        let err = tparm_args(&[1; 10]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_uninitialized_session_operations_fail() {
        let session = Session::new();
        assert!(!session.is_initialized());
        assert!(matches!(session.get_flag("am"), Err(Error::NotInitialized)));
        assert!(matches!(session.get_number("cols"), Err(Error::NotInitialized)));
        assert!(matches!(session.get_string("cup"), Err(Error::NotInitialized)));
        assert!(matches!(
            session.expand_parameters("\x1b[%p1%dC", &[3]),
            Err(Error::NotInitialized)
        ));
        assert!(matches!(
            session.expand_padding("\x1b[C$<2>", 1),
            Err(Error::NotInitialized)
        ));
    }

    #[test]
    fn test_argument_errors_before_initialization_check() {
        let session = Session::new();
        assert!(matches!(
            session.get_flag(""),
            Err(Error::MissingArgument("capability name"))
        ));
        assert!(matches!(
            session.expand_parameters("", &[]),
            Err(Error::MissingArgument("template"))
        ));
        assert!(matches!(
            session.get_string("c\0up"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_dropping_uninitialized_session_is_noop() {
        let session = Session::new();
        drop(session);
    }
}
