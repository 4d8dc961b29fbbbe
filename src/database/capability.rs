//! Typed capability lookups against the current context

use std::ffi::CStr;

use tracing::trace;

use super::{ffi, Database};
use crate::error::{CapabilityKind, Error, Result};

/// A capability as reported by the current terminfo context
///
/// curses folds "absent" and "canceled" into one sentinel for numbers and
/// strings, and reports absent booleans as `false`, so the two cases share
/// [`Capability::Missing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    Boolean(bool),
    Number(i32),
    /// Raw template, possibly with parameter and padding directives
    String(Vec<u8>),
    /// Absent from the entry or explicitly canceled
    Missing,
    /// The name belongs to a different capability table
    NotThisType,
}

impl Capability {
    pub fn into_flag(self, name: &str) -> Result<bool> {
        match self {
            Capability::Boolean(value) => Ok(value),
            other => Err(other.mismatch(name, CapabilityKind::Boolean)),
        }
    }

    pub fn into_number(self, name: &str) -> Result<i32> {
        match self {
            Capability::Number(value) => Ok(value),
            other => Err(other.mismatch(name, CapabilityKind::Numeric)),
        }
    }

    pub fn into_string(self, name: &str) -> Result<Vec<u8>> {
        match self {
            Capability::String(value) => Ok(value),
            other => Err(other.mismatch(name, CapabilityKind::String)),
        }
    }

    fn mismatch(self, name: &str, expected: CapabilityKind) -> Error {
        match self {
            Capability::Missing => Error::AbsentOrCanceled(name.to_string()),
            _ => Error::WrongType {
                name: name.to_string(),
                expected,
            },
        }
    }
}

impl Database {
    pub fn flag(&self, name: &CStr) -> Capability {
        // SAFETY: `name` is NUL-terminated; the guard is held.
        let value = unsafe { ffi::tigetflag(name.as_ptr()) };
        trace!(?name, value, "tigetflag");
        match value {
            ffi::NOT_BOOLEAN => Capability::NotThisType,
            v => Capability::Boolean(v != 0),
        }
    }

    pub fn number(&self, name: &CStr) -> Capability {
        // SAFETY: as above.
        let value = unsafe { ffi::tigetnum(name.as_ptr()) };
        trace!(?name, value, "tigetnum");
        match value {
            ffi::NOT_NUMERIC => Capability::NotThisType,
            ffi::ABSENT_OR_CANCELLED_NUMERIC => Capability::Missing,
            n => Capability::Number(n),
        }
    }

    pub fn string(&self, name: &CStr) -> Capability {
        // SAFETY: as above.
        let value = unsafe { ffi::tigetstr(name.as_ptr()) };
        trace!(?name, null = value.is_null(), "tigetstr");
        if value == ffi::not_string() {
            Capability::NotThisType
        } else if value.is_null() {
            Capability::Missing
        } else {
            // SAFETY: a valid tigetstr result points into the current
            // context, which stays alive while the guard is held.
            let bytes = unsafe { CStr::from_ptr(value) }.to_bytes();
            Capability::String(bytes.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_into_flag() {
        assert!(Capability::Boolean(true).into_flag("am").unwrap());
        let err = Capability::NotThisType.into_flag("cols").unwrap_err();
        assert!(matches!(
            err,
            Error::WrongType {
                expected: CapabilityKind::Boolean,
                ..
            }
        ));
    }

    #[test]
    fn test_into_number_distinguishes_missing_from_wrong_type() {
        assert_eq!(Capability::Number(80).into_number("cols").unwrap(), 80);
        assert!(matches!(
            Capability::Missing.into_number("colors"),
            Err(Error::AbsentOrCanceled(name)) if name == "colors"
        ));
        assert!(matches!(
            Capability::NotThisType.into_number("am"),
            Err(Error::WrongType {
                expected: CapabilityKind::Numeric,
                ..
            })
        ));
    }

    #[test]
    fn test_into_string_never_coerces() {
        assert!(matches!(
            Capability::Number(8).into_string("colors"),
            Err(Error::WrongType {
                expected: CapabilityKind::String,
                ..
            })
        ));
        let home = Capability::String(b"\x1b[H".to_vec());
        assert_eq!(home.into_string("home").unwrap(), b"\x1b[H");
    }

    #[test]
    fn test_sentinels_map_to_missing_and_not_this_type() {
        let mut db = super::super::lock();
        let Ok((context, _)) = db.setup(Some("vt100"), 2) else {
            eprintln!("skipping: vt100 terminfo entry not installed");
            return;
        };
        let name = |n: &str| CString::new(n).unwrap();
        let results = [
            db.flag(&name("cols")),
            db.number(&name("am")),
            db.number(&name("colors")),
            db.string(&name("cols")),
            db.string(&name("setaf")),
            db.number(&name("it")),
        ];
        // contexts release through the lock, so let go of it first
        drop(db);
        drop(context);

        assert_eq!(
            results,
            [
                Capability::NotThisType,
                Capability::NotThisType,
                Capability::Missing,
                Capability::NotThisType,
                Capability::Missing,
                Capability::Number(8),
            ]
        );
    }
}
