//! Terminal handle
//!
//! Ties a [`Session`] to the stream it controls: control strings are looked
//! up, parameter-expanded and padded in one call, then written to the
//! output. Writes can be grouped into batches that reach the device with a
//! single flush.

use std::env;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::mem;
use std::os::unix::io::AsRawFd;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::winsize::window_size;

/// A terminfo session bound to an output stream
pub struct Terminal<W: Write + AsRawFd> {
    session: Session,
    out: W,
    config: Config,
    term: String,
    /// Output held back by an open batch
    pending: Vec<u8>,
    batch_depth: usize,
}

impl Terminal<File> {
    /// Open `config.tty_path` (normally `/dev/tty`) for reading and writing
    pub fn open_tty(config: Config) -> Result<Self> {
        config.validate()?;
        let tty = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.tty_path)?;
        Self::with_config(config, tty)
    }
}

impl<W: Write + AsRawFd> Terminal<W> {
    /// Set up `term` (`$TERM` when `None`) on `out` with default settings
    pub fn new(term: Option<&str>, out: W) -> Result<Self> {
        let config = Config {
            term: term.map(str::to_string),
            ..Config::default()
        };
        Self::with_config(config, out)
    }

    pub fn with_config(config: Config, out: W) -> Result<Self> {
        config.validate()?;
        let session = Session::open(config.term.as_deref(), out.as_raw_fd())?;
        let term = match &config.term {
            Some(term) => term.clone(),
            None => env::var("TERM").unwrap_or_default(),
        };
        debug!(term = %term, fd = out.as_raw_fd(), "terminal ready");
        Ok(Self {
            session,
            out,
            config,
            term,
            pending: Vec::new(),
            batch_depth: 0,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Terminal type name this handle was set up for
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Bytes that perform `cap` with `params`, padded for the configured
    /// number of affected lines
    pub fn control_string(&self, cap: &str, params: &[i64]) -> Result<Vec<u8>> {
        self.control_string_affecting(self.config.affected_lines, cap, params)
    }

    /// Like [`Terminal::control_string`] with an explicit affected-line count
    pub fn control_string_affecting(
        &self,
        affected_lines: i32,
        cap: &str,
        params: &[i64],
    ) -> Result<Vec<u8>> {
        if cap.is_empty() {
            return Err(Error::MissingArgument("capability name"));
        }
        let template = self.session.get_string(cap)?;
        if template.is_empty() {
            return Ok(template);
        }
        let expanded = self.session.expand_parameters(&template, params)?;
        self.session.expand_padding(&expanded, affected_lines)
    }

    /// Write the control string for `cap` to the output
    pub fn control(&mut self, cap: &str, params: &[i64]) -> Result<()> {
        let bytes = self.control_string(cap, params)?;
        self.write(&bytes)
    }

    /// Write raw bytes; outside a batch they are flushed immediately
    ///
    /// Output still held from an abandoned batch goes out first.
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.pending.extend_from_slice(bytes);
        if self.batch_depth > 0 {
            return Ok(());
        }
        self.flush_pending()
    }

    /// Flush the output; inside a batch this waits for the batch to end
    pub fn flush(&mut self) -> Result<()> {
        if self.batch_depth > 0 {
            return Ok(());
        }
        self.flush_pending()
    }

    /// Run `f` with output held back, then emit it with one flush
    ///
    /// Batches nest; only the outermost one writes. Held output is written
    /// even when `f` fails, and the error from `f` takes precedence.
    pub fn batch<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = {
            let mut scope = BatchScope::enter(self);
            f(&mut *scope.0)
        };
        if self.batch_depth > 0 {
            return result;
        }
        let flushed = self.flush_pending();
        let value = result?;
        flushed?;
        Ok(value)
    }

    fn flush_pending(&mut self) -> Result<()> {
        let pending = mem::take(&mut self.pending);
        if !pending.is_empty() {
            self.out.write_all(&pending)?;
        }
        self.out.flush()?;
        Ok(())
    }

    /// Screen size as `(lines, columns)`
    ///
    /// Uses the window size of the output; a dimension the tty does not
    /// report falls back to `$LINES` / `$COLUMNS` (when enabled) and then to
    /// the `lines` / `cols` capabilities.
    pub fn screen_size(&self) -> Result<(i32, i32)> {
        let (rows, cols) = match window_size(self.out.as_raw_fd()) {
            Ok((rows, cols)) => (i32::from(rows), i32::from(cols)),
            Err(e) => {
                debug!(error = %e, "window size unavailable");
                (0, 0)
            }
        };
        let lines = match rows {
            0 => self.fallback_dimension("LINES", "lines")?,
            n => n,
        };
        let columns = match cols {
            0 => self.fallback_dimension("COLUMNS", "cols")?,
            n => n,
        };
        Ok((lines, columns))
    }

    pub fn screen_lines(&self) -> Result<i32> {
        Ok(self.screen_size()?.0)
    }

    pub fn screen_columns(&self) -> Result<i32> {
        Ok(self.screen_size()?.1)
    }

    fn fallback_dimension(&self, var: &str, cap: &str) -> Result<i32> {
        if self.config.use_env_size {
            if let Some(value) = env::var(var).ok().and_then(|v| v.trim().parse().ok()) {
                return Ok(value);
            }
        }
        self.session.get_number(cap)
    }
}

/// One open batch level; it closes on drop, including while unwinding
struct BatchScope<'a, W: Write + AsRawFd>(&'a mut Terminal<W>);

impl<'a, W: Write + AsRawFd> BatchScope<'a, W> {
    fn enter(terminal: &'a mut Terminal<W>) -> Self {
        terminal.batch_depth += 1;
        BatchScope(terminal)
    }
}

impl<W: Write + AsRawFd> Drop for BatchScope<'_, W> {
    fn drop(&mut self) {
        self.0.batch_depth -= 1;
    }
}

impl<W: Write + AsRawFd> fmt::Debug for Terminal<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Terminal").field("term", &self.term).finish()
    }
}
