//! Terminal window size (TIOCGWINSZ / TIOCSWINSZ)
//!
//! These requests go straight to the tty driver and need no terminfo
//! session. A driver that does not implement them reports
//! [`Error::WindowSizeUnsupported`].

use std::os::unix::io::RawFd;

use tracing::debug;

use crate::error::{Error, Result};

/// Window size in rows, columns, and pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    /// Number of rows (lines)
    pub rows: u16,
    /// Number of columns (characters per line)
    pub cols: u16,
    /// Width in pixels (optional, can be 0)
    pub pixel_width: u16,
    /// Height in pixels (optional, can be 0)
    pub pixel_height: u16,
}

impl WindowSize {
    /// Size in character cells, with no pixel dimensions
    pub fn new(rows: u16, cols: u16) -> Self {
        WindowSize {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Size in character cells plus the pixel dimensions of the window
    pub fn with_pixels(rows: u16, cols: u16, pixel_width: u16, pixel_height: u16) -> Self {
        WindowSize {
            rows,
            cols,
            pixel_width,
            pixel_height,
        }
    }

    /// Convert to the structure TIOCSWINSZ takes
    pub fn to_winsize(&self) -> libc::winsize {
        libc::winsize {
            ws_row: self.rows,
            ws_col: self.cols,
            ws_xpixel: self.pixel_width,
            ws_ypixel: self.pixel_height,
        }
    }

    /// Create from the structure TIOCGWINSZ fills in
    pub fn from_winsize(ws: libc::winsize) -> Self {
        WindowSize {
            rows: ws.ws_row,
            cols: ws.ws_col,
            pixel_width: ws.ws_xpixel,
            pixel_height: ws.ws_ypixel,
        }
    }

    /// Read the window size of the terminal behind `fd`
    pub fn get_from_fd(fd: RawFd) -> Result<Self> {
        sys::get(fd).map(WindowSize::from_winsize)
    }

    /// Set the window size of the terminal behind `fd`
    pub fn set_on_fd(&self, fd: RawFd) -> Result<()> {
        sys::set(fd, &self.to_winsize())
    }
}

/// Rows and columns of the terminal behind `fd`
pub fn window_size(fd: RawFd) -> Result<(u16, u16)> {
    let size = WindowSize::get_from_fd(fd)?;
    Ok((size.rows, size.cols))
}

/// Resize the terminal behind `fd`, clearing its pixel dimensions
pub fn set_window_size(fd: RawFd, rows: u16, cols: u16) -> Result<()> {
    debug!(fd, rows, cols, "setting window size");
    WindowSize::new(rows, cols).set_on_fd(fd)
}

mod sys {
    use std::io;

    use super::RawFd;
    use crate::error::{Error, Result};

    nix::ioctl_read_bad!(tiocgwinsz, libc::TIOCGWINSZ, libc::winsize);
    nix::ioctl_write_ptr_bad!(tiocswinsz, libc::TIOCSWINSZ, libc::winsize);

    pub(super) fn get(fd: RawFd) -> Result<libc::winsize> {
        let mut ws = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };
        // SAFETY: `ws` is a valid, writable winsize.
        unsafe { tiocgwinsz(fd, &mut ws) }.map_err(ioctl_error)?;
        Ok(ws)
    }

    pub(super) fn set(fd: RawFd, ws: &libc::winsize) -> Result<()> {
        // SAFETY: `ws` is a valid winsize for the duration of the call.
        unsafe { tiocswinsz(fd, ws) }.map_err(ioctl_error)?;
        Ok(())
    }

    pub(super) fn ioctl_error(errno: nix::Error) -> Error {
        match errno {
            nix::Error::ENOSYS | nix::Error::EOPNOTSUPP => Error::WindowSizeUnsupported,
            errno => Error::WindowSize(io::Error::from(errno)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn test_window_size_new() {
        let size = WindowSize::new(24, 80);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 80);
        assert_eq!(size.pixel_width, 0);
        assert_eq!(size.pixel_height, 0);
    }

    #[test]
    fn test_winsize_conversion() {
        let size = WindowSize::with_pixels(30, 100, 800, 600);
        let ws = size.to_winsize();
        assert_eq!(ws.ws_row, 30);
        assert_eq!(ws.ws_col, 100);
        assert_eq!(WindowSize::from_winsize(ws), size);
    }

    #[test]
    fn test_get_on_regular_file_fails() {
        let file = tempfile::tempfile().unwrap();
        let err = window_size(file.as_raw_fd()).unwrap_err();
        match err {
            Error::WindowSize(e) => assert_eq!(e.raw_os_error(), Some(libc::ENOTTY)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_driver_support_is_unsupported() {
        for errno in [nix::Error::ENOSYS, nix::Error::EOPNOTSUPP] {
            assert!(matches!(sys::ioctl_error(errno), Error::WindowSizeUnsupported));
        }
        assert!(matches!(
            sys::ioctl_error(nix::Error::EBADF),
            Error::WindowSize(e) if e.raw_os_error() == Some(libc::EBADF)
        ));
    }

    #[test]
    fn test_set_on_regular_file_fails() {
        let file = tempfile::tempfile().unwrap();
        assert!(matches!(
            set_window_size(file.as_raw_fd(), 25, 80),
            Err(Error::WindowSize(_))
        ));
    }
}
