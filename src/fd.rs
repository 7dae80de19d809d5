//! An owned POSIX file descriptor driven through raw `read`/`write`/`close`.

use crate::traits::Descriptor;
use std::fs::File;
use std::io;
use std::os::fd::{AsFd, AsRawFd, IntoRawFd, OwnedFd, RawFd};

/// An owned file descriptor.
///
/// Until [`Descriptor::close`] succeeds the descriptor is held as an
/// `OwnedFd`, so dropping an `Fd` on an early-exit path still releases it.
#[derive(Debug)]
pub struct Fd {
    owned: Option<OwnedFd>,
}

impl Fd {
    pub fn new(fd: OwnedFd) -> Self {
        Self { owned: Some(fd) }
    }

    /// A duplicate of the process's standard input.
    pub fn stdin() -> io::Result<Self> {
        io::stdin().as_fd().try_clone_to_owned().map(Self::new)
    }

    /// The raw descriptor number, or `None` once closed.
    pub fn as_raw(&self) -> Option<RawFd> {
        self.owned.as_ref().map(AsRawFd::as_raw_fd)
    }

    fn raw(&self) -> io::Result<RawFd> {
        self.as_raw()
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EBADF))
    }
}

impl From<OwnedFd> for Fd {
    fn from(fd: OwnedFd) -> Self {
        Self::new(fd)
    }
}

impl From<File> for Fd {
    fn from(file: File) -> Self {
        Self::new(OwnedFd::from(file))
    }
}

impl Descriptor for Fd {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let fd = self.raw()?;
        // SAFETY: `buf` is valid for writes of `buf.len()` bytes and `fd` is
        // open for as long as `self.owned` holds it.
        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let fd = self.raw()?;
        // SAFETY: `buf` is valid for reads of `buf.len()` bytes and `fd` is
        // open for as long as `self.owned` holds it.
        let n = unsafe { libc::write(fd, buf.as_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(n as usize)
    }

    fn close(&mut self) -> io::Result<()> {
        // Ownership is given up before the call: after close(2) returns, even
        // with EINTR, the descriptor number may already be reused. A retried
        // close therefore finds nothing left to release and succeeds.
        let Some(fd) = self.owned.take() else {
            return Ok(());
        };
        let raw = fd.into_raw_fd();
        // SAFETY: `raw` came out of an `OwnedFd` we held and is never used
        // again.
        if unsafe { libc::close(raw) } < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}
