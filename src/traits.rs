//! Core traits for the utf8stream library.

use std::io;

/// The raw I/O endpoint underneath a file-backed [`BufferedStream`].
///
/// Each method maps to exactly one system call. Implementations report
/// `ErrorKind::Interrupted` as-is; the stream owns the retry policy, as well
/// as partial-write accumulation and sticky failure tracking.
///
/// The production implementation is [`Fd`]; tests substitute descriptors
/// that inject faults or count calls.
///
/// [`BufferedStream`]: crate::BufferedStream
/// [`Fd`]: crate::Fd
pub trait Descriptor {
    /// Reads up to `buf.len()` bytes. `Ok(0)` means end of file.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes a prefix of `buf`, returning how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Releases the descriptor. Called by the stream exactly once per
    /// `close`, plus once more for every `Interrupted` it returns.
    fn close(&mut self) -> io::Result<()>;
}

impl<D: Descriptor + ?Sized> Descriptor for Box<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
