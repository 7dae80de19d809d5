//! A buffered byte stream over memory or a file descriptor.

use crate::buffer::ByteBuffer;
use crate::error::{Error, IoFailure, Result};
use crate::fd::Fd;
use crate::traits::Descriptor;
use libc::c_int;
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::ops::BitOr;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Size of the staging buffer allocated for file-backed streams.
pub const DEFAULT_BUFFER_SIZE: usize = 16 * 1024;

/// Which operations a stream permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `getc` only.
    In,
    /// `putc` only.
    Out,
    /// Both.
    InOut,
}

impl Direction {
    pub fn reads(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    pub fn writes(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// POSIX `open(2)` flags.
///
/// The access mode (`RDONLY`, `WRONLY`, `RDWR`) decides the stream's
/// [`Direction`]; the remaining bits are handed to the OS unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags(c_int);

impl OpenFlags {
    pub const RDONLY: Self = Self(libc::O_RDONLY);
    pub const WRONLY: Self = Self(libc::O_WRONLY);
    pub const RDWR: Self = Self(libc::O_RDWR);
    pub const CREAT: Self = Self(libc::O_CREAT);
    pub const TRUNC: Self = Self(libc::O_TRUNC);
    pub const APPEND: Self = Self(libc::O_APPEND);
    pub const EXCL: Self = Self(libc::O_EXCL);

    pub const fn from_bits(bits: c_int) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> c_int {
        self.0
    }

    /// The direction implied by the access mode bits.
    ///
    /// # Panics
    /// If the access mode is not one of `RDONLY`, `WRONLY` or `RDWR`.
    pub fn direction(self) -> Direction {
        match self.0 & libc::O_ACCMODE {
            libc::O_RDONLY => Direction::In,
            libc::O_WRONLY => Direction::Out,
            libc::O_RDWR => Direction::InOut,
            other => panic!("invalid open flags: access mode {other:#o}"),
        }
    }
}

impl BitOr for OpenFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How a stream is called in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamName {
    /// The stream was opened from this path.
    Path(PathBuf),
    /// A free-form label such as `STDIN`.
    Label(String),
}

impl From<&str> for StreamName {
    fn from(label: &str) -> Self {
        StreamName::Label(label.to_owned())
    }
}

impl From<String> for StreamName {
    fn from(label: String) -> Self {
        StreamName::Label(label)
    }
}

impl From<PathBuf> for StreamName {
    fn from(path: PathBuf) -> Self {
        StreamName::Path(path)
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamName::Path(p) => write!(f, "{}", p.display()),
            StreamName::Label(l) => f.write_str(l),
        }
    }
}

/// Quotes `s` for a POSIX shell: wrapped in single quotes, with embedded
/// single quotes written as `'\''`.
pub fn quote_sh(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(c);
        }
    }
    out.push('\'');
    out
}

/// State of a stream backed by a descriptor.
struct FileState<D> {
    descriptor: D,
    /// A read returned 0.
    exhausted: bool,
    /// First failure seen; re-reported instead of retrying the syscall.
    failure: Option<IoFailure>,
    /// The buffer holds bytes written by `putc` and not yet flushed.
    dirty: bool,
}

impl<D: Descriptor> FileState<D> {
    fn new(descriptor: D) -> Self {
        Self {
            descriptor,
            exhausted: false,
            failure: None,
            dirty: false,
        }
    }

    fn latched(&self) -> Option<Error> {
        self.failure.clone().map(Error::Io)
    }

    fn latch(&mut self, op: &'static str, err: io::Error) -> Error {
        let failure = IoFailure::from(err);
        warn!(op, error = %failure, "I/O failure latched");
        self.failure = Some(failure.clone());
        Error::Io(failure)
    }

    /// One blocking read into the whole buffer.
    fn fill(&mut self, buffer: &mut ByteBuffer<'_>) -> Result<()> {
        let n = loop {
            match self.descriptor.read(buffer.spare_mut()) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.latch("read", e)),
            }
        };
        if n == 0 {
            debug!("end of file");
            self.exhausted = true;
        } else {
            trace!(bytes = n, "buffer refilled");
            buffer.set_filled(n);
        }
        Ok(())
    }

    /// Writes out everything `putc` has staged, accumulating partial writes.
    fn drain(&mut self, buffer: &mut ByteBuffer<'_>) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(err) = self.latched() {
            return Err(err);
        }
        // the put cursor sits at the end of the staged bytes
        buffer.rewind();
        let total = buffer.len();
        while !buffer.is_empty() {
            match self.descriptor.write(buffer.active()) {
                Ok(0) => {
                    return Err(self.latch("write", io::Error::from(io::ErrorKind::WriteZero)));
                }
                Ok(n) => buffer.consume(n.min(buffer.len())),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.latch("write", e)),
            }
        }
        trace!(bytes = total, "buffer flushed");
        buffer.clear();
        self.dirty = false;
        Ok(())
    }

    fn close_descriptor(&mut self) -> Result<()> {
        loop {
            match self.descriptor.close() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.latch("close", e)),
            }
        }
    }
}

enum Backing<D> {
    Memory,
    File(FileState<D>),
}

/// A byte stream with one staging buffer, backed either by memory or by a
/// file descriptor.
///
/// Reads and writes are byte-granular (`getc` / `putc`). A file-backed
/// stream refills its buffer with one blocking read when it runs dry and
/// writes the buffer out when it fills up, on `flush`, and on `close`.
/// Interrupted system calls are retried; any other failure is latched and
/// reported again by every later call instead of retrying the syscall. End
/// of file is latched the same way.
///
/// A stream is closed exactly once. Dropping a stream that was never closed
/// closes it on a best-effort basis (pending output is flushed; a failure
/// is logged).
///
/// ```rust
/// use utf8stream::{BufferedStream, ByteBuffer, Direction};
///
/// let mut s = BufferedStream::from_buffer(ByteBuffer::from_slice(b"hi"), Direction::In, "greeting");
/// assert_eq!(s.getc()?, Some(b'h'));
/// assert_eq!(s.getc()?, Some(b'i'));
/// assert_eq!(s.getc()?, None);
/// s.close()?;
/// # Ok::<(), utf8stream::Error>(())
/// ```
pub struct BufferedStream<'a, D: Descriptor = Fd> {
    buffer: ByteBuffer<'a>,
    direction: Direction,
    closed: bool,
    name: StreamName,
    consumed: u64,
    backing: Backing<D>,
}

impl<'a> BufferedStream<'a, Fd> {
    /// Wraps an existing buffer. Input streams read the buffer's active
    /// range; output streams write into it until it is full. To read back
    /// caller-owned writable memory, wrap it with
    /// [`ByteBuffer::from_mut_slice_filled`].
    ///
    /// # Panics
    /// If `direction` includes output and the buffer has zero capacity or is
    /// a read-only borrow: such a sink could never accept a byte.
    pub fn from_buffer(
        buffer: ByteBuffer<'a>,
        direction: Direction,
        name: impl Into<StreamName>,
    ) -> Self {
        if direction.writes() {
            assert!(
                buffer.capacity() > 0,
                "can't use buffer of size 0 for writing"
            );
            assert!(
                buffer.is_writable(),
                "can't use a read-only buffer for writing"
            );
        }
        Self::assemble(buffer, direction, name.into(), Backing::Memory)
    }
}

impl BufferedStream<'static, Fd> {
    /// Opens `path` with a [`DEFAULT_BUFFER_SIZE`] buffer.
    ///
    /// `mode` is only used when `flags` contains `CREAT`.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags, mode: u32) -> Result<Self> {
        Self::open_with_capacity(path, flags, mode, DEFAULT_BUFFER_SIZE)
    }

    /// Opens `path` read-only.
    pub fn open_read(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, OpenFlags::RDONLY, 0)
    }

    /// Opens `path` with an explicit buffer capacity.
    ///
    /// # Panics
    /// If `capacity` is zero or the access mode of `flags` is invalid.
    pub fn open_with_capacity(
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: u32,
        capacity: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let direction = flags.direction();
        assert!(capacity > 0, "file streams need a non-empty buffer");
        let buffer = ByteBuffer::with_capacity(capacity);
        let file = OpenOptions::new()
            .read(direction.reads())
            .write(direction.writes())
            .custom_flags(flags.bits() & !libc::O_ACCMODE)
            .mode(mode)
            .open(path)?;
        debug!(path = %path.display(), ?direction, "opened stream");
        Ok(Self::assemble(
            buffer,
            direction,
            StreamName::Path(path.to_path_buf()),
            Backing::File(FileState::new(Fd::from(file))),
        ))
    }

    /// An input stream over a duplicate of standard input.
    pub fn stdin() -> Result<Self> {
        let fd = Fd::stdin()?;
        Ok(Self::from_descriptor(fd, Direction::In, "STDIN"))
    }
}

impl<D: Descriptor> BufferedStream<'static, D> {
    /// Adopts an open descriptor with a [`DEFAULT_BUFFER_SIZE`] buffer.
    pub fn from_descriptor(descriptor: D, direction: Direction, name: impl Into<StreamName>) -> Self {
        Self::from_descriptor_with_capacity(descriptor, direction, name, DEFAULT_BUFFER_SIZE)
    }

    /// Adopts an open descriptor with an explicit buffer capacity.
    ///
    /// # Panics
    /// If `capacity` is zero.
    pub fn from_descriptor_with_capacity(
        descriptor: D,
        direction: Direction,
        name: impl Into<StreamName>,
        capacity: usize,
    ) -> Self {
        assert!(capacity > 0, "file streams need a non-empty buffer");
        Self::assemble(
            ByteBuffer::with_capacity(capacity),
            direction,
            name.into(),
            Backing::File(FileState::new(descriptor)),
        )
    }
}

impl<'a, D: Descriptor> BufferedStream<'a, D> {
    fn assemble(
        buffer: ByteBuffer<'a>,
        direction: Direction,
        name: StreamName,
        backing: Backing<D>,
    ) -> Self {
        Self {
            buffer,
            direction,
            closed: false,
            name,
            consumed: 0,
            backing,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn name(&self) -> &StreamName {
        &self.name
    }

    /// The name for messages meant to be pasted into a shell: paths are
    /// quoted, labels are returned as they are.
    pub fn name_sh(&self) -> String {
        match &self.name {
            StreamName::Path(p) => quote_sh(&p.to_string_lossy()),
            StreamName::Label(l) => l.clone(),
        }
    }

    /// Number of bytes `getc` has handed out so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn buffer(&self) -> &ByteBuffer<'a> {
        &self.buffer
    }

    fn ensure(&self, op: &'static str, permitted: bool, direction: &'static str) -> Result<()> {
        if self.closed {
            return Err(Error::stream_closed(op));
        }
        if !permitted {
            return Err(Error::wrong_direction(op, direction));
        }
        Ok(())
    }

    /// Reads one byte. `Ok(None)` is end of input, and stays so.
    pub fn getc(&mut self) -> Result<Option<u8>> {
        self.ensure("getc", self.direction.reads(), "input")?;
        loop {
            if let Some(b) = self.buffer.get() {
                self.consumed += 1;
                return Ok(Some(b));
            }
            let Backing::File(file) = &mut self.backing else {
                return Ok(None);
            };
            if file.exhausted {
                return Ok(None);
            }
            if let Some(err) = file.latched() {
                return Err(err);
            }
            file.drain(&mut self.buffer)?;
            file.fill(&mut self.buffer)?;
        }
    }

    /// Writes one byte, flushing a full buffer to the descriptor first.
    ///
    /// On a file-backed `InOut` stream the first `putc` after reading
    /// discards whatever read-ahead is still buffered. The descriptor's
    /// offset already lies past those bytes, so they are never returned by
    /// `getc`, and the written byte lands after them. For example, with a
    /// file holding `abc`, `getc` returns `a`, then `putc(b'Z')` leaves the
    /// file as `abcZ` and the next `getc` sees end of input.
    ///
    /// A memory-backed stream shares one cursor between reads and writes:
    /// `putc` overwrites the byte `getc` would have returned next.
    pub fn putc(&mut self, byte: u8) -> Result<()> {
        self.ensure("putc", self.direction.writes(), "output")?;
        match &mut self.backing {
            Backing::Memory => {
                if self.buffer.put(byte) {
                    Ok(())
                } else {
                    Err(Error::OutOfSpace)
                }
            }
            Backing::File(file) => {
                if let Some(err) = file.latched() {
                    return Err(err);
                }
                if !file.dirty {
                    // drop read-ahead; the OS offset is already past it
                    self.buffer.clear();
                    file.dirty = true;
                }
                if self.buffer.put(byte) {
                    return Ok(());
                }
                file.drain(&mut self.buffer)?;
                self.putc(byte)
            }
        }
    }

    /// Writes out buffered output. A no-op for memory-backed streams.
    pub fn flush(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::stream_closed("flush"));
        }
        match &mut self.backing {
            Backing::Memory => Ok(()),
            Backing::File(file) => file.drain(&mut self.buffer),
        }
    }

    /// Flushes (for output streams), releases the descriptor, and marks the
    /// stream closed.
    ///
    /// The stream ends up closed even when flushing or closing the
    /// descriptor fails; the first such failure is returned. Closing twice
    /// is an error.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::AlreadyClosed);
        }
        let mut outcome = Ok(());
        if let Backing::File(file) = &mut self.backing {
            if self.direction.writes() {
                outcome = file.drain(&mut self.buffer);
            }
            let released = file.close_descriptor();
            if outcome.is_ok() {
                outcome = released;
            }
        }
        self.buffer.clear();
        self.closed = true;
        debug!(stream = %self.name, ok = outcome.is_ok(), "closed stream");
        outcome
    }

    /// Gives up the stream and returns its buffer.
    ///
    /// A memory-backed stream hands back its buffer as it stands, so a sink
    /// can be inspected through [`ByteBuffer::filled`]. A file-backed stream
    /// that is still open is closed first.
    pub fn into_buffer(mut self) -> ByteBuffer<'a> {
        if !self.closed {
            if let Backing::File(_) = self.backing {
                if let Err(err) = self.close() {
                    warn!(stream = %self.name, error = %err, "close in into_buffer failed");
                }
            }
        }
        self.closed = true;
        std::mem::replace(&mut self.buffer, ByteBuffer::from_slice(&[]))
    }
}

impl<D: Descriptor> Drop for BufferedStream<'_, D> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.close() {
            warn!(stream = %self.name, error = %err, "closing dropped stream failed");
        }
    }
}

impl<D: Descriptor> fmt::Debug for BufferedStream<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match &self.backing {
            Backing::Memory => "memory",
            Backing::File(_) => "file",
        };
        f.debug_struct("BufferedStream")
            .field("name", &self.name)
            .field("direction", &self.direction)
            .field("closed", &self.closed)
            .field("backing", &backing)
            .field("buffer", &self.buffer)
            .finish()
    }
}
