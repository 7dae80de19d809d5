//! A fixed-capacity byte window with a single active cursor.
//!
//! `ByteBuffer` is the staging area of every [`BufferedStream`] and, for
//! memory-backed streams, the data source or sink itself. It keeps one active
//! range `[start, end)`: `start` is the next byte to hand out (or the next
//! byte to overwrite), `end` the exclusive bound of meaningful bytes.
//!
//! [`BufferedStream`]: crate::BufferedStream

/// Where the bytes of a buffer live.
enum Storage<'a> {
    Owned(Box<[u8]>),
    Shared(&'a [u8]),
    Exclusive(&'a mut [u8]),
}

impl Storage<'_> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(b) => &b[..],
            Storage::Shared(s) => *s,
            Storage::Exclusive(s) => &s[..],
        }
    }

    fn as_mut_slice(&mut self) -> Option<&mut [u8]> {
        match self {
            Storage::Owned(b) => Some(&mut b[..]),
            Storage::Shared(_) => None,
            Storage::Exclusive(s) => Some(&mut s[..]),
        }
    }
}

/// A fixed-capacity byte window with an active sub-range.
pub struct ByteBuffer<'a> {
    storage: Storage<'a>,
    start: usize,
    end: usize,
}

impl ByteBuffer<'static> {
    /// An owned, zero-filled buffer with an empty active range. This is what
    /// file-backed streams stage their I/O in.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Storage::Owned(vec![0u8; capacity].into_boxed_slice()),
            start: 0,
            end: 0,
        }
    }

    /// An owned buffer whose active range covers all of `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let end = data.len();
        Self {
            storage: Storage::Owned(data.into_boxed_slice()),
            start: 0,
            end,
        }
    }
}

impl<'a> ByteBuffer<'a> {
    /// Borrows `data` read-only; the active range covers all of it.
    ///
    /// Such a buffer can only back input streams.
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self {
            storage: Storage::Shared(data),
            start: 0,
            end: data.len(),
        }
    }

    /// Borrows `data` as a sink; the active range starts out empty, so the
    /// slice is only written into. Its previous contents are never read.
    pub fn from_mut_slice(data: &'a mut [u8]) -> Self {
        Self {
            storage: Storage::Exclusive(data),
            start: 0,
            end: 0,
        }
    }

    /// Borrows `data` writably with its first `len` bytes as the active
    /// range, so existing contents can be read back (In / InOut streams) and
    /// later `put`s overwrite them in place.
    ///
    /// # Panics
    /// If `len > data.len()`.
    pub fn from_mut_slice_filled(data: &'a mut [u8], len: usize) -> Self {
        assert!(len <= data.len(), "filled length exceeds slice length");
        Self {
            storage: Storage::Exclusive(data),
            start: 0,
            end: len,
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Whether the bytes are owned (and freed with the buffer).
    pub fn owns_memory(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Whether `put` may write into the storage.
    pub fn is_writable(&self) -> bool {
        !matches!(self.storage, Storage::Shared(_))
    }

    /// The active range as `(start, end)`.
    pub fn range(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of bytes in the active range.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns the byte at `start` and advances past it, or `None` when the
    /// active range is empty.
    pub fn get(&mut self) -> Option<u8> {
        self.check();
        if self.start == self.end {
            return None;
        }
        let b = self.storage.as_slice()[self.start];
        self.start += 1;
        Some(b)
    }

    /// Writes `b` at `start` and advances, extending `end` when the cursor
    /// moves past it. Returns `false` when the buffer is full; the caller must
    /// drain it before retrying.
    ///
    /// # Panics
    /// If the storage is a read-only borrow.
    pub fn put(&mut self, b: u8) -> bool {
        self.check();
        let pos = self.start;
        let Some(data) = self.storage.as_mut_slice() else {
            panic!("ByteBuffer::put on read-only storage");
        };
        if pos >= data.len() {
            return false;
        }
        data[pos] = b;
        self.start = pos + 1;
        if self.end < self.start {
            self.end = self.start;
        }
        true
    }

    /// The bytes of the active range.
    pub fn active(&self) -> &[u8] {
        &self.storage.as_slice()[self.start..self.end]
    }

    /// Everything from the beginning of the storage up to `end`; for a sink
    /// this is what has been written so far.
    pub fn filled(&self) -> &[u8] {
        &self.storage.as_slice()[..self.end]
    }

    /// Advances `start` by `n` bytes of the active range.
    pub(crate) fn consume(&mut self, n: usize) {
        assert!(n <= self.len(), "consume past end of active range");
        self.start += n;
    }

    /// Moves `start` back to the beginning, turning a write cursor into the
    /// start of the range to drain.
    pub(crate) fn rewind(&mut self) {
        self.start = 0;
    }

    /// Empties the active range.
    pub(crate) fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// The whole storage, for reading into.
    ///
    /// # Panics
    /// If the storage is a read-only borrow.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        match self.storage.as_mut_slice() {
            Some(data) => data,
            None => panic!("ByteBuffer::spare_mut on read-only storage"),
        }
    }

    /// Marks the first `n` bytes of the storage as the active range.
    pub(crate) fn set_filled(&mut self, n: usize) {
        assert!(n <= self.capacity(), "filled past capacity");
        self.start = 0;
        self.end = n;
    }

    fn check(&self) {
        debug_assert!(self.start <= self.end, "ByteBuffer: start > end");
        debug_assert!(self.end <= self.capacity(), "ByteBuffer: end > capacity");
    }
}

impl Default for ByteBuffer<'static> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl std::fmt::Debug for ByteBuffer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("capacity", &self.capacity())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("owns_memory", &self.owns_memory())
            .finish()
    }
}
