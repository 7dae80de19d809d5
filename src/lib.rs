//! # utf8stream
//!
//! Buffered byte streams over memory or POSIX file descriptors, with a strict
//! UTF-8 decoder and a line-ending reporter on top.
//!
//! ## Overview
//!
//! A [`BufferedStream`] hides where bytes come from (an in-memory
//! [`ByteBuffer`], or a file descriptor) behind byte-granular `getc` and
//! `putc`. File-backed streams stage I/O in a fixed buffer, retry interrupted
//! system calls, accumulate partial writes, and latch end-of-file and I/O
//! failures so that every later call reports the same outcome without
//! touching the OS again.
//!
//! [`next_codepoint`] reads one UTF-8 sequence at a time from a stream and
//! validates it: start byte, continuation bytes, premature end of input, and
//! the U+10FFFF upper bound.
//!
//! [`report`] drives the decoder over a whole stream and counts characters
//! and LF, CR and CRLF line endings; the `utf8-lineseparator` binary prints
//! the result.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use utf8stream::*;
//!
//! fn main() -> Result<()> {
//!     // Write through a file-backed stream
//!     let mut out = BufferedStream::open(
//!         "data.txt",
//!         OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::TRUNC,
//!         0o666,
//!     )?;
//!     for &b in "grüße\r\n".as_bytes() {
//!         out.putc(b)?;
//!     }
//!     out.close()?;
//!
//!     // Decode it again
//!     let mut input = BufferedStream::open_read("data.txt")?;
//!     while let Some(cp) = next_codepoint(&mut input)? {
//!         println!("U+{cp:04X}");
//!     }
//!     input.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! * **`ByteBuffer`**: fixed-capacity window with one cursor, owned or borrowed
//! * **`Descriptor`**: the system-call seam under file-backed streams
//!   ([`Fd`] in production, fault injectors in tests)
//! * **`BufferedStream`**: direction checks, buffering, retry, sticky state
//! * **`decode`**: the UTF-8 decoder
//! * **`report`**: line-ending accounting

pub mod buffer;
pub mod decode;
pub mod error;
pub mod fd;
pub mod report;
pub mod stream;
pub mod traits;

// Re-export the main public API for user convenience.
pub use buffer::ByteBuffer;
pub use decode::{codepoints, next_codepoint, Codepoint, Codepoints, MAX_CODEPOINT};
pub use error::{Error, IoFailure, Result};
pub use fd::Fd;
pub use report::{report, Failure, LineCounter, LineCounts, Report};
pub use stream::{
    quote_sh, BufferedStream, Direction, OpenFlags, StreamName, DEFAULT_BUFFER_SIZE,
};
pub use traits::Descriptor;
