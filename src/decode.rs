//! Strict UTF-8 decoding on top of a [`BufferedStream`].
//!
//! The decoder pulls one byte at a time and validates the sequence shape:
//! the start byte decides the length (1 to 4 bytes), every following byte
//! must be a continuation byte (`10xxxxxx`), and the result must not exceed
//! U+10FFFF. Surrogates and overlong forms are not rejected.

use crate::error::{Error, Result};
use crate::stream::BufferedStream;
use crate::traits::Descriptor;

/// A Unicode scalar value in `0..=0x10FFFF` as produced by the decoder.
pub type Codepoint = u32;

/// The largest value the decoder accepts.
pub const MAX_CODEPOINT: Codepoint = 0x10_FFFF;

/// Decodes the next codepoint from `stream`.
///
/// # Returns
/// * `Ok(Some(cp))` - A codepoint was decoded
/// * `Ok(None)` - Clean end of input between characters (stable on repeat)
/// * `Err(e)` - A stream error, or one of the decode errors
///   ([`Error::is_decode`]); the offending bytes have been consumed
pub fn next_codepoint<D: Descriptor>(stream: &mut BufferedStream<'_, D>) -> Result<Option<Codepoint>> {
    let Some(first) = stream.getc()? else {
        return Ok(None);
    };
    let (len, mut codepoint) = match first {
        b if b & 0b1000_0000 == 0 => return Ok(Some(Codepoint::from(b))),
        b if b & 0b1110_0000 == 0b1100_0000 => (2, Codepoint::from(b & 0b0001_1111)),
        b if b & 0b1111_0000 == 0b1110_0000 => (3, Codepoint::from(b & 0b0000_1111)),
        b if b & 0b1111_1000 == 0b1111_0000 => (4, Codepoint::from(b & 0b0000_0111)),
        byte => return Err(Error::InvalidStartByte { byte }),
    };
    for index in 2..=len {
        let Some(b) = stream.getc()? else {
            return Err(Error::PrematureEof { index });
        };
        if b & 0b1100_0000 != 0b1000_0000 {
            return Err(Error::InvalidContinuationByte { index });
        }
        codepoint = (codepoint << 6) | Codepoint::from(b & 0b0011_1111);
    }
    if codepoint > MAX_CODEPOINT {
        return Err(Error::CodepointOutOfRange { value: codepoint });
    }
    Ok(Some(codepoint))
}

/// Returns an iterator over the codepoints of `stream`.
pub fn codepoints<'s, 'a, D: Descriptor>(stream: &'s mut BufferedStream<'a, D>) -> Codepoints<'s, 'a, D> {
    Codepoints { stream }
}

/// An iterator over the codepoints of a stream, yielding
/// `Result<Codepoint>`.
///
/// It borrows the stream mutably; the stream's byte position and
/// `consumed()` count stay observable between calls through
/// [`Codepoints::stream`]. A decode error consumes the offending bytes, so
/// iteration may continue past it. End of input is stable: once `None` is
/// returned, every later call returns `None` too.
pub struct Codepoints<'s, 'a, D: Descriptor> {
    stream: &'s mut BufferedStream<'a, D>,
}

impl<'s, 'a, D: Descriptor> Codepoints<'s, 'a, D> {
    pub fn stream(&self) -> &BufferedStream<'a, D> {
        &*self.stream
    }

    /// Feeds every remaining codepoint to `processor`, stopping at end of
    /// input or at the first error (from decoding or from the closure).
    pub fn process_all<F>(&mut self, mut processor: F) -> Result<()>
    where
        F: FnMut(Codepoint) -> Result<()>,
    {
        while let Some(cp) = next_codepoint(self.stream)? {
            processor(cp)?;
        }
        Ok(())
    }
}

impl<D: Descriptor> Iterator for Codepoints<'_, '_, D> {
    type Item = Result<Codepoint>;

    /// See [`next_codepoint`].
    fn next(&mut self) -> Option<Self::Item> {
        next_codepoint(self.stream).transpose()
    }
}

impl<D: Descriptor> std::iter::FusedIterator for Codepoints<'_, '_, D> {}
