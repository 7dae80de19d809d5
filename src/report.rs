//! Line-ending accounting over a decoded codepoint stream.
//!
//! [`report`] decodes a stream to the end and classifies every line break
//! as LF, CR or CRLF. A CR is only counted once the following codepoint
//! shows whether it started a CRLF pair.

use crate::decode::{next_codepoint, Codepoint};
use crate::stream::BufferedStream;
use crate::traits::Descriptor;
use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

const CR: Codepoint = 0x0D;
const LF: Codepoint = 0x0A;

/// Character and line-ending totals.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LineCounts {
    #[cfg_attr(feature = "serde", serde(rename = "charcount"))]
    pub chars: u64,
    #[cfg_attr(feature = "serde", serde(rename = "LFcount"))]
    pub lf: u64,
    #[cfg_attr(feature = "serde", serde(rename = "CRcount"))]
    pub cr: u64,
    #[cfg_attr(feature = "serde", serde(rename = "CRLFcount"))]
    pub crlf: u64,
}

impl LineCounts {
    /// Line breaks of any kind.
    pub fn lines(&self) -> u64 {
        self.lf + self.cr + self.crlf
    }

    /// Whether more than one kind of line ending occurs.
    pub fn is_mixed(&self) -> bool {
        self.lines() != self.lf.max(self.cr).max(self.crlf)
    }
}

/// Incremental CR/LF classifier.
#[derive(Debug, Default, Clone)]
pub struct LineCounter {
    counts: LineCounts,
    column: u64,
    pending_cr: bool,
}

impl LineCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, cp: Codepoint) {
        self.counts.chars += 1;
        match cp {
            CR => {
                if self.pending_cr {
                    self.counts.cr += 1;
                }
                self.pending_cr = true;
                self.column = 0;
            }
            LF => {
                if self.pending_cr {
                    self.counts.crlf += 1;
                } else {
                    self.counts.lf += 1;
                }
                self.pending_cr = false;
                self.column = 0;
            }
            _ => {
                if self.pending_cr {
                    self.counts.cr += 1;
                }
                self.pending_cr = false;
                self.column += 1;
            }
        }
    }

    /// Totals so far; a trailing CR is not counted yet.
    pub fn counts(&self) -> LineCounts {
        self.counts
    }

    /// Characters since the last line break.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// True when the current line number cannot be trusted: line endings
    /// are mixed, or a CR is still waiting for its successor.
    pub fn is_questionable(&self) -> bool {
        self.pending_cr || self.counts.is_mixed()
    }

    /// Final totals at end of input.
    pub fn finish(mut self) -> LineCounts {
        if self.pending_cr {
            self.counts.cr += 1;
            self.pending_cr = false;
        }
        self.counts
    }
}

/// Where and why decoding stopped. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Failure {
    #[cfg_attr(feature = "serde", serde(rename = "failure"))]
    pub message: String,
    /// First byte of the character that failed.
    pub byte_position: u64,
    pub character_position: u64,
    pub line: u64,
    pub column: u64,
    pub line_questionable: bool,
}

/// Outcome of [`report`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Report {
    #[cfg_attr(feature = "serde", serde(rename = "linecount"))]
    Completed(LineCounts),
    #[cfg_attr(feature = "serde", serde(rename = "utf-8-failure"))]
    Failed(Failure),
}

impl Report {
    pub fn is_failure(&self) -> bool {
        matches!(self, Report::Failed(_))
    }

    /// One-line JSON rendering.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Completed(c) => write!(
                f,
                "{} characters, {} LF, {} CR, {} CRLF line endings",
                c.chars, c.lf, c.cr, c.crlf
            ),
            Report::Failed(e) => {
                write!(
                    f,
                    "{} at byte {}, character {}, line {}, column {}",
                    e.message, e.byte_position, e.character_position, e.line, e.column
                )?;
                if e.line_questionable {
                    f.write_str(" (line count questionable)")?;
                }
                Ok(())
            }
        }
    }
}

/// Decodes `stream` to the end, counting characters and line endings.
///
/// The first decode or I/O error ends the run and is described with its
/// position; the stream is left open either way.
pub fn report<D: Descriptor>(stream: &mut BufferedStream<'_, D>) -> Report {
    let mut counter = LineCounter::new();
    loop {
        let char_start = stream.consumed();
        match next_codepoint(stream) {
            Ok(Some(cp)) => counter.observe(cp),
            Ok(None) => return Report::Completed(counter.finish()),
            Err(err) => {
                let counts = counter.counts();
                return Report::Failed(Failure {
                    message: err.to_string(),
                    byte_position: char_start + 1,
                    character_position: counts.chars + 1,
                    line: counts.lines() + 1,
                    column: counter.column() + 1,
                    line_questionable: counter.is_questionable(),
                });
            }
        }
    }
}
