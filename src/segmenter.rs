//! Re-segmentation of arbitrarily chunked text into lines.
//!
//! The segmenter folds over text chunks carrying a *remainder*: the tail of
//! the text seen so far that has not been terminated yet. Each step appends
//! the new chunk to the remainder, splits on `\n` (dropping one `\r` right
//! before it), emits every complete piece and keeps the last piece as the new
//! remainder. A lone `\r` is ordinary text.
//!
//! At end of input one synthetic `"\n"` is pushed, so the remainder is always
//! flushed as a final line. That line is empty when the text already ended
//! with a terminator, and for empty input:
//!
//! | input      | lines              |
//! |------------|--------------------|
//! | `"a\nb"`   | `["a", "b"]`       |
//! | `"a\nb\n"` | `["a", "b", ""]`   |
//! | `""`       | `[""]`             |
//! | `"a\rb\n"` | `["a\rb", ""]`     |
//!
//! Concatenating the emitted lines (with their terminators), the remainder,
//! and the unprocessed input always gives back the original text.

use crate::error::Result;
use crate::pipeline::ChunkTransform;
use std::collections::VecDeque;

/// Pushed after the last real chunk to flush the remainder.
pub const SYNTHETIC_TERMINATOR: &str = "\n";

/// Incremental line splitter owning the remainder of one stream.
#[derive(Debug, Default, Clone)]
pub struct LineSegmenter {
    remainder: String,
    /// Length of the remainder prefix known to hold no `\n`
    scanned: usize,
}

impl LineSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a remainder left by an earlier step.
    ///
    /// Any terminator inside `remainder` is honoured on the next push.
    pub fn with_remainder(remainder: impl Into<String>) -> Self {
        Self {
            remainder: remainder.into(),
            scanned: 0,
        }
    }

    /// Text held back because it is not terminated yet.
    pub fn remainder(&self) -> &str {
        &self.remainder
    }

    pub fn into_remainder(self) -> String {
        self.remainder
    }

    /// Feed one chunk and return the lines it completes.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        let mut lines = Vec::new();
        self.push_into(chunk, &mut lines);
        lines
    }

    /// End of input: flush the remainder as the final line.
    pub fn finish(mut self) -> String {
        self.push(SYNTHETIC_TERMINATOR).pop().unwrap_or_default()
    }

    fn push_into<E: Extend<String>>(&mut self, chunk: &str, out: &mut E) {
        // Only text not scanned by an earlier push can hold a terminator
        let scan_from = self.scanned;
        self.remainder.push_str(chunk);

        let mut start = 0;
        for offset in memchr::memchr_iter(b'\n', &self.remainder.as_bytes()[scan_from..]) {
            let end = scan_from + offset;
            let line = &self.remainder[start..end];
            let line = line.strip_suffix('\r').unwrap_or(line);
            out.extend(std::iter::once(line.to_string()));
            start = end + 1;
        }

        if start > 0 {
            self.remainder.drain(..start);
        }
        self.scanned = self.remainder.len();
    }
}

impl ChunkTransform for LineSegmenter {
    type Input = String;
    type Output = String;

    fn on_chunk(&mut self, chunk: String, out: &mut VecDeque<String>) -> Result<()> {
        self.push_into(&chunk, out);
        Ok(())
    }

    fn on_complete(&mut self, out: &mut VecDeque<String>) -> Result<()> {
        self.push_into(SYNTHETIC_TERMINATOR, out);
        Ok(())
    }
}

/// Fold state: the lines completed by the latest step and the carried remainder.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Accumulator {
    pub lines: Vec<String>,
    pub remainder: String,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one chunk. The previous step's lines are not carried over.
    pub fn step(self, chunk: &str) -> Self {
        let mut segmenter = LineSegmenter::with_remainder(self.remainder);
        let lines = segmenter.push(chunk);
        Self {
            lines,
            remainder: segmenter.into_remainder(),
        }
    }
}

/// Split an in-memory sequence of chunks, including the final flush.
pub fn segment_chunks<I, S>(chunks: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = LineSegmenter::new();
    let mut lines = Vec::new();
    for chunk in chunks {
        segmenter.push_into(chunk.as_ref(), &mut lines);
    }
    lines.push(segmenter.finish());
    lines
}
