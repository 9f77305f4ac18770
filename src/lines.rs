//! Line-producing entry points.
//!
//! [`read_lines`] is the canonical reader: decoded text chunks go through the
//! [`LineSegmenter`], so the last line follows the synthetic-terminator rule
//! (a file ending in a newline yields a trailing `""`).
//!
//! [`read_lines_buffered`] gets the same lines out of tokio's buffered
//! `lines()` reader instead, and reconstructs the trailing `""` by watching
//! the last raw text chunk. It differs from [`read_lines`] in two places:
//! an empty file yields no lines at all, and a final `\r` with no `\n` after
//! it stays on the last line.

use crate::config::ReaderConfig;
use crate::error::{from_stage_error, into_stage_error, Result, TextLinesError};
use crate::pipeline::Transformed;
use crate::segmenter::LineSegmenter;
use crate::text_stream::{text_file_stream, StreamEvent, Terminating};
use bytes::Bytes;
use futures::future;
use futures::stream::{self, BoxStream, FusedStream, Stream, StreamExt, TryStreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::AsyncBufReadExt;
use tokio_stream::wrappers::LinesStream;
use tokio_util::io::StreamReader;

/// Lines of a text source, without terminators, in source order.
///
/// Yields `Ok` lines followed by either the end of the stream or one `Err`.
/// Dropping the stream tears down the whole chain behind it.
pub struct LineStream(Terminating<String>);

impl LineStream {
    fn new(lines: BoxStream<'static, Result<String>>) -> Self {
        Self(Terminating::new(lines, "line stream"))
    }

    pub async fn next_event(&mut self) -> Option<StreamEvent<String>> {
        self.0.next_event().await
    }

    /// Number of lines delivered so far
    pub fn lines_read(&self) -> u64 {
        self.0.delivered()
    }
}

impl Stream for LineStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.poll_next_unpin(cx)
    }
}

impl FusedStream for LineStream {
    fn is_terminated(&self) -> bool {
        self.0.is_terminated()
    }
}

/// Read `path` line by line.
///
/// `.gz` files are decompressed and the bytes decoded with
/// `config.encoding`. The last line is always flushed: a file ending in a
/// newline yields a final empty line, an empty file yields one empty line.
pub fn read_lines(path: impl AsRef<Path>, config: &ReaderConfig) -> LineStream {
    strings_to_lines(text_file_stream(path, config))
}

/// Re-segment any stream of text chunks into lines.
///
/// A failure from `strings` ends the line stream after the lines completed
/// before it; the unterminated remainder is dropped, not flushed.
pub fn strings_to_lines<S>(strings: S) -> LineStream
where
    S: Stream<Item = Result<String>> + Send + 'static,
{
    LineStream::new(Transformed::new(strings.boxed(), LineSegmenter::new()).boxed())
}

/// Read `path` line by line through tokio's buffered line reader.
pub fn read_lines_buffered(path: impl AsRef<Path>, config: &ReaderConfig) -> LineStream {
    buffered_lines(text_file_stream(path, config))
}

/// Split `strings` with `AsyncBufReadExt::lines`, restoring the trailing
/// empty line the buffered reader swallows.
pub fn buffered_lines<S>(strings: S) -> LineStream
where
    S: Stream<Item = Result<String>> + Send + 'static,
{
    let ended_with_newline = Arc::new(AtomicBool::new(false));
    let tail_flag = Arc::clone(&ended_with_newline);

    let bytes: BoxStream<'static, std::io::Result<Bytes>> = strings
        .inspect_ok(move |chunk| {
            if !chunk.is_empty() {
                tail_flag.store(chunk.ends_with('\n'), Ordering::Relaxed);
            }
        })
        .map_ok(Bytes::from)
        .map_err(into_stage_error)
        .boxed();

    let lines = LinesStream::new(StreamReader::new(bytes).lines())
        .map_err(|e| from_stage_error(e, TextLinesError::from));

    // Only reached after a clean end; a failure terminates the stream first
    let trailing = stream::once(future::lazy(move |_| {
        ended_with_newline.load(Ordering::Relaxed)
    }))
    .filter_map(|ended| future::ready(ended.then(|| Ok(String::new()))));

    LineStream::new(lines.chain(trailing).boxed())
}
