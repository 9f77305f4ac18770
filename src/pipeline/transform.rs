//! Stage plumbing and transparent decompression for the transform chain.
//!
//! A stage is anything implementing [`ChunkTransform`]: it sees each upstream
//! chunk, then the upstream completion, and pushes zero or more items
//! downstream in response. [`Transformed`] drives a stage over an upstream
//! stream and guarantees a single terminal event.
//!
//! Decompression is the exception: `async-compression` works on readers, so
//! the gzip stage bridges the byte stream into a reader and back out again.

use crate::error::{from_stage_error, into_stage_error, Result, TextLinesError};
use crate::pipeline::source::ByteChunks;
use async_compression::tokio::bufread::GzipDecoder;
use futures::stream::{BoxStream, FusedStream, Stream, StreamExt, TryStreamExt};
use std::collections::VecDeque;
use std::path::Path;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio_util::io::{ReaderStream, StreamReader};

/// One step of the pipeline.
pub trait ChunkTransform {
    type Input;
    type Output;

    /// Handle one upstream chunk, pushing any complete outputs onto `out`.
    fn on_chunk(&mut self, chunk: Self::Input, out: &mut VecDeque<Self::Output>) -> Result<()>;

    /// Handle upstream completion, flushing anything still held back.
    fn on_complete(&mut self, out: &mut VecDeque<Self::Output>) -> Result<()>;
}

/// A [`ChunkTransform`] applied to an upstream stream.
///
/// Ends after the first failure (its own or upstream's), dropping the
/// upstream at that point. Outputs a stage pushed before failing are
/// delivered ahead of the failure.
pub struct Transformed<T: ChunkTransform> {
    upstream: Option<BoxStream<'static, Result<T::Input>>>,
    stage: T,
    pending: VecDeque<T::Output>,
    failure: Option<TextLinesError>,
}

impl<T: ChunkTransform> Transformed<T> {
    pub fn new(upstream: BoxStream<'static, Result<T::Input>>, stage: T) -> Self {
        Self {
            upstream: Some(upstream),
            stage,
            pending: VecDeque::new(),
            failure: None,
        }
    }

    fn fail(&mut self, err: TextLinesError) {
        self.upstream = None;
        self.failure = Some(err);
    }
}

impl<T> Stream for Transformed<T>
where
    T: ChunkTransform + Unpin,
    T::Output: Unpin,
{
    type Item = Result<T::Output>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(item) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }
            if let Some(err) = this.failure.take() {
                return Poll::Ready(Some(Err(err)));
            }

            let Some(upstream) = this.upstream.as_mut() else {
                return Poll::Ready(None);
            };

            let step = match ready!(upstream.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => this.stage.on_chunk(chunk, &mut this.pending),
                Some(Err(err)) => Err(err),
                None => {
                    this.upstream = None;
                    this.stage.on_complete(&mut this.pending)
                }
            };

            if let Err(err) = step {
                this.fail(err);
            }
        }
    }
}

impl<T> FusedStream for Transformed<T>
where
    T: ChunkTransform + Unpin,
    T::Output: Unpin,
{
    fn is_terminated(&self) -> bool {
        self.upstream.is_none() && self.pending.is_empty() && self.failure.is_none()
    }
}

/// Supported compression formats for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    /// No compression - plain text file
    None,
    /// Gzip compression (.gz files)
    Gzip,
}

impl CompressionType {
    /// Get human-readable name for the compression type
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
        }
    }

    /// Check if this type represents a compressed format
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Detect compression from the file name alone.
///
/// A name ending in `.gz` (any case) is treated as gzip. Content is never
/// sniffed: a `.gz` file holding plain text fails in the decompression stage.
pub fn detect_compression(path: &Path) -> CompressionType {
    let name = path
        .file_name()
        .map(|name| name.as_encoded_bytes())
        .unwrap_or_default();
    if name.len() >= 3 && name[name.len() - 3..].eq_ignore_ascii_case(b".gz") {
        CompressionType::Gzip
    } else {
        CompressionType::None
    }
}

/// Insert the decompression stage for `compression`, if any.
pub fn decompress(chunks: ByteChunks, compression: CompressionType, chunk_size: usize) -> ByteChunks {
    match compression {
        CompressionType::None => chunks,
        CompressionType::Gzip => {
            let mut decoder = GzipDecoder::new(StreamReader::new(chunks));
            // Concatenated gzip members decode as one stream, like `zcat`
            decoder.multiple_members(true);

            ReaderStream::with_capacity(decoder, chunk_size)
                .map_err(|e| into_stage_error(from_stage_error(e, TextLinesError::compression)))
                .boxed()
        }
    }
}
