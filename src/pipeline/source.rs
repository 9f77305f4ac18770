//! Raw byte chunk source for a file path.
//!
//! The file is opened lazily when the stream is first polled, so a missing or
//! unreadable file surfaces as the stream's single failure rather than as an
//! error from the call that built the pipeline.

use crate::error::{into_stage_error, TextLinesError};
use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::io;
use std::path::PathBuf;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Byte chunks flowing between the byte-level stages.
///
/// Failures are `io::Error`s carrying a tagged [`TextLinesError`]; see
/// [`crate::error`] for why.
pub type ByteChunks = BoxStream<'static, io::Result<Bytes>>;

/// Open `path` as a lazy stream of chunks of at most `chunk_size` bytes.
pub fn open_chunk_source(path: impl Into<PathBuf>, chunk_size: usize) -> ByteChunks {
    let path = path.into();
    let read_path = path.clone();

    stream::once(async move {
        log::debug!("opening {}", path.display());
        File::open(&path)
            .await
            .map_err(|e| into_stage_error(TextLinesError::from_io(&path, e)))
    })
    .map_ok(move |file| {
        let path = read_path.clone();
        ReaderStream::with_capacity(file, chunk_size)
            .map_err(move |e| into_stage_error(TextLinesError::from_io(&path, e)))
    })
    .try_flatten()
    .boxed()
}
