//! Unified item-or-terminal-event view over a pipeline.
//!
//! Every stream handed to callers goes through [`Terminating`], which enforces
//! the terminal contract: items pass through until the first failure or the
//! end of input, exactly one of those is observed, and nothing follows it.
//! Reaching the terminal event drops the whole upstream chain at once, closing
//! the file and releasing decoder state without waiting for the caller to drop
//! the stream.

use crate::config::ReaderConfig;
use crate::error::{Result, TextLinesError};
use crate::pipeline::build_text_chain;
use futures::stream::{self, BoxStream, FusedStream, Stream, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

/// One observation of a pipeline.
#[derive(Debug)]
pub enum StreamEvent<T> {
    Item(T),
    Complete,
    Failure(TextLinesError),
}

impl<T> StreamEvent<T> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Item(_))
    }
}

impl<T> From<Option<Result<T>>> for StreamEvent<T> {
    fn from(next: Option<Result<T>>) -> Self {
        match next {
            Some(Ok(item)) => Self::Item(item),
            Some(Err(err)) => Self::Failure(err),
            None => Self::Complete,
        }
    }
}

/// Stream wrapper that ends for good after its first terminal event.
pub struct Terminating<T> {
    inner: Option<BoxStream<'static, Result<T>>>,
    label: &'static str,
    delivered: u64,
}

impl<T: 'static> Terminating<T> {
    pub(crate) fn new(inner: BoxStream<'static, Result<T>>, label: &'static str) -> Self {
        Self {
            inner: Some(inner),
            label,
            delivered: 0,
        }
    }

    /// A stream whose only event is `err`.
    pub(crate) fn failed(err: TextLinesError, label: &'static str) -> Self
    where
        T: Send,
    {
        Self::new(stream::once(async move { Err(err) }).boxed(), label)
    }

    /// Number of items delivered so far
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Next event, or `None` once the terminal event has been delivered.
    pub async fn next_event(&mut self) -> Option<StreamEvent<T>> {
        if self.inner.is_none() {
            return None;
        }
        Some(self.next().await.into())
    }
}

impl<T> Stream for Terminating<T> {
    type Item = Result<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };

        match inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(item))) => {
                this.delivered += 1;
                Poll::Ready(Some(Ok(item)))
            }
            Poll::Ready(Some(Err(err))) => {
                this.inner = None;
                log::debug!("{} failed after {} items: {}", this.label, this.delivered, err);
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.inner = None;
                log::trace!("{} complete after {} items", this.label, this.delivered);
                Poll::Ready(None)
            }
        }
    }
}

impl<T> FusedStream for Terminating<T> {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}

/// Decoded text chunks of a file, in order, with arbitrary boundaries.
pub struct TextStream(Terminating<String>);

impl TextStream {
    pub fn new(chunks: BoxStream<'static, Result<String>>) -> Self {
        Self(Terminating::new(chunks, "text stream"))
    }

    pub async fn next_event(&mut self) -> Option<StreamEvent<String>> {
        self.0.next_event().await
    }
}

impl Stream for TextStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.poll_next_unpin(cx)
    }
}

impl FusedStream for TextStream {
    fn is_terminated(&self) -> bool {
        self.0.is_terminated()
    }
}

/// Open `path` and stream its decoded text, decompressing `.gz` files.
///
/// Nothing is read until the stream is polled. Open, decompression and
/// decode failures all arrive as the stream's single `Err` item.
pub fn text_file_stream(path: impl AsRef<Path>, config: &ReaderConfig) -> TextStream {
    if let Err(err) = config.validate() {
        return TextStream(Terminating::failed(err, "text stream"));
    }
    TextStream::new(build_text_chain(path.as_ref(), config))
}
