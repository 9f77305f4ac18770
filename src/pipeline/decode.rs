//! Charset decoding stage.
//!
//! Byte chunks are decoded incrementally with `encoding_rs`, so a multi-byte
//! sequence split across two chunks decodes correctly. A leading byte-order
//! mark is removed only when it belongs to the declared encoding; it never
//! switches the encoding.

use crate::error::{from_stage_error, Result, TextLinesError};
use crate::pipeline::source::ByteChunks;
use crate::pipeline::transform::{ChunkTransform, Transformed};
use bytes::Bytes;
use encoding_rs::{CoderResult, Decoder, DecoderResult, Encoding};
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use std::collections::VecDeque;

/// Decoded text chunks.
pub type TextChunks = BoxStream<'static, Result<String>>;

/// Incremental decoder for one stream.
pub struct CharsetDecoder {
    decoder: Decoder,
    strict: bool,
    /// Bytes consumed so far, for error positions
    consumed: u64,
}

impl CharsetDecoder {
    /// Resolve `label` (WHATWG rules: case-insensitive, aliases like `latin1`).
    pub fn new(label: &str, strict: bool) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| TextLinesError::unknown_encoding(label))?;
        Ok(Self {
            decoder: encoding.new_decoder_with_bom_removal(),
            strict,
            consumed: 0,
        })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.decoder.encoding()
    }

    /// Decode one chunk; `last` flushes any partial sequence held back.
    pub fn decode(&mut self, src: &[u8], last: bool) -> Result<String> {
        let (text, status) = self.decode_chunk(src, last);
        status.map(|()| text)
    }

    /// Decode as much of `src` as possible. On a failure the text decoded
    /// ahead of the offending bytes is still returned.
    fn decode_chunk(&mut self, src: &[u8], last: bool) -> (String, Result<()>) {
        if self.strict {
            self.decode_strict(src, last)
        } else {
            self.decode_lossy(src, last)
        }
    }

    fn decode_lossy(&mut self, src: &[u8], last: bool) -> (String, Result<()>) {
        let Some(capacity) = self.decoder.max_utf8_buffer_length(src.len()) else {
            return (String::new(), Err(self.error("chunk too large to decode")));
        };
        let mut text = String::with_capacity(capacity);

        let (result, read, _replaced) = self.decoder.decode_to_string(src, &mut text, last);
        self.consumed += read as u64;
        let status = match result {
            CoderResult::InputEmpty => Ok(()),
            CoderResult::OutputFull => Err(self.error("decode buffer overflow")),
        };
        (text, status)
    }

    fn decode_strict(&mut self, src: &[u8], last: bool) -> (String, Result<()>) {
        let Some(capacity) = self
            .decoder
            .max_utf8_buffer_length_without_replacement(src.len())
        else {
            return (String::new(), Err(self.error("chunk too large to decode")));
        };
        let mut text = String::with_capacity(capacity);

        let (result, read) = self
            .decoder
            .decode_to_string_without_replacement(src, &mut text, last);
        self.consumed += read as u64;
        let status = match result {
            DecoderResult::InputEmpty => Ok(()),
            DecoderResult::Malformed(length, after) => {
                let offset = self
                    .consumed
                    .saturating_sub(u64::from(length) + u64::from(after));
                Err(self.error(format!(
                    "malformed {length}-byte sequence at byte {offset}"
                )))
            }
            DecoderResult::OutputFull => Err(self.error("decode buffer overflow")),
        };
        (text, status)
    }

    fn error(&self, message: impl Into<String>) -> TextLinesError {
        TextLinesError::decode(self.encoding().name(), message)
    }
}

impl ChunkTransform for CharsetDecoder {
    type Input = Bytes;
    type Output = String;

    fn on_chunk(&mut self, chunk: Bytes, out: &mut VecDeque<String>) -> Result<()> {
        let (text, status) = self.decode_chunk(&chunk, false);
        if !text.is_empty() {
            out.push_back(text);
        }
        status
    }

    fn on_complete(&mut self, out: &mut VecDeque<String>) -> Result<()> {
        let (text, status) = self.decode_chunk(&[], true);
        if !text.is_empty() {
            out.push_back(text);
        }
        status
    }
}

/// Decode byte chunks as `encoding`.
///
/// An unknown label fails the stream on first poll; the upstream is dropped
/// without ever being polled, so the file is never opened.
pub fn decode_text(chunks: ByteChunks, encoding: &str, strict: bool) -> TextChunks {
    match CharsetDecoder::new(encoding, strict) {
        Ok(decoder) => {
            log::debug!(
                "decoding as {} (strict: {})",
                decoder.encoding().name(),
                strict
            );
            let upstream = chunks
                .map_err(|e| from_stage_error(e, TextLinesError::from))
                .boxed();
            Transformed::new(upstream, decoder).boxed()
        }
        Err(err) => stream::once(async move { Err(err) }).boxed(),
    }
}
