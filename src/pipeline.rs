//! Byte-to-text transform chain.
//!
//! `path -> chunk source -> [gunzip] -> decode(encoding) -> text chunks`
//!
//! Each call builds a private chain; nothing is shared between invocations.

pub mod decode;
pub mod source;
pub mod transform;

pub use decode::{decode_text, CharsetDecoder, TextChunks};
pub use source::{open_chunk_source, ByteChunks};
pub use transform::{decompress, detect_compression, ChunkTransform, CompressionType, Transformed};

use crate::config::ReaderConfig;
use std::path::Path;

/// Build the full chain for `path`.
pub fn build_text_chain(path: &Path, config: &ReaderConfig) -> TextChunks {
    let compression = detect_compression(path);
    log::debug!(
        "building chain for {} (compression: {}, encoding: {})",
        path.display(),
        compression.name(),
        config.encoding
    );

    let raw = open_chunk_source(path, config.chunk_size);
    let bytes = decompress(raw, compression, config.chunk_size);
    decode_text(bytes, &config.encoding, config.strict_decoding)
}
