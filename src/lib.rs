//! # textlines - Line-by-line reading of compressed, encoded text files
//!
//! Streams the lines of a text file without loading it into memory.
//! Decompression, charset decoding and line-boundary detection across chunk
//! boundaries are handled by the pipeline; callers only see lines.
//!
//! ## Features
//!
//! - **Lazy**: lines are produced as the consumer polls for them
//! - **Compression Support**: transparent gzip for `.gz` files (any case)
//! - **Any Encoding**: every WHATWG encoding label via `encoding_rs`
//! - **Boundary Safe**: `\r\n` and multi-byte characters split across
//!   chunks are reassembled
//! - **Single Terminal Event**: a stream ends with completion or one failure
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`config`] - Reader configuration
//! - [`pipeline`] - Chunk source, decompression and decode stages
//! - [`text_stream`] - Terminal-event contract over a pipeline
//! - [`segmenter`] - Remainder-carrying line splitter
//! - [`lines`] - Public line-reading entry points
//!
//! ## Example
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use textlines::{read_lines, ReaderConfig};
//!
//! # async fn run() -> textlines::Result<()> {
//! let config = ReaderConfig::default().with_encoding("latin1");
//! let mut lines = read_lines("words.txt.gz", &config);
//! while let Some(line) = lines.try_next().await? {
//!     println!("{line}");
//! }
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod error;

// Pipeline
pub mod lines;
pub mod pipeline;
pub mod segmenter;
pub mod text_stream;

// Re-export commonly used types for convenience
pub use config::{ReaderConfig, DEFAULT_ENCODING};
pub use error::{Result, TextLinesError};

// Public API surface for external usage
pub use lines::{buffered_lines, read_lines, read_lines_buffered, strings_to_lines, LineStream};
pub use pipeline::{detect_compression, CompressionType};
pub use segmenter::{segment_chunks, Accumulator, LineSegmenter};
pub use text_stream::{text_file_stream, StreamEvent, TextStream};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
