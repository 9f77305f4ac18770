//! Reader configuration.
//!
//! [`ReaderConfig`] is passed explicitly to every entry point. With the
//! `config` feature enabled it can also be loaded from a TOML file:
//!
//! ```toml
//! encoding = "windows-1252"
//! chunk_size = 65536
//! strict_decoding = false
//! ```

use crate::error::{Result, TextLinesError};
#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

/// Encoding used when the caller does not name one.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Read size for the chunk source (64KB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Options shared by all line-reading entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ReaderConfig {
    /// Encoding label, resolved by the decode stage (WHATWG label rules)
    pub encoding: String,
    /// Maximum size of each raw chunk read from disk
    pub chunk_size: usize,
    /// Fail on malformed input instead of substituting U+FFFD
    pub strict_decoding: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            strict_decoding: false,
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_strict_decoding(mut self, strict: bool) -> Self {
        self.strict_decoding = strict;
        self
    }

    /// Check values the pipeline cannot work with.
    ///
    /// The encoding label is deliberately not checked here; an unknown label
    /// is reported by the decode stage when the stream is first polled.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(TextLinesError::invalid_argument(
                "chunk_size must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(feature = "config")]
impl ReaderConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| TextLinesError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TextLinesError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// `<config dir>/textlines/config.toml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("textlines").join("config.toml"))
    }

    /// Load the file at [`ReaderConfig::default_path`], or the defaults if there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}
