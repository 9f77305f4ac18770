//! textlines - print the lines of a (possibly gzipped) text file
//!
//! Mostly useful for checking how a file is split and decoded.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use futures::TryStreamExt;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use textlines::{read_lines, read_lines_buffered, ReaderConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG=debug shows how the chain is built)
    env_logger::init();

    let matches = Command::new("textlines")
        .version(textlines::VERSION)
        .about("Print the lines of a text file, decompressing and decoding as needed")
        .long_about(
            "textlines reads a file line by line without loading it into memory. \
             Files ending in .gz are decompressed, and the bytes are decoded with the \
             requested encoding (any WHATWG label, default utf-8).",
        )
        .arg(
            Arg::new("file")
                .help("Path to the text file to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("encoding")
                .short('e')
                .long("encoding")
                .help("Character encoding of the file (e.g. utf-8, latin1, shift_jis)"),
        )
        .arg(
            Arg::new("chunk-size")
                .long("chunk-size")
                .help("Bytes read from disk per chunk")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("strict")
                .long("strict")
                .help("Fail on malformed input instead of substituting U+FFFD")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("buffered")
                .long("buffered")
                .help("Split lines with the buffered line reader instead of the segmenter")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("number")
                .short('n')
                .long("number")
                .help("Prefix each line with its 1-based line number")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file (requires the `config` feature)")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let file_path = PathBuf::from(
        matches
            .get_one::<String>("file")
            .context("file argument is required")?,
    );

    let mut config = load_config(matches.get_one::<PathBuf>("config"))?;
    if let Some(encoding) = matches.get_one::<String>("encoding") {
        config = config.with_encoding(encoding.as_str());
    }
    if let Some(chunk_size) = matches.get_one::<usize>("chunk-size") {
        config = config.with_chunk_size(*chunk_size);
    }
    if matches.get_flag("strict") {
        config = config.with_strict_decoding(true);
    }
    config.validate()?;

    let mut lines = if matches.get_flag("buffered") {
        read_lines_buffered(&file_path, &config)
    } else {
        read_lines(&file_path, &config)
    };

    let number = matches.get_flag("number");
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut line_number: u64 = 0;

    while let Some(line) = lines
        .try_next()
        .await
        .with_context(|| format!("Failed reading {}", file_path.display()))?
    {
        line_number += 1;
        if number {
            writeln!(out, "{line_number:>6}\t{line}")?;
        } else {
            writeln!(out, "{line}")?;
        }
    }
    out.flush()?;

    Ok(())
}

#[cfg(feature = "config")]
fn load_config(path: Option<&PathBuf>) -> Result<ReaderConfig> {
    let config = match path {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::load_default()?,
    };
    Ok(config)
}

#[cfg(not(feature = "config"))]
fn load_config(path: Option<&PathBuf>) -> Result<ReaderConfig> {
    if path.is_some() {
        anyhow::bail!("--config requires textlines to be built with the `config` feature");
    }
    Ok(ReaderConfig::default())
}
