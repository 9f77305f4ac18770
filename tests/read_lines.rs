use flate2::{write::GzEncoder, Compression};
use futures::{StreamExt, TryStreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use textlines::{
    read_lines, read_lines_buffered, text_file_stream, ReaderConfig, StreamEvent, TextLinesError,
};

const SAMPLE: &str = "first line\r\nsecond line\n\nfourth line with caf\u{e9}\nlast line\n";

fn write_plain(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write contents");
    path
}

fn write_gzip(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).expect("create gzip file");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(contents).expect("compress contents");
    encoder.finish().expect("finish gzip stream");
    path
}

async fn collect_lines(path: &Path, config: &ReaderConfig) -> Vec<String> {
    read_lines(path, config)
        .try_collect()
        .await
        .expect("read lines")
}

#[tokio::test]
async fn plain_file_yields_lines_with_trailing_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "sample.txt", SAMPLE.as_bytes());

    let lines = collect_lines(&path, &ReaderConfig::default()).await;
    assert_eq!(
        lines,
        vec![
            "first line",
            "second line",
            "",
            "fourth line with caf\u{e9}",
            "last line",
            ""
        ]
    );
}

#[tokio::test]
async fn unterminated_file_has_no_trailing_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "sample.txt", b"a\nb");

    assert_eq!(collect_lines(&path, &ReaderConfig::default()).await, vec!["a", "b"]);
}

#[tokio::test]
async fn empty_file_yields_single_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "empty.txt", b"");

    assert_eq!(collect_lines(&path, &ReaderConfig::default()).await, vec![""]);
}

#[tokio::test]
async fn tiny_chunks_give_identical_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "sample.txt", SAMPLE.as_bytes());

    let expected = collect_lines(&path, &ReaderConfig::default()).await;
    for chunk_size in [1, 2, 3, 7] {
        let config = ReaderConfig::default().with_chunk_size(chunk_size);
        assert_eq!(
            collect_lines(&path, &config).await,
            expected,
            "chunk size {chunk_size}"
        );
    }
}

#[tokio::test]
async fn gzip_file_matches_uncompressed_counterpart() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write_plain(&dir, "dict.txt", SAMPLE.as_bytes());
    let compressed = write_gzip(&dir, "dict.txt.gz", SAMPLE.as_bytes());

    for chunk_size in [1, 5, 64 * 1024] {
        let config = ReaderConfig::default().with_chunk_size(chunk_size);
        assert_eq!(
            collect_lines(&compressed, &config).await,
            collect_lines(&plain, &config).await
        );
    }
}

#[tokio::test]
async fn gzip_suffix_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gzip(&dir, "WORDS.TXT.GZ", b"alpha\nbeta");

    assert_eq!(
        collect_lines(&path, &ReaderConfig::default()).await,
        vec!["alpha", "beta"]
    );
}

#[tokio::test]
async fn plain_text_with_gz_suffix_fails_decompression() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "fake.gz", b"this is not gzip data\n");

    let mut lines = read_lines(&path, &ReaderConfig::default());
    match lines.next_event().await {
        Some(StreamEvent::Failure(TextLinesError::CompressionError { .. })) => {}
        other => panic!("expected compression failure, got {other:?}"),
    }
    assert!(lines.next_event().await.is_none());
}

#[tokio::test]
async fn missing_file_is_a_single_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.txt");

    let results: Vec<_> = read_lines(&path, &ReaderConfig::default()).collect().await;
    assert_eq!(results.len(), 1);
    match &results[0] {
        Err(TextLinesError::FileNotFound { path: reported }) => assert_eq!(reported, &path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn latin1_file_is_decoded() {
    let dir = tempfile::tempdir().unwrap();
    // "café\nnaïve" in ISO-8859-1
    let path = write_plain(&dir, "latin1.txt", b"caf\xe9\nna\xefve");

    let config = ReaderConfig::default().with_encoding("iso-8859-1");
    assert_eq!(
        collect_lines(&path, &config).await,
        vec!["caf\u{e9}", "na\u{ef}ve"]
    );
}

#[tokio::test]
async fn utf16_file_split_mid_code_unit() {
    let dir = tempfile::tempdir().unwrap();
    let mut contents = vec![0xff, 0xfe]; // BOM
    for unit in "x\r\ny\n".encode_utf16() {
        contents.extend_from_slice(&unit.to_le_bytes());
    }
    let path = write_plain(&dir, "utf16.txt", &contents);

    let config = ReaderConfig::default()
        .with_encoding("utf-16le")
        .with_chunk_size(3);
    assert_eq!(collect_lines(&path, &config).await, vec!["x", "y", ""]);
}

#[tokio::test]
async fn unknown_encoding_fails_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "sample.txt", SAMPLE.as_bytes());

    let config = ReaderConfig::default().with_encoding("martian");
    let results: Vec<_> = read_lines(&path, &config).collect().await;
    assert_eq!(results.len(), 1);
    assert!(matches!(
        &results[0],
        Err(TextLinesError::UnknownEncoding { label }) if label == "martian"
    ));
}

#[tokio::test]
async fn strict_decoding_stops_at_malformed_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "broken.txt", b"good\nalso good\nbad \xff here\n");

    for chunk_size in [1, 3, 16, 64 * 1024] {
        let config = ReaderConfig::default()
            .with_strict_decoding(true)
            .with_chunk_size(chunk_size);
        let mut lines = read_lines(&path, &config);

        let mut seen = Vec::new();
        let mut failed = false;
        while let Some(event) = lines.next_event().await {
            match event {
                StreamEvent::Item(line) => seen.push(line),
                StreamEvent::Failure(err) => {
                    assert!(matches!(err, TextLinesError::DecodeError { .. }));
                    failed = true;
                }
                StreamEvent::Complete => panic!("strict decoding should have failed"),
            }
        }
        assert!(failed, "chunk size {chunk_size}");
        // Every line completed ahead of the malformed byte, whatever the chunking
        assert_eq!(seen, vec!["good", "also good"], "chunk size {chunk_size}");
    }
}

#[tokio::test]
async fn utf8_bom_is_text_in_a_single_byte_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "bom-latin1.txt", b"\xef\xbb\xbfcaf\xe9\n");

    let config = ReaderConfig::default().with_encoding("iso-8859-1");
    assert_eq!(
        collect_lines(&path, &config).await,
        vec!["\u{ef}\u{bb}\u{bf}caf\u{e9}", ""]
    );
}

#[tokio::test]
async fn mismatched_utf16_bom_keeps_declared_byte_order() {
    let dir = tempfile::tempdir().unwrap();
    // Big-endian mark, little-endian content
    let path = write_plain(&dir, "bom-utf16.txt", b"\xfe\xffh\x00i\x00\n\x00");

    for chunk_size in [1, 64 * 1024] {
        let config = ReaderConfig::default()
            .with_encoding("utf-16le")
            .with_chunk_size(chunk_size);
        assert_eq!(
            collect_lines(&path, &config).await,
            vec!["\u{fffe}hi", ""],
            "chunk size {chunk_size}"
        );
    }
}

#[tokio::test]
async fn lossy_decoding_substitutes_replacement_character() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_plain(&dir, "broken.txt", b"bad \xff here\n");

    assert_eq!(
        collect_lines(&path, &ReaderConfig::default()).await,
        vec!["bad \u{fffd} here", ""]
    );
}

#[tokio::test]
async fn buffered_entry_point_matches_canonical_reader() {
    let dir = tempfile::tempdir().unwrap();
    let plain = write_plain(&dir, "sample.txt", SAMPLE.as_bytes());
    let compressed = write_gzip(&dir, "sample.txt.gz", b"one\r\ntwo");

    for path in [&plain, &compressed] {
        for chunk_size in [1, 4, 1024] {
            let config = ReaderConfig::default().with_chunk_size(chunk_size);
            let buffered: Vec<String> = read_lines_buffered(path, &config)
                .try_collect()
                .await
                .unwrap();
            assert_eq!(buffered, collect_lines(path, &config).await);
        }
    }
}

#[tokio::test]
async fn text_stream_reassembles_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gzip(&dir, "sample.gz", SAMPLE.as_bytes());

    let config = ReaderConfig::default().with_chunk_size(2);
    let chunks: Vec<String> = text_file_stream(&path, &config)
        .try_collect()
        .await
        .unwrap();
    assert_eq!(chunks.concat(), SAMPLE);
}
