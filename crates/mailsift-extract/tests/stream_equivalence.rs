use futures::StreamExt;
use mailsift_extract::Extractor;
use std::io::Write;
use tempfile::NamedTempFile;

/// Build a mixed document: CSV rows, angle-bracket headers, prose and noise.
fn sample_document() -> String {
    let mut doc = String::new();
    for i in 0..300 {
        doc.push_str(&format!("{i},user{i}@example.com,\"Name {i}\"\n"));
        doc.push_str(&format!("From: Someone <Someone.{i}@Mail.Example.org>\r\n"));
        doc.push_str("lorem ipsum dolor sit amet; no address here\n");
        if i % 7 == 0 {
            doc.push_str(&format!("dup@example.com (user{i}@example.com)\t"));
        }
    }
    doc
}

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

#[test]
fn test_file_streaming_matches_buffered_extraction() {
    let doc = sample_document();
    let file = write_temp(&doc);
    let buffered: Vec<String> = Extractor::default().extract(doc.as_bytes()).collect();
    assert!(buffered.len() > 600);

    for chunk_bytes in [1, 2, 7, 13, 64, 1000, 256 * 1024] {
        let handle = std::fs::File::open(file.path()).expect("open temp file");
        let streamed: Vec<String> = Extractor::default()
            .with_chunk_bytes(chunk_bytes)
            .reader(handle)
            .collect::<std::io::Result<_>>()
            .expect("stream tokens");
        assert_eq!(streamed, buffered, "chunk size {chunk_bytes}");
    }
}

#[tokio::test]
async fn test_async_file_streaming_matches_buffered_extraction() {
    let doc = sample_document();
    let file = write_temp(&doc);
    let buffered: Vec<String> = Extractor::default().extract(doc.as_bytes()).collect();

    for chunk_bytes in [3, 17, 4096] {
        let stream = Extractor::default()
            .with_chunk_bytes(chunk_bytes)
            .stream_file(file.path())
            .await
            .expect("open stream");
        let streamed: Vec<String> = stream.map(|t| t.expect("token")).collect().await;
        assert_eq!(streamed, buffered, "chunk size {chunk_bytes}");
    }
}

#[test]
fn test_empty_file_yields_nothing() {
    let file = write_temp("");
    let handle = std::fs::File::open(file.path()).expect("open temp file");
    assert_eq!(Extractor::default().reader(handle).count(), 0);
}
