//! Job inputs.

use crate::error::{PipelineError, Result};
use futures::stream::{self, BoxStream, StreamExt};
use mailsift_extract::Extractor;
use std::fmt;
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncRead;

/// What a job processes.
pub enum JobSource {
    /// Raw strings, each one item, taken as-is
    Items(Vec<String>),
    /// In-memory content scanned for candidate tokens
    Text(Vec<u8>),
    /// File streamed in chunks; the item count is unknown up front
    File(PathBuf),
    /// Any async byte source, streamed like a file
    Reader(Box<dyn AsyncRead + Send + Unpin>),
}

impl fmt::Debug for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items(items) => f.debug_tuple("Items").field(&items.len()).finish(),
            Self::Text(bytes) => f.debug_tuple("Text").field(&bytes.len()).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader"),
        }
    }
}

/// A source ready to be consumed.
pub struct OpenedSource {
    /// Expected item count; 0 for streamed sources
    pub total: u64,
    /// Items in order
    pub items: BoxStream<'static, io::Result<String>>,
}

impl JobSource {
    /// Validate and open the source.
    ///
    /// Fails before any job state exists: an empty item list, text without
    /// tokens, or a file that cannot be opened.
    pub async fn open(self, extractor: &Extractor) -> Result<OpenedSource> {
        match self {
            Self::Items(items) => {
                if items.is_empty() {
                    return Err(PipelineError::EmptySubmission);
                }
                Ok(OpenedSource {
                    total: items.len() as u64,
                    items: stream::iter(items.into_iter().map(Ok)).boxed(),
                })
            }
            Self::Text(content) => {
                let tokens: Vec<String> = extractor.extract(&content).collect();
                if tokens.is_empty() {
                    return Err(PipelineError::EmptySubmission);
                }
                Ok(OpenedSource {
                    total: tokens.len() as u64,
                    items: stream::iter(tokens.into_iter().map(Ok)).boxed(),
                })
            }
            Self::File(path) => Ok(OpenedSource {
                total: 0,
                items: extractor.stream_file(&path).await?.boxed(),
            }),
            Self::Reader(reader) => Ok(OpenedSource {
                total: 0,
                items: extractor.stream(reader).boxed(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(source: JobSource) -> Result<(u64, Vec<String>)> {
        let opened = source.open(&Extractor::default()).await?;
        let items = opened
            .items
            .map(|i| i.expect("item"))
            .collect::<Vec<_>>()
            .await;
        Ok((opened.total, items))
    }

    #[tokio::test]
    async fn test_items_are_taken_verbatim() {
        let (total, items) = collect(JobSource::Items(vec![" A@x.io ".into(), "junk".into()]))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items, vec![" A@x.io ", "junk"]);
    }

    #[tokio::test]
    async fn test_text_is_extracted() {
        let (total, items) = collect(JobSource::Text(b"Hi <a@x.io>, cc b@y.org".to_vec()))
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert_eq!(items, vec!["a@x.io", "b@y.org"]);
    }

    #[tokio::test]
    async fn test_empty_submissions_rejected() {
        assert!(matches!(
            collect(JobSource::Items(Vec::new())).await,
            Err(PipelineError::EmptySubmission)
        ));
        assert!(matches!(
            collect(JobSource::Text(b"no addresses here".to_vec())).await,
            Err(PipelineError::EmptySubmission)
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_source_error() {
        let err = collect(JobSource::File(PathBuf::from("/nonexistent/mailsift.txt")))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
    }

    #[tokio::test]
    async fn test_reader_total_unknown() {
        let reader: Box<dyn AsyncRead + Send + Unpin> = Box::new(&b"q@r.io"[..]);
        let (total, items) = collect(JobSource::Reader(reader)).await.unwrap();
        assert_eq!(total, 0);
        assert_eq!(items, vec!["q@r.io"]);
    }
}
