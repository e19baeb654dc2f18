//! Streaming extraction over blocking and async readers.

use crate::pattern::{Extractor, TokenScanner};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::io::{self, Read};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Lazy token iterator over a blocking reader.
///
/// Reads `chunk_bytes` at a time; an I/O error is yielded once and ends the
/// sequence.
pub struct TokenReader<R> {
    reader: R,
    scanner: TokenScanner,
    pending: VecDeque<String>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: Read> TokenReader<R> {
    fn new(reader: R, extractor: &Extractor) -> Self {
        Self {
            reader,
            scanner: extractor.scanner(),
            pending: VecDeque::new(),
            buf: vec![0; extractor.chunk_bytes],
            done: false,
        }
    }
}

impl<R: Read> Iterator for TokenReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.done {
                return None;
            }
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    self.scanner.finish(&mut self.pending);
                }
                Ok(n) => self.scanner.feed(&self.buf[..n], &mut self.pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

struct StreamState<R> {
    reader: R,
    scanner: TokenScanner,
    pending: VecDeque<String>,
    buf: Vec<u8>,
    done: bool,
}

/// Lazy token stream over an async reader.
pub fn stream_tokens<R>(
    reader: R,
    extractor: &Extractor,
) -> impl Stream<Item = io::Result<String>> + Send + 'static
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let state = StreamState {
        reader,
        scanner: extractor.scanner(),
        pending: VecDeque::new(),
        buf: vec![0; extractor.chunk_bytes],
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(token) = st.pending.pop_front() {
                return Some((Ok(token), st));
            }
            if st.done {
                return None;
            }
            match st.reader.read(&mut st.buf).await {
                Ok(0) => {
                    st.done = true;
                    st.scanner.finish(&mut st.pending);
                }
                Ok(n) => st.scanner.feed(&st.buf[..n], &mut st.pending),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    st.done = true;
                    return Some((Err(e), st));
                }
            }
        }
    })
}

impl Extractor {
    /// Streaming extraction over a blocking reader.
    pub fn reader<R: Read>(&self, reader: R) -> TokenReader<R> {
        TokenReader::new(reader, self)
    }

    /// Streaming extraction over an async reader.
    pub fn stream<R>(&self, reader: R) -> impl Stream<Item = io::Result<String>> + Send + 'static
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        stream_tokens(reader, self)
    }

    /// Open `path` and stream its tokens.
    ///
    /// # Errors
    /// Returns the open error before any token is produced.
    pub async fn stream_file(
        &self,
        path: &Path,
    ) -> io::Result<impl Stream<Item = io::Result<String>> + Send + 'static> {
        let file = tokio::fs::File::open(path).await?;
        tracing::debug!(path = %path.display(), chunk_bytes = self.chunk_bytes, "streaming tokens from file");
        Ok(stream_tokens(file, self))
    }
}
