//! Token pattern, buffered extraction and the incremental chunk scanner.

use mailsift_core::ExtractConfig;
use once_cell::sync::Lazy;
use regex::bytes::Regex;
use std::collections::VecDeque;

/// Liberal "something@something" pattern over raw bytes.
///
/// Matches runs of bytes outside ASCII whitespace and `<>"'()[]\,;:`
/// containing an `@` with at least one byte on each side. Such a match always
/// spans the whole run, so a token never crosses a delimiter byte.
static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?-u)[^\s<>"'()\[\]\\,;:]+@[^\s<>"'()\[\]\\,;:]+"#)
        .expect("Token regex is hardcoded and valid")
});

/// Whether `byte` can never be part of a token.
#[must_use]
pub fn is_delimiter(byte: u8) -> bool {
    matches!(
        byte,
        b'\t'
            | b'\n'
            | 0x0B
            | 0x0C
            | b'\r'
            | b' '
            | b'<'
            | b'>'
            | b'"'
            | b'\''
            | b'('
            | b')'
            | b'['
            | b']'
            | b'\\'
            | b','
            | b';'
            | b':'
    )
}

fn to_token(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn scan_into(bytes: &[u8], max_token_len: usize, out: &mut VecDeque<String>) {
    out.extend(
        TOKEN_PATTERN
            .find_iter(bytes)
            .filter(|m| m.len() <= max_token_len)
            .map(|m| to_token(m.as_bytes())),
    );
}

/// Extraction limits shared by buffered and streaming modes.
#[derive(Debug, Clone, Copy)]
pub struct Extractor {
    pub(crate) max_tokens: usize,
    pub(crate) chunk_bytes: usize,
    pub(crate) max_token_len: usize,
}

impl Extractor {
    /// Build an extractor from configuration.
    #[must_use]
    pub fn from_config(config: &ExtractConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            chunk_bytes: config.chunk_bytes.max(1),
            max_token_len: config.max_token_len,
        }
    }

    /// Override the streaming read size.
    #[must_use]
    pub fn with_chunk_bytes(mut self, chunk_bytes: usize) -> Self {
        self.chunk_bytes = chunk_bytes.max(1);
        self
    }

    /// Override the buffered-mode token cap.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Scan in-memory content once, lazily, stopping after `max_tokens`.
    pub fn extract<'a>(&self, content: &'a [u8]) -> impl Iterator<Item = String> + 'a {
        let max_token_len = self.max_token_len;
        TOKEN_PATTERN
            .find_iter(content)
            .filter(move |m| m.len() <= max_token_len)
            .take(self.max_tokens)
            .map(|m| to_token(m.as_bytes()))
    }

    /// A fresh incremental scanner using this extractor's limits.
    #[must_use]
    pub fn scanner(&self) -> TokenScanner {
        TokenScanner::new(self.max_token_len)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_config(&ExtractConfig::default())
    }
}

/// Incremental scanner that accepts arbitrary chunk boundaries.
///
/// Everything up to the last delimiter of the accumulated bytes is complete
/// and gets scanned; the trailing partial run is carried into the next
/// chunk. A carried run that outgrows `max_token_len` is dropped along with
/// the rest of that run.
#[derive(Debug)]
pub struct TokenScanner {
    carry: Vec<u8>,
    skipping: bool,
    max_token_len: usize,
}

impl TokenScanner {
    /// Create a scanner that keeps tokens up to `max_token_len` bytes.
    #[must_use]
    pub fn new(max_token_len: usize) -> Self {
        Self {
            carry: Vec::new(),
            skipping: false,
            max_token_len,
        }
    }

    /// Feed the next chunk, pushing every completed token onto `out`.
    pub fn feed(&mut self, chunk: &[u8], out: &mut VecDeque<String>) {
        let mut chunk = chunk;

        if self.skipping {
            match chunk.iter().position(|b| is_delimiter(*b)) {
                Some(pos) => {
                    self.skipping = false;
                    chunk = &chunk[pos..];
                }
                None => return,
            }
        }

        self.carry.extend_from_slice(chunk);

        if let Some(last) = self.carry.iter().rposition(|b| is_delimiter(*b)) {
            let rest = self.carry.split_off(last + 1);
            scan_into(&self.carry, self.max_token_len, out);
            self.carry = rest;
        }

        if self.carry.len() > self.max_token_len {
            tracing::debug!(
                len = self.carry.len(),
                "dropping token run longer than max_token_len"
            );
            self.carry.clear();
            self.skipping = true;
        }
    }

    /// Flush the carried run at end of input.
    pub fn finish(&mut self, out: &mut VecDeque<String>) {
        if !self.skipping {
            scan_into(&self.carry, self.max_token_len, out);
        }
        self.carry.clear();
        self.skipping = false;
    }

    /// Bytes currently carried between chunks.
    #[must_use]
    pub fn carried(&self) -> usize {
        self.carry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_all(text: &str) -> Vec<String> {
        Extractor::default().extract(text.as_bytes()).collect()
    }

    fn scan_in_chunks(text: &str, size: usize, max_token_len: usize) -> Vec<String> {
        let mut scanner = TokenScanner::new(max_token_len);
        let mut out = VecDeque::new();
        for chunk in text.as_bytes().chunks(size) {
            scanner.feed(chunk, &mut out);
        }
        scanner.finish(&mut out);
        out.into_iter().collect()
    }

    #[test]
    fn test_extracts_in_order_with_duplicates() {
        let tokens = extract_all("a@gmail.com, A@GMAIL.COM; a@gmail.com");
        assert_eq!(tokens, vec!["a@gmail.com", "A@GMAIL.COM", "a@gmail.com"]);
    }

    #[test]
    fn test_delimiters_split_tokens() {
        let tokens = extract_all(r#"<john@x.io> "mary@y.org" (bob@z.net) [eve@q.io] u\v@w.io"#);
        assert_eq!(
            tokens,
            vec!["john@x.io", "mary@y.org", "bob@z.net", "eve@q.io", "v@w.io"]
        );
    }

    #[test]
    fn test_no_normalization() {
        let tokens = extract_all("name: .Odd..Local.@Host.  x@unknown-tld");
        assert_eq!(tokens, vec![".Odd..Local.@Host.", "x@unknown-tld"]);
    }

    #[test]
    fn test_requires_both_sides_of_at() {
        assert!(extract_all("@nobody nobody@ @ plain text").is_empty());
        assert_eq!(extract_all("a@b@c"), vec!["a@b@c"]);
    }

    #[test]
    fn test_max_tokens_cap() {
        let text = "a@b.io ".repeat(10);
        let tokens: Vec<_> = Extractor::default()
            .with_max_tokens(3)
            .extract(text.as_bytes())
            .collect();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_overlong_tokens_dropped() {
        let long = format!("{}@example.com", "x".repeat(2000));
        let text = format!("ok@a.io {long} ok2@b.io");
        assert_eq!(extract_all(&text), vec!["ok@a.io", "ok2@b.io"]);
    }

    #[test]
    fn test_non_utf8_bytes_are_lossy() {
        let bytes = b"caf\xe9@example.com tail";
        let tokens: Vec<_> = Extractor::default().extract(bytes).collect();
        assert_eq!(tokens, vec!["caf\u{FFFD}@example.com"]);
    }

    #[test]
    fn test_scanner_matches_buffered_at_every_chunk_size() {
        let text = "first@a.io\nsecond@b.org, third@c.net;fourth@d.co\t(fifth@e.com) last@f.io";
        let expected = extract_all(text);
        for size in 1..=text.len() {
            assert_eq!(scan_in_chunks(text, size, 1024), expected, "chunk size {size}");
        }
    }

    #[test]
    fn test_scanner_carry_stays_bounded() {
        let text = format!("a@b.io {} c@d.io", "y".repeat(100));
        let mut scanner = TokenScanner::new(16);
        let mut out = VecDeque::new();
        for chunk in text.as_bytes().chunks(4) {
            scanner.feed(chunk, &mut out);
            assert!(scanner.carried() <= 16);
        }
        scanner.finish(&mut out);
        assert_eq!(out, vec!["a@b.io", "c@d.io"]);
    }

    #[test]
    fn test_scanner_drops_overlong_run_like_buffered() {
        let long = format!("{}@x.io", "z".repeat(40));
        let text = format!("k@a.io {long} m@b.io");
        let buffered: Vec<_> = Extractor {
            max_tokens: 100,
            chunk_bytes: 8,
            max_token_len: 16,
        }
        .extract(text.as_bytes())
        .collect();
        assert_eq!(buffered, vec!["k@a.io", "m@b.io"]);
        for size in [1, 3, 8, 64] {
            assert_eq!(scan_in_chunks(&text, size, 16), buffered);
        }
    }
}
