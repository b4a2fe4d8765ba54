// MIT License - Copyright (c) 2026 Peter Wright
// Newline-delimited decoding of the lircd stream

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::constants::MAX_LINE_LEN;
use crate::error::{LircError, Result};

/// Splits a byte stream into lines.
///
/// Terminators (`\n` or `\r\n`) are stripped; bytes that are not valid UTF-8
/// are replaced rather than treated as an error. A final line without a
/// terminator is still returned before end of stream.
pub(crate) struct LineReader<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    limit: usize,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_limit(reader, MAX_LINE_LEN)
    }

    pub fn with_limit(reader: R, limit: usize) -> Self {
        Self {
            inner: BufReader::new(reader),
            buf: Vec::new(),
            limit,
        }
    }

    /// Next line, or `None` at end of stream.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let read = (&mut self.inner)
            .take(self.limit as u64 + 2)
            .read_until(b'\n', &mut self.buf)
            .await?;
        if read == 0 {
            return Ok(None);
        }

        // Room for a full line plus its `\r\n`; the limit applies to the content.
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.buf.len() > self.limit {
            return Err(LircError::LineTooLong { limit: self.limit });
        }

        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}
