//! Readers of recorded debug adapter traffic.
//! Supports Content-Length framed streams (as written by adapters) and JSON lines.

use crate::error::Error;
use serde_json::Value;
use std::io::BufRead;

/// Source of decoded protocol messages.
pub trait MessageSource {
    /// Read the next message, [`None`] at the end of the stream.
    fn read_message(&mut self) -> Result<Option<Value>, Error>;
}

/// Largest accepted frame payload.
pub const MAX_CONTENT_LENGTH: usize = 64 * 1024 * 1024;

/// Content-Length framed stream.
pub struct FramedReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> FramedReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> MessageSource for FramedReader<R> {
    fn read_message(&mut self) -> Result<Option<Value>, Error> {
        let mut content_length: Option<usize> = None;
        let mut header_seen = false;
        loop {
            let mut line = String::new();
            let read_n = self.reader.read_line(&mut line)?;
            if read_n == 0 {
                if header_seen {
                    return Err(Error::MissingContentLength);
                }
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                if header_seen {
                    break;
                }
                // blank lines between messages
                continue;
            }
            header_seen = true;
            if let Some(v) = line.strip_prefix("Content-Length:") {
                let v = v.trim();
                content_length =
                    Some(v.parse().map_err(|_| Error::InvalidContentLength(v.to_string()))?);
            }
        }

        let len = content_length.ok_or(Error::MissingContentLength)?;
        if len > MAX_CONTENT_LENGTH {
            return Err(Error::InvalidContentLength(format!(
                "{len} exceeds the {MAX_CONTENT_LENGTH} bytes limit"
            )));
        }
        let mut buf = vec![0u8; len];
        self.reader.read_exact(&mut buf)?;
        Ok(Some(serde_json::from_slice(&buf)?))
    }
}

/// One JSON message per line, empty lines are skipped.
pub struct JsonLinesReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> JsonLinesReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> MessageSource for JsonLinesReader<R> {
    fn read_message(&mut self) -> Result<Option<Value>, Error> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            return Ok(Some(serde_json::from_str(line)?));
        }
    }
}
