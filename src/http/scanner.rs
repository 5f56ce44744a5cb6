//! Request-line scanner.
//!
//! Reads at most [`MAX_SCAN_LINES`] lines and stops at the first one that
//! begins with `GET`. Anything else (other methods, headers, a body) is
//! skipped or never read.

use std::fmt;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::http::request::RequestLine;

/// Lines examined before giving up on finding a `GET`.
pub const MAX_SCAN_LINES: usize = 3;
/// Longest line accepted before the request is treated as malformed.
pub const MAX_LINE_LEN: usize = 8 * 1024;

#[derive(Debug)]
pub enum ScanError {
    /// The peer closed the stream before a `GET` line arrived.
    StreamEnded,
    /// `MAX_SCAN_LINES` lines were read and none began with `GET`.
    NoGetLine,
    /// A line exceeded `MAX_LINE_LEN` bytes without a terminator.
    LineTooLong,
    Io(std::io::Error),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::StreamEnded => write!(f, "stream ended before a GET line"),
            ScanError::NoGetLine => write!(f, "no GET line within {MAX_SCAN_LINES} lines"),
            ScanError::LineTooLong => write!(f, "request line longer than {MAX_LINE_LEN} bytes"),
            ScanError::Io(e) => write!(f, "read error: {e}"),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Io(e)
    }
}

/// Scanner state.
#[derive(Debug, PartialEq, Eq)]
enum ScanState {
    Scanning { lines_read: usize },
    Found(RequestLine),
    GaveUp,
}

/// Reads lines from `stream` until a `GET` line is found or the scan gives up.
///
/// `buffer` holds bytes read past the current line; it is owned by the
/// connection so nothing read from the socket is lost between calls.
pub async fn scan_request_line<R>(stream: &mut R, buffer: &mut BytesMut) -> Result<RequestLine, ScanError>
where
    R: AsyncRead + Unpin,
{
    let mut state = ScanState::Scanning { lines_read: 0 };

    loop {
        match state {
            ScanState::Scanning { lines_read } if lines_read >= MAX_SCAN_LINES => {
                state = ScanState::GaveUp;
            }

            ScanState::Scanning { lines_read } => {
                let Some(line) = next_line(stream, buffer).await? else {
                    return Err(ScanError::StreamEnded);
                };

                state = if line.starts_with("GET") {
                    ScanState::Found(RequestLine::new(line))
                } else {
                    ScanState::Scanning {
                        lines_read: lines_read + 1,
                    }
                };
            }

            ScanState::Found(request) => return Ok(request),

            ScanState::GaveUp => return Err(ScanError::NoGetLine),
        }
    }
}

/// Returns the next line without its `\n` or `\r\n` terminator.
///
/// Text left over when the stream ends counts as a final line; `None` means
/// the stream ended with nothing buffered.
async fn next_line<R>(stream: &mut R, buffer: &mut BytesMut) -> Result<Option<String>, ScanError>
where
    R: AsyncRead + Unpin,
{
    loop {
        if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let mut line = buffer.split_to(pos + 1);
            line.truncate(pos);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        if buffer.len() > MAX_LINE_LEN {
            return Err(ScanError::LineTooLong);
        }

        let n = stream.read_buf(buffer).await?;
        if n == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            let mut line = buffer.split();
            if line.last() == Some(&b'\r') {
                line.truncate(line.len() - 1);
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }
    }
}
