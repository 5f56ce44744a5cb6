use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

pub const HTTP_VERSION: &str = "HTTP/1.0";

/// Serializes the status line, headers and blank line.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = serialize_head(resp);
    buf.extend_from_slice(&resp.body);
    buf
}

/// Writes a fully buffered response, tracking how much reached the stream.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    /// Writes only the head; used when the body is streamed separately.
    pub fn head(response: &Response) -> Self {
        Self {
            buffer: serialize_head(response),
            written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes accepted by the stream so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }
        stream.flush().await?;

        Ok(())
    }
}

/// Copies exactly `total` bytes from `src` to `dst` in `chunk_size` pieces.
///
/// Every whole chunk is written and flushed, then the final partial chunk.
/// Returns the number of bytes delivered. Fails if `src` ends before `total`
/// bytes were read.
pub async fn stream_chunks<R, W>(
    src: &mut R,
    dst: &mut W,
    total: u64,
    chunk_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if chunk_size == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "chunk size must be greater than zero",
        ));
    }

    let whole_chunks = total / chunk_size as u64;
    let remainder = (total % chunk_size as u64) as usize;
    let mut buf = vec![0u8; chunk_size];
    let mut sent = 0u64;

    for _ in 0..whole_chunks {
        src.read_exact(&mut buf).await?;
        dst.write_all(&buf).await?;
        dst.flush().await?;
        sent += chunk_size as u64;
    }

    if remainder > 0 {
        src.read_exact(&mut buf[..remainder]).await?;
        dst.write_all(&buf[..remainder]).await?;
        dst.flush().await?;
        sent += remainder as u64;
    }

    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::{ResponseBuilder, StatusCode};

    #[test]
    fn head_keeps_header_order() {
        let resp = ResponseBuilder::new(StatusCode::Ok)
            .header("Date", "d")
            .header("Server", "s")
            .header("Content-Type", "text/plain")
            .header("Content-Length", "0")
            .build();

        let head = String::from_utf8(serialize_head(&resp)).unwrap();
        assert_eq!(
            head,
            "HTTP/1.0 200 OK\r\nDate: d\r\nServer: s\r\nContent-Type: text/plain\r\nContent-Length: 0\r\n\r\n"
        );
    }

    #[tokio::test]
    async fn streams_whole_chunks_and_remainder() {
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let mut src = std::io::Cursor::new(data.clone());
        let mut dst = Vec::new();

        let sent = stream_chunks(&mut src, &mut dst, data.len() as u64, 2048)
            .await
            .unwrap();

        assert_eq!(sent, 5000);
        assert_eq!(dst, data);
    }

    #[tokio::test]
    async fn exact_multiple_of_chunk_size() {
        let data = vec![7u8; 4096];
        let mut src = std::io::Cursor::new(data.clone());
        let mut dst = Vec::new();

        let sent = stream_chunks(&mut src, &mut dst, 4096, 1024).await.unwrap();

        assert_eq!(sent, 4096);
        assert_eq!(dst, data);
    }

    #[tokio::test]
    async fn short_source_is_an_error() {
        let mut src = std::io::Cursor::new(vec![1u8; 10]);
        let mut dst = Vec::new();

        let err = stream_chunks(&mut src, &mut dst, 20, 8).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
