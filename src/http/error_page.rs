use std::net::IpAddr;
use std::sync::Arc;

use tokio::io::AsyncWrite;

use crate::access_log::{AccessLog, LogEntry};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

/// Renders the canonical error pages.
///
/// Not-found responses are also written to the access log with the exact
/// number of bytes sent.
#[derive(Debug, Clone)]
pub struct ErrorResponder {
    server_name: String,
    access_log: Arc<AccessLog>,
}

impl ErrorResponder {
    pub fn new(server_name: impl Into<String>, access_log: Arc<AccessLog>) -> Self {
        Self {
            server_name: server_name.into(),
            access_log,
        }
    }

    /// Builds the page for `status`. The footer is only shown on 404 pages.
    pub fn page(&self, status: StatusCode) -> Response {
        let title = format!("{} {}", status.as_u16(), status.reason_phrase());
        let mut html = format!(
            "<html>\r\n<head><title>{title}</title></head>\r\n<body>\r\n<h1>{title}</h1>\r\n"
        );
        if status == StatusCode::NotFound {
            html.push_str("<hr width=100% align=left size=1>\r\n");
            html.push_str(&format!("<address>{}</address>\r\n", self.server_name));
        }
        html.push_str("</body>\r\n</html>\r\n");

        Response::html(status, html)
    }

    /// Sends the 404 page and logs it. Returns the bytes written.
    pub async fn not_found<W>(&self, stream: &mut W, client: IpAddr, request_line: &str) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let sent = self.send(stream, StatusCode::NotFound).await?;
        self.access_log
            .record(LogEntry::now(client, request_line, StatusCode::NotFound.as_u16(), sent))
            .await;
        Ok(sent)
    }

    /// Sends the 500 page and logs it. Returns the bytes written.
    pub async fn internal_error<W>(&self, stream: &mut W, client: IpAddr, request_line: &str) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let status = StatusCode::InternalServerError;
        let sent = self.send(stream, status).await?;
        self.access_log
            .record(LogEntry::now(client, request_line, status.as_u16(), sent))
            .await;
        Ok(sent)
    }

    async fn send<W>(&self, stream: &mut W, status: StatusCode) -> anyhow::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut writer = ResponseWriter::new(&self.page(status));
        writer.write_to_stream(stream).await?;
        Ok(writer.written() as u64)
    }
}
