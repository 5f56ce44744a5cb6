#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use docserver::access_log::AccessLog;
use docserver::context::{ServeContext, ServeSettings};
use docserver::http::connection::Connection;
use docserver::http::mime::MimeTable;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const MIME_TYPES: &str = "\
# test mime table
text/html\thtml htm
text/plain txt
image/png png
application/octet-stream bin
";

pub const PEER: &str = "127.0.0.1:40000";

pub struct Fixture {
    pub root: TempDir,
    pub logs: TempDir,
    pub ctx: Arc<ServeContext>,
}

/// Empty document root, fresh log directory, 16-byte stream buffer.
pub fn fixture() -> Fixture {
    fixture_with_buffer(16)
}

pub fn fixture_with_buffer(buffer_size: usize) -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();

    let settings = ServeSettings {
        document_root: root.path().to_path_buf(),
        default_resource: "/index.html".to_string(),
        buffer_size,
        server_name: "test-server".to_string(),
    };
    let access_log = AccessLog::open(logs.path().join("access")).unwrap();
    let ctx = ServeContext::new(settings, MimeTable::parse(MIME_TYPES), access_log);

    Fixture {
        root,
        logs,
        ctx: Arc::new(ctx),
    }
}

impl Fixture {
    pub fn write(&self, rel: &str, contents: &[u8]) {
        let path = self.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    pub fn mkdir(&self, rel: &str) {
        std::fs::create_dir_all(self.root.path().join(rel)).unwrap();
    }

    /// Lines in today's access log; empty if the file was never created.
    pub fn log_lines(&self) -> Vec<String> {
        let path = self.ctx.access_log.path_for(Local::now().date_naive());
        read_lines(&path)
    }

    /// Sends `request` over an in-memory pipe and returns everything the
    /// server wrote before closing.
    pub async fn exchange(&self, request: &[u8]) -> Vec<u8> {
        exchange(Arc::clone(&self.ctx), request).await
    }
}

pub fn read_lines(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

pub async fn exchange(ctx: Arc<ServeContext>, request: &[u8]) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let peer: SocketAddr = PEER.parse().unwrap();
    let task = tokio::spawn(Connection::new(server, peer, ctx).run());

    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    task.await.unwrap().unwrap();
    response
}

pub struct ParsedResponse {
    pub status: u16,
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ParsedResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn parse_response(raw: &[u8]) -> ParsedResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("response has no header terminator");
    let head = std::str::from_utf8(&raw[..split]).unwrap();
    let body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status_line = lines.next().unwrap().to_string();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .unwrap()
        .parse()
        .unwrap();
    let headers = lines
        .map(|line| {
            let (k, v) = line.split_once(':').unwrap();
            (k.trim().to_string(), v.trim().to_string())
        })
        .collect();

    ParsedResponse {
        status,
        status_line,
        headers,
        body,
    }
}
