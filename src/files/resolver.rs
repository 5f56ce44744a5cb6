use std::ffi::OsString;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use tokio::io::AsyncWrite;
use tracing::{debug, warn};

use crate::access_log::LogEntry;
use crate::context::ServeContext;
use crate::files::listing::DirectoryListing;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::http::writer::{ResponseWriter, stream_chunks};

/// A resource identifier mapped onto the filesystem.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub exists: bool,
    pub is_directory: bool,
    pub absolute_path: PathBuf,
    pub size_bytes: u64,
    pub last_modified: Option<SystemTime>,
    pub content_type: Option<String>,
}

/// Appends `identifier` to `document_root` verbatim.
///
/// No canonicalization happens here: `..` segments are passed through to
/// the filesystem unchanged.
pub fn join_identifier(document_root: &Path, identifier: &str) -> PathBuf {
    let mut path = OsString::from(document_root.as_os_str());
    path.push(identifier);
    PathBuf::from(path)
}

/// Head for a file response, in the fixed header order.
///
/// A missing modification time falls back to `now`, so `Last-Modified` is
/// always present. `Accept-Ranges: bytes` is advertised although range
/// requests are never honored.
fn file_head(
    server_name: &str,
    content_type: &str,
    size_bytes: u64,
    last_modified: Option<SystemTime>,
    now: SystemTime,
) -> Response {
    ResponseBuilder::new(StatusCode::Ok)
        .header("Date", httpdate::fmt_http_date(now))
        .header("Server", server_name)
        .header("Content-Type", content_type)
        .header("Content-Length", size_bytes.to_string())
        .header("Last-Modified", httpdate::fmt_http_date(last_modified.unwrap_or(now)))
        .header("Accept-Ranges", "bytes")
        .build()
}

/// Resolves identifiers against the document root and streams the result.
pub struct ResourceHandler<'a> {
    ctx: &'a ServeContext,
}

impl<'a> ResourceHandler<'a> {
    pub fn new(ctx: &'a ServeContext) -> Self {
        Self { ctx }
    }

    pub async fn resolve(&self, identifier: &str) -> ResolvedResource {
        let absolute_path = join_identifier(&self.ctx.settings.document_root, identifier);
        let content_type = self
            .ctx
            .mime
            .content_type_for(identifier)
            .map(str::to_string);

        match tokio::fs::metadata(&absolute_path).await {
            Ok(meta) => ResolvedResource {
                exists: true,
                is_directory: meta.is_dir(),
                absolute_path,
                size_bytes: meta.len(),
                last_modified: meta.modified().ok(),
                content_type,
            },
            Err(_) => ResolvedResource {
                exists: false,
                is_directory: false,
                absolute_path,
                size_bytes: 0,
                last_modified: None,
                content_type,
            },
        }
    }

    /// Serves `identifier` on `stream` and writes the access-log entry.
    ///
    /// Returns the status sent. An error means the transfer broke after the
    /// head was written and the connection should simply be dropped.
    pub async fn serve<W>(
        &self,
        stream: &mut W,
        client: IpAddr,
        request_line: &str,
        identifier: &str,
    ) -> anyhow::Result<StatusCode>
    where
        W: AsyncWrite + Unpin,
    {
        let resource = self.resolve(identifier).await;

        if !resource.exists {
            debug!(identifier, path = %resource.absolute_path.display(), "No such resource");
            self.ctx.errors.not_found(stream, client, request_line).await?;
            return Ok(StatusCode::NotFound);
        }

        if resource.is_directory {
            return self
                .serve_listing(stream, client, request_line, identifier, &resource)
                .await;
        }

        let Some(content_type) = resource.content_type.as_deref() else {
            debug!(identifier, "No content type for extension");
            self.ctx.errors.not_found(stream, client, request_line).await?;
            return Ok(StatusCode::NotFound);
        };

        let mut file = match tokio::fs::File::open(&resource.absolute_path).await {
            Ok(f) => f,
            Err(e) => {
                warn!(identifier, error = %e, "Failed to open resource");
                self.ctx.errors.internal_error(stream, client, request_line).await?;
                return Ok(StatusCode::InternalServerError);
            }
        };

        let head = self.head_for(content_type, &resource);
        ResponseWriter::head(&head)
            .write_to_stream(stream)
            .await
            .context("writing response head")?;

        let sent = stream_chunks(
            &mut file,
            stream,
            resource.size_bytes,
            self.ctx.settings.buffer_size,
        )
        .await
        .with_context(|| format!("streaming {}", resource.absolute_path.display()))?;

        self.ctx
            .access_log
            .record(LogEntry::now(client, request_line, StatusCode::Ok.as_u16(), sent))
            .await;

        Ok(StatusCode::Ok)
    }

    fn head_for(&self, content_type: &str, resource: &ResolvedResource) -> Response {
        if resource.last_modified.is_none() {
            debug!(
                path = %resource.absolute_path.display(),
                "No modification time, using Date for Last-Modified"
            );
        }
        file_head(
            &self.ctx.settings.server_name,
            content_type,
            resource.size_bytes,
            resource.last_modified,
            SystemTime::now(),
        )
    }

    async fn serve_listing<W>(
        &self,
        stream: &mut W,
        client: IpAddr,
        request_line: &str,
        identifier: &str,
        resource: &ResolvedResource,
    ) -> anyhow::Result<StatusCode>
    where
        W: AsyncWrite + Unpin,
    {
        let listing = match DirectoryListing::scan(&resource.absolute_path, identifier).await {
            Ok(listing) => listing,
            Err(e) => {
                warn!(identifier, error = %e, "Failed to read directory");
                self.ctx.errors.internal_error(stream, client, request_line).await?;
                return Ok(StatusCode::InternalServerError);
            }
        };

        let html = listing.render(&self.ctx.settings.server_name);
        let body_len = html.len() as u64;

        let mut writer = ResponseWriter::new(&Response::html(StatusCode::Ok, html));
        writer.write_to_stream(stream).await.context("writing directory listing")?;

        self.ctx
            .access_log
            .record(LogEntry::now(client, request_line, StatusCode::Ok.as_u16(), body_len))
            .await;

        Ok(StatusCode::Ok)
    }
}
