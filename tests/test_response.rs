use std::sync::Arc;

use docserver::access_log::AccessLog;
use docserver::http::error_page::ErrorResponder;
use docserver::http::response::{Response, ResponseBuilder, StatusCode};
use docserver::http::writer::{ResponseWriter, serialize_head};

#[test]
fn test_status_codes_and_reasons() {
    assert_eq!(StatusCode::Ok.as_u16(), 200);
    assert_eq!(StatusCode::NotFound.as_u16(), 404);
    assert_eq!(StatusCode::InternalServerError.as_u16(), 500);
    assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    assert_eq!(StatusCode::InternalServerError.reason_phrase(), "Internal Server Error");
}

#[test]
fn test_builder_adds_content_length_last() {
    let resp = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Type", "text/plain")
        .body(b"hello".to_vec())
        .build();

    assert_eq!(resp.headers.last().unwrap(), &("Content-Length".to_string(), "5".to_string()));
}

#[test]
fn test_builder_keeps_explicit_content_length() {
    let resp = ResponseBuilder::new(StatusCode::Ok)
        .header("Content-Length", "1024")
        .header("Accept-Ranges", "bytes")
        .build();

    assert_eq!(resp.header("content-length"), Some("1024"));
    assert_eq!(resp.headers.len(), 2);
}

#[test]
fn test_html_response() {
    let resp = Response::html(StatusCode::Ok, "<p>x</p>");
    assert_eq!(resp.header("Content-Type"), Some("text/html"));
    assert_eq!(resp.header("Content-Length"), Some("8"));
}

#[test]
fn test_head_serialization_uses_http_1_0() {
    let resp = Response::html(StatusCode::NotFound, "");
    let head = String::from_utf8(serialize_head(&resp)).unwrap();
    assert!(head.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert!(head.ends_with("\r\n\r\n"));
}

#[tokio::test]
async fn test_writer_reports_bytes_written() {
    let resp = Response::html(StatusCode::Ok, "abc");
    let mut writer = ResponseWriter::new(&resp);
    let mut out = Vec::new();

    writer.write_to_stream(&mut out).await.unwrap();

    assert_eq!(writer.written(), out.len());
    assert_eq!(writer.len(), out.len());
    assert!(out.ends_with(b"abc"));
}

fn responder() -> (tempfile::TempDir, ErrorResponder) {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(AccessLog::open(dir.path()).unwrap());
    (dir, ErrorResponder::new("test-server", log))
}

#[test]
fn test_not_found_page_contents() {
    let (_dir, errors) = responder();
    let page = errors.page(StatusCode::NotFound);
    let body = String::from_utf8(page.body.clone()).unwrap();

    assert_eq!(page.status, StatusCode::NotFound);
    assert!(body.contains("<title>404 Not Found</title>"));
    assert!(body.contains("<h1>404 Not Found</h1>"));
    assert!(body.contains("test-server"));
}

#[test]
fn test_internal_error_page_has_no_footer() {
    let (_dir, errors) = responder();
    let page = errors.page(StatusCode::InternalServerError);
    let body = String::from_utf8(page.body.clone()).unwrap();

    assert!(body.contains("<h1>500 Internal Server Error</h1>"));
    assert!(!body.contains("test-server"));
}
