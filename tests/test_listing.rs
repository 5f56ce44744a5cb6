mod common;

use std::time::{Duration, SystemTime};

use common::fixture;
use docserver::files::listing::{DirectoryListing, ListingEntry, format_modified};
use docserver::files::resolver::{ResourceHandler, join_identifier};

#[tokio::test]
async fn test_scan_lists_immediate_children_sorted() {
    let fx = fixture();
    fx.write("docs/zeta.txt", b"z");
    fx.write("docs/Alpha.txt", b"A");
    fx.write("docs/beta.txt", b"b");
    fx.write("docs/nested/inner.txt", b"i");

    let listing = DirectoryListing::scan(&fx.root.path().join("docs"), "/docs/")
        .await
        .unwrap();
    let names: Vec<_> = listing.entries().iter().map(|e| e.name.as_str()).collect();

    assert_eq!(names, vec!["Alpha.txt", "beta.txt", "nested", "zeta.txt"]);
    assert!(listing.entries()[2].is_dir);
    assert!(listing.entries().iter().all(|e| e.modified.is_some()));
}

#[tokio::test]
async fn test_scan_missing_directory_fails() {
    let fx = fixture();
    assert!(DirectoryListing::scan(&fx.root.path().join("nope"), "/nope").await.is_err());
}

#[test]
fn test_render_page_structure() {
    let listing = DirectoryListing::from_entries(
        "/images/",
        vec![ListingEntry {
            name: "car.jpg".to_string(),
            is_dir: false,
            modified: None,
        }],
    );
    let html = listing.render("test-server");

    assert!(html.contains("<title>Index of /images/</title>"));
    assert!(html.contains("<h1>Index of /images</h1>"));
    assert!(html.contains("<img width=\"30px\" src=\"/icons/jpg.png\"/><a href=\"car.jpg\">car.jpg</a>"));
    assert!(html.contains("<th align=left>Last Modified</th>"));
    assert!(html.contains("<address>test-server</address>"));
}

#[test]
fn test_render_root_heading() {
    let html = DirectoryListing::from_entries("/", vec![]).render("s");
    assert!(html.contains("<h1>Index of /</h1>"));
}

#[test]
fn test_modified_time_format() {
    let formatted = format_modified(Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000)));
    // dd-MMM-yyyy HH:mm in local time
    let parts: Vec<_> = formatted.split(' ').collect();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].len(), "09-Sep-2001".len());
    assert_eq!(parts[1].len(), "01:46".len());
    assert!(parts[0].ends_with("-2001"));

    assert_eq!(format_modified(None), "-");
}

#[test]
fn test_join_identifier_does_not_normalize() {
    let root = std::path::Path::new("/srv/html");
    assert_eq!(join_identifier(root, "/a/b.txt"), std::path::PathBuf::from("/srv/html/a/b.txt"));
    assert_eq!(
        join_identifier(root, "/../etc/passwd"),
        std::path::PathBuf::from("/srv/html/../etc/passwd")
    );
}

#[tokio::test]
async fn test_resolve_file_and_directory() {
    let fx = fixture();
    fx.write("index.html", b"12345");
    fx.mkdir("images");
    let handler = ResourceHandler::new(&fx.ctx);

    let file = handler.resolve("/index.html").await;
    assert!(file.exists);
    assert!(!file.is_directory);
    assert_eq!(file.size_bytes, 5);
    assert_eq!(file.content_type.as_deref(), Some("text/html"));
    assert!(file.last_modified.is_some());

    let dir = handler.resolve("/images").await;
    assert!(dir.exists);
    assert!(dir.is_directory);

    let missing = handler.resolve("/gone.txt").await;
    assert!(!missing.exists);
    assert_eq!(missing.content_type.as_deref(), Some("text/plain"));
}
