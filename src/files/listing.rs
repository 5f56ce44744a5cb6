//! HTML index pages for directories.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub modified: Option<SystemTime>,
}

/// The immediate children of a directory, sorted by name.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    identifier: String,
    entries: Vec<ListingEntry>,
}

impl DirectoryListing {
    /// Reads the children of `dir`. Subdirectories are listed, never entered.
    pub async fn scan(dir: &Path, identifier: &str) -> std::io::Result<Self> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            let meta = entry.metadata().await?;
            entries.push(ListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: meta.is_dir(),
                modified: meta.modified().ok(),
            });
        }

        Ok(Self::from_entries(identifier, entries))
    }

    pub fn from_entries(identifier: &str, mut entries: Vec<ListingEntry>) -> Self {
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            identifier: identifier.to_string(),
            entries,
        }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    /// Renders the listing page.
    pub fn render(&self, server_name: &str) -> String {
        let title = escape_html(&self.identifier);
        let heading = match self.identifier.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => escape_html(trimmed),
        };

        let mut html = String::new();
        html.push_str(&format!("<html><head><title>Index of {title}</title></head>"));
        html.push_str(&format!("<body><h1>Index of {heading}</h1>"));
        html.push_str("<hr width=100% align=left size=1>");
        html.push_str("<table border=\"0\" width=100%>");
        html.push_str("<tr><th align=left>Name</th><th align=left>Last Modified</th></tr>");

        for entry in &self.entries {
            let name = escape_html(&entry.name);
            html.push_str(&format!(
                "<tr><td><img width=\"30px\" src=\"/icons/{}.png\"/><a href=\"{}\">{}</a></td><td>{}</td></tr>",
                escape_html(icon_name(entry)),
                escape_html(&self.href(entry)),
                name,
                format_modified(entry.modified),
            ));
        }

        html.push_str("</table>");
        html.push_str("<hr width=100% align=left size=1>");
        html.push_str(&format!("<address>{}</address>", escape_html(server_name)));
        html.push_str("</body></html>\r\n");
        html
    }

    /// Link relative to the listing's own URL.
    ///
    /// `/docs/` links `a.txt` as `a.txt`; `/docs` links it as `docs/a.txt`.
    fn href(&self, entry: &ListingEntry) -> String {
        let mut href = if self.identifier.ends_with('/') {
            entry.name.clone()
        } else {
            let last = self.identifier.rsplit('/').next().unwrap_or_default();
            format!("{}/{}", last, entry.name)
        };
        if entry.is_dir {
            href.push('/');
        }
        href
    }
}

fn icon_name(entry: &ListingEntry) -> &str {
    match entry.name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext,
        _ if entry.is_dir => "folder",
        _ => "file",
    }
}

/// `dd-MMM-yyyy HH:mm` in local time.
pub fn format_modified(modified: Option<SystemTime>) -> String {
    match modified {
        Some(t) => DateTime::<Local>::from(t).format("%d-%b-%Y %H:%M").to_string(),
        None => "-".to_string(),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
