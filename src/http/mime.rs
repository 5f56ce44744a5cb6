//! Extension to content-type lookup.
//!
//! The table is assembled with [`MimeTableBuilder`] and then frozen into a
//! [`MimeTable`], which has no mutating methods. A frozen table can be shared
//! across connection tasks behind an `Arc` without locking.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::Context;

/// Accumulates extension mappings before the table is frozen.
#[derive(Debug, Default)]
pub struct MimeTableBuilder {
    entries: HashMap<String, String>,
}

/// Read-only extension to content-type mapping.
#[derive(Debug, Clone)]
pub struct MimeTable {
    entries: HashMap<String, String>,
}

impl MimeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `extension` to `content_type`, replacing any earlier mapping.
    pub fn insert(mut self, extension: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.entries.insert(extension.into(), content_type.into());
        self
    }

    /// Adds every mapping from a `mime.types` style source.
    ///
    /// Each line has the shape `content-type ext1 ext2 ...`. Lines starting
    /// with `#` and lines with fewer than two fields are skipped.
    pub fn read_from<R: BufRead>(mut self, reader: R) -> std::io::Result<Self> {
        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(content_type) = fields.next() else {
                continue;
            };
            for ext in fields {
                self.entries.insert(ext.to_string(), content_type.to_string());
            }
        }
        Ok(self)
    }

    /// Seeds the fixed extras and freezes the table.
    ///
    /// `text` aliases whatever `txt` maps to (nothing, if `txt` is absent);
    /// `java` and `jar` always get their fixed types.
    pub fn build(mut self) -> MimeTable {
        if let Some(txt) = self.entries.get("txt").cloned() {
            self.entries.insert("text".to_string(), txt);
        }
        self.entries
            .insert("java".to_string(), "text/x-java-source".to_string());
        self.entries
            .insert("jar".to_string(), "application/java-archive".to_string());

        MimeTable {
            entries: self.entries,
        }
    }
}

impl MimeTable {
    /// Loads and freezes the table from a `mime.types` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening mime table {}", path.display()))?;
        let builder = MimeTableBuilder::new()
            .read_from(std::io::BufReader::new(file))
            .with_context(|| format!("reading mime table {}", path.display()))?;
        Ok(builder.build())
    }

    /// Parses a table from in-memory text.
    pub fn parse(text: &str) -> Self {
        // A &str is valid UTF-8, so reading it line by line cannot fail.
        MimeTableBuilder::new()
            .read_from(text.as_bytes())
            .unwrap_or_default()
            .build()
    }

    /// Exact, case-sensitive extension lookup.
    pub fn get(&self, extension: &str) -> Option<&str> {
        self.entries.get(extension).map(|v| v.as_str())
    }

    /// Looks up the content type for a resource identifier.
    ///
    /// The extension is everything after the identifier's last `.`; an
    /// identifier without a `.` has no content type.
    pub fn content_type_for(&self, identifier: &str) -> Option<&str> {
        let (_, ext) = identifier.rsplit_once('.')?;
        self.get(ext)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
