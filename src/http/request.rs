/// The `GET` line found by the request scanner.
///
/// Only the resource identifier is extracted; the version token and any
/// headers that followed are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    raw: String,
}

/// What the connection should do with a request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Resolve and stream this identifier.
    Serve(String),
    /// Answer with the not-found page.
    NotFound,
}

impl RequestLine {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The line as received, without its terminator. Used verbatim in the
    /// access log.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Second whitespace-delimited token, e.g. `/index.html` in
    /// `GET /index.html HTTP/1.0`.
    pub fn identifier(&self) -> Option<&str> {
        self.raw.split_whitespace().nth(1)
    }

    /// Applies the routing policy.
    ///
    /// | identifier        | route                     |
    /// |-------------------|---------------------------|
    /// | absent            | not found                 |
    /// | `/`               | serve `default_resource`  |
    /// | starts with `//`  | not found                 |
    /// | anything else     | serve as-is               |
    pub fn route(&self, default_resource: &str) -> Route {
        match self.identifier() {
            None => Route::NotFound,
            Some("/") => Route::Serve(default_resource.to_string()),
            Some(id) if id.starts_with("//") => Route::NotFound,
            Some(id) => Route::Serve(id.to_string()),
        }
    }
}
