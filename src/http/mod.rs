//! HTTP/1.0-subset protocol handling.
//!
//! Only the request line is understood: the first of up to three lines that
//! begins with `GET`. Headers, bodies and other methods are ignored.
//!
//! # Architecture
//!
//! - **`connection`**: per-connection state machine, owns the stream
//! - **`scanner`**: finds the `GET` line in the incoming bytes
//! - **`request`**: request line, identifier extraction and routing policy
//! - **`response`**: status codes and ordered-header responses
//! - **`writer`**: serializes responses and streams file bodies in chunks
//! - **`mime`**: extension to content-type table
//! - **`error_page`**: 404 and 500 pages
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Scanning   │ ← read up to 3 lines looking for GET
//!        └──────┬──────┘
//!               │ GET line found        (no GET / EOF → Closed, nothing sent)
//!               ▼
//!        ┌─────────────┐
//!        │   Routing   │ ← apply the identifier policy
//!        └──────┬──────┘
//!               ├─ Serve     → Serving   (file, listing, 404 or 500)
//!               └─ NotFound  → Rejecting (404 page)
//!               ▼
//!        ┌─────────────┐
//!        │   Closed    │ ← stream shut down, one request per connection
//!        └─────────────┘
//! ```

pub mod connection;
pub mod error_page;
pub mod mime;
pub mod request;
pub mod response;
pub mod scanner;
pub mod writer;
