//! docserver - TLS-terminated static document server
//!
//! Core library for the accept, scan, resolve, stream and log pipeline.

pub mod access_log;
pub mod config;
pub mod context;
pub mod files;
pub mod http;
pub mod server;
