//! Document-root resolution and streaming.

pub mod listing;
pub mod resolver;
