//! Daemon support.
//!
//! The HTTP/GraphQL transport is not part of this crate; the daemon only
//! keeps the store refreshed and reports scrape events.

pub mod config;
