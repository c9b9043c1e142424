//! Worldstate Network Layer
//!
//! Provides the outbound HTTP plumbing shared by every provider:
//! - Client factory with a fixed connection-retry policy
//! - GET/POST helpers that classify failures
//! - Syndication feed (RSS/Atom) headline extraction

pub mod client;
pub mod feed;

pub use client::*;
pub use feed::*;
