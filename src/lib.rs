//! # gitlane
//!
//! In-memory commit graphs with branch lanes, laid out for diagram rendering.
//!
//! This facade re-exports the engine ([`core`]) and the HTTP surface ([`server`]).

pub use gitlane_core as core;
pub use gitlane_server as server;
