//! # gitlane-server
//!
//! Server component for gitlane that exposes repositories and their lane
//! layout to rendering clients over a JSON API.

pub mod api;
pub mod config;
pub mod server;

pub use config::{Config, ConfigError};
pub use server::GitlaneServer;
