//! CLI command implementations.

pub mod common;
pub mod config;
pub mod init;
pub mod resolve;
pub mod stats;
