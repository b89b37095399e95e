//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`config`] - Configuration management (init, path, show)
//! - [`fetch`] - Acquire imagery for one or more splits
//! - [`verify`] - Check that every record has a readable image

pub mod config;
pub mod fetch;
pub mod verify;
