//! Cauldron CLI library - command handlers and local collaborators
//!
//! Exposed as a library so integration tests and other hosts can reuse the
//! disk-backed collaborators.

pub mod commands;
pub mod common;
pub mod errors;
pub mod host;

pub use common::GlobalOpts;
pub use errors::CliError;
