//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which routes CLI
//! subcommands to their implementations. The dispatcher owns the loaded
//! configuration so every command sees the same settings.

pub mod dispatcher;
pub mod glob;
pub mod list;
pub mod output;
pub mod transform;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
