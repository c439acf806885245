//! Subcommand implementations.

pub mod event;
pub mod term;
