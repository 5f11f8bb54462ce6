//! CLI commands.

pub mod parse;
