//! CLI subcommands.

pub mod backend;
pub mod migrate;
