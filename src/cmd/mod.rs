//! CLI subcommands.

pub mod sweep_once;
