//! Subcommand handlers.

pub mod info;
pub mod record;
