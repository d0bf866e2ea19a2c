//! Airmin CLI library.
//!
//! Logging setup and output formatting shared by the `airmin` binary's
//! subcommands.

pub mod logging;
pub mod output;
