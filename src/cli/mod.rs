// CLI module for id3meta
//
// Command-line front end over the library entry points. Only compiled into the binary.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};
pub use output::OutputFormatter;
