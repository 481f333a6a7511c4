// CLI configuration
use clap::{Parser, Subcommand};

use super::output::OutputFormat;

/// id3meta - read common ID3 fields from MP3 files
#[derive(Parser, Debug)]
#[command(name = "id3meta")]
#[command(about = "Read the common ID3v1/ID3v2 metadata fields of MP3 files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (only print errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read metadata from audio file(s)
    Read {
        /// Audio file path(s) or glob patterns, "-" reads standard input
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Only look for a leading ID3v2 tag, without seeking
        #[arg(long)]
        forward_only: bool,

        /// Output to file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Detect which tags a file carries
    Detect {
        /// Audio file path(s) or glob patterns
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,
    },
}
