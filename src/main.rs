// CLI binary entry point for id3meta

use std::process;

use clap::Parser;

mod cli;

use cli::commands::{command_detect, command_read};
use cli::{Commands, Config, OutputFormatter};

fn main() {
    let config = Config::parse();

    if config.verbose && std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "debug");
    }
    lovely_env_logger::init_default();

    let formatter = OutputFormatter::new(config.format, config.quiet);

    let result = match &config.command {
        Commands::Read {
            files,
            forward_only,
            output,
        } => command_read(files, *forward_only, output.as_deref(), &formatter),
        Commands::Detect { files } => command_detect(files, &formatter),
    };

    if let Err(e) = result {
        formatter.print_error(&format!("{:#}", e));
        process::exit(1);
    }
}
