// CLI binary entry point for spexdemux

mod cli;

use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

use cli::commands::{command_batch, command_convert, command_info};
use cli::{Commands, Config, OutputFormatter};

fn main() {
    let config = Config::parse();
    init_logging(&config);

    let formatter = OutputFormatter::new(config.format, config.quiet);

    let result = match &config.command {
        Commands::Convert { input, output, to, source, decode } => {
            command_convert(input, output, *to, source, decode, &formatter)
        }
        Commands::Info { files, detailed, source } => {
            command_info(files, *detailed, source, &formatter)
        }
        Commands::Batch { directory, pattern, output_dir, to, source, decode } => {
            command_batch(directory, pattern, output_dir, *to, source, decode, &formatter)
        }
    };

    if let Err(e) = result {
        formatter.print_error(&format!("{:#}", e));
        process::exit(1);
    }
}

/// `RUST_LOG` wins over the verbosity flags
fn init_logging(config: &Config) {
    let default_directive = if config.verbose {
        "spexdemux=debug"
    } else if config.quiet {
        "spexdemux=error"
    } else {
        "spexdemux=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
