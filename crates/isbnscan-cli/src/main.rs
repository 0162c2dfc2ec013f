mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::commands::ConfigArgs;

#[derive(Parser)]
#[command(
    name = "isbnscan",
    version,
    about = "Find the ISBN of e-books by scanning their text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan books for their ISBN (one book per file: PDF, HTML or plain text)
    Scan {
        /// Book files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// PDF text extraction backend
        #[arg(long, default_value = "pdftotext", value_parser = ["pdftotext", "pdftohtml"])]
        backend: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Treat the files as ordered sections of one book and scan them
    Text {
        /// Section files in reading order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Validate a single ISBN
    Check {
        /// ISBN-10 or ISBN-13, separators allowed
        isbn: String,

        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan {
            files,
            output,
            backend,
            config,
        } => commands::scan::run(&files, &output, &backend, &config),
        Commands::Text { files, config } => commands::text::run(&files, &config),
        Commands::Check { isbn, config } => commands::check::run(&isbn, &config),
        Commands::Config { config } => commands::config::run(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
