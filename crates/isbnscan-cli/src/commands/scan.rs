use isbnscan_core::batch::{BatchRunner, BookJob};
use isbnscan_core::extraction::pdftohtml::PdftohtmlExtractor;
use isbnscan_core::extraction::pdftotext::PdftotextExtractor;
use isbnscan_core::{ScanError, TextExtractor};
use std::path::PathBuf;

use super::ConfigArgs;
use crate::output;

pub fn run(
    files: &[PathBuf],
    output_format: &str,
    backend: &str,
    config_args: &ConfigArgs,
) -> Result<(), ScanError> {
    let config = config_args.resolve()?;

    let extractor: Box<dyn TextExtractor> = match backend {
        "pdftohtml" => Box::new(PdftohtmlExtractor::new()),
        _ => Box::new(PdftotextExtractor::new()),
    };

    let jobs: Vec<BookJob> = files
        .iter()
        .enumerate()
        .map(|(i, path)| BookJob::from_path(i as u64 + 1, path))
        .collect();

    let report = BatchRunner::new(config.workers).run(&jobs, extractor.as_ref(), &config)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print(&report),
    }

    Ok(())
}
