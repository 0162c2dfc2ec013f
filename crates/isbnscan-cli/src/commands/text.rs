use isbnscan_core::{scan_sections, ScanError};
use std::path::PathBuf;

use super::ConfigArgs;

pub fn run(files: &[PathBuf], config_args: &ConfigArgs) -> Result<(), ScanError> {
    let config = config_args.resolve()?;

    let mut sections = Vec::with_capacity(files.len());
    for path in files {
        let bytes = std::fs::read(path)?;
        sections.push(String::from_utf8_lossy(&bytes).into_owned());
    }

    match scan_sections(&sections, &config) {
        Some(id) => println!("{}  {}", id.kind(), id),
        None => println!("No ISBN found"),
    }

    Ok(())
}
