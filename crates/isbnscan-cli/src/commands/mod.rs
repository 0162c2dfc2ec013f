pub mod check;
pub mod config;
pub mod scan;
pub mod text;

use clap::Args;
use isbnscan_core::config::parse_prefix_list;
use isbnscan_core::{ScanConfig, ScanError};
use std::path::PathBuf;

/// Config file plus per-run overrides shared by the scanning commands.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// JSON config file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Accepted ISBN-13 prefixes, comma separated (e.g. 978,979)
    #[arg(long, value_name = "LIST")]
    pub prefix: Option<String>,

    /// Pages scanned from the start of long PDFs
    #[arg(long, value_name = "N")]
    pub front_pages: Option<u32>,

    /// Pages scanned from the end of long PDFs
    #[arg(long, value_name = "N")]
    pub back_pages: Option<u32>,

    /// Books scanned in parallel
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<ScanConfig, ScanError> {
        let mut config = match &self.config {
            Some(path) => ScanConfig::load(path)?,
            None => ScanConfig::default(),
        };

        if let Some(ref list) = self.prefix {
            config = config.with_prefixes(parse_prefix_list(list));
        }
        if let Some(n) = self.front_pages {
            config.front_pages = n;
        }
        if let Some(n) = self.back_pages {
            config.back_pages = n;
        }
        if let Some(n) = self.jobs {
            config.workers = n;
        }

        Ok(config)
    }
}
