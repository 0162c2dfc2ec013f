pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod identifier;
pub mod scanner;
pub mod strategy;

pub use config::ScanConfig;
pub use error::ScanError;
pub use extraction::{PageRange, TextExtractor};
pub use identifier::{Identifier, IsbnKind};
pub use scanner::IdentifierScanner;
pub use strategy::scan_paged_document;
pub use strategy::sections::scan_sections;

/// Find the best ISBN in a single block of text.
///
/// Equivalent to feeding `text` to a fresh [`IdentifierScanner`] and reading
/// its result.
pub fn scan_text(text: &str, config: &ScanConfig) -> Option<Identifier> {
    let mut scanner = IdentifierScanner::new(config);
    scanner.feed(text);
    scanner.into_result()
}

