pub mod pdftohtml;
pub mod pdftotext;
mod poppler;

use crate::error::ScanError;
use std::fmt;

/// An inclusive, 1-based range of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub first: u32,
    pub last: u32,
}

impl PageRange {
    pub fn new(first: u32, last: u32) -> Self {
        PageRange { first, last }
    }

    pub fn page_count(&self) -> u32 {
        self.last.saturating_sub(self.first) + 1
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Trait for text extraction backends.
///
/// Implementations own everything about the external tool (process spawn,
/// temp files, output parsing). The scanner only sees the returned text.
pub trait TextExtractor: Send + Sync {
    /// Number of pages in the document, or `None` when it cannot be read.
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<Option<u32>, ScanError>;

    /// Plain text of the given pages, or of the whole document for `None`.
    fn extract_text(&self, pdf_bytes: &[u8], range: Option<PageRange>)
        -> Result<String, ScanError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
