//! Decides which parts of a document are scanned, and in what order.

pub mod sections;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::extraction::{PageRange, TextExtractor};
use crate::identifier::Identifier;
use crate::scanner::IdentifierScanner;
use tracing::{debug, info, warn};

/// Which page ranges of a paged document get extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagePlan {
    /// Short document: extract everything in one call.
    Whole,
    /// Front matter first; back matter only if the front had no ISBN-13.
    FrontThenBack { front: PageRange, back: PageRange },
}

/// Plan the extraction of a document with `total_pages` pages.
pub fn plan_pages(total_pages: u32, config: &ScanConfig) -> PagePlan {
    let front_pages = config.front_pages.max(1);
    if total_pages <= front_pages.saturating_add(config.back_pages) {
        return PagePlan::Whole;
    }

    PagePlan::FrontThenBack {
        front: PageRange::new(1, front_pages),
        back: PageRange::new(total_pages - config.back_pages, total_pages),
    }
}

/// Scan a paged document (PDF) for its ISBN.
///
/// An unknown page count means nothing is scanned and the result is `None`.
/// Extraction errors are returned as-is; deciding what to do with them is up
/// to the caller.
pub fn scan_paged_document(
    pdf_bytes: &[u8],
    extractor: &dyn TextExtractor,
    config: &ScanConfig,
) -> Result<Option<Identifier>, ScanError> {
    let Some(total_pages) = extractor.page_count(pdf_bytes)? else {
        warn!(
            backend = extractor.backend_name(),
            "page count unavailable, document not scanned"
        );
        return Ok(None);
    };
    info!(total_pages, "PDF page count");

    let mut scanner = IdentifierScanner::new(config);

    match plan_pages(total_pages, config) {
        PagePlan::Whole => {
            let text = extractor.extract_text(pdf_bytes, None)?;
            scanner.feed(&text);
        }
        PagePlan::FrontThenBack { front, back } => {
            debug!(pages = %front, count = front.page_count(), "scanning front matter");
            let text = extractor.extract_text(pdf_bytes, Some(front))?;
            scanner.feed(&text);

            if scanner.has_identifier() {
                debug!("ISBN-13 found in front matter, skipping back matter");
            } else {
                debug!(pages = %back, count = back.page_count(), "scanning back matter");
                let text = extractor.extract_text(pdf_bytes, Some(back))?;
                scanner.feed(&text);
            }
        }
    }

    Ok(scanner.into_result())
}
