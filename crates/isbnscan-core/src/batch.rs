//! Scanning many books: format fallback per book, a bounded worker pool
//! across books, and the summary report.

use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::extraction::TextExtractor;
use crate::identifier::{normalize, Identifier};
use crate::strategy::scan_paged_document;
use crate::strategy::sections::scan_sections;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Html,
    Text,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<DocumentFormat> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "html" | "htm" | "xhtml" => Some(DocumentFormat::Html),
            "txt" | "text" => Some(DocumentFormat::Text),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Html => write!(f, "HTML"),
            DocumentFormat::Text => write!(f, "TXT"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookFormat {
    pub format: DocumentFormat,
    pub path: PathBuf,
}

/// One book to scan: its available formats in order of preference.
#[derive(Debug, Clone, Serialize)]
pub struct BookJob {
    pub id: u64,
    pub title: Option<String>,
    pub formats: Vec<BookFormat>,
    /// ISBN the library already has for this book, if any.
    pub existing_isbn: Option<String>,
}

impl BookJob {
    /// A single-file book titled after the file stem. Files with an
    /// unsupported extension produce a job without formats.
    pub fn from_path(id: u64, path: &Path) -> BookJob {
        let formats = DocumentFormat::from_path(path)
            .map(|format| BookFormat {
                format,
                path: path.to_path_buf(),
            })
            .into_iter()
            .collect();

        BookJob {
            id,
            title: path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned()),
            formats,
            existing_isbn: None,
        }
    }

    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("Book #{}", self.id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookOutcome {
    /// A new or different ISBN was found.
    Extracted { isbn: Identifier },
    /// The ISBN found is the one the book already has.
    Unchanged { isbn: Identifier },
    NotFound,
    NoFormats,
    /// The batch was aborted before this book was scanned.
    Skipped,
}

impl BookOutcome {
    pub fn isbn(&self) -> Option<&Identifier> {
        match self {
            BookOutcome::Extracted { isbn } | BookOutcome::Unchanged { isbn } => Some(isbn),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BookOutcome::NotFound | BookOutcome::NoFormats)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookResult {
    pub id: u64,
    pub title: String,
    pub outcome: BookOutcome,
    pub scan_ms: u64,
}

/// Scan one book, trying its formats in order until one yields an ISBN.
///
/// A format that fails to extract is logged and skipped.
pub fn scan_book(
    job: &BookJob,
    extractor: &dyn TextExtractor,
    config: &ScanConfig,
) -> BookOutcome {
    let title = job.display_title();
    if job.formats.is_empty() {
        error!(title = %title, "no formats available");
        return BookOutcome::NoFormats;
    }

    let start = Instant::now();
    for book_format in &job.formats {
        info!(
            title = %title,
            format = %book_format.format,
            path = %book_format.path.display(),
            "scanning"
        );
        match scan_format(book_format, extractor, config) {
            Ok(Some(isbn)) => {
                info!(
                    title = %title,
                    isbn = %isbn,
                    secs = start.elapsed().as_secs_f64(),
                    "ISBN found"
                );
                return classify(job, isbn);
            }
            Ok(None) => debug!(format = %book_format.format, "no ISBN in format"),
            Err(e) => warn!(format = %book_format.format, error = %e, "scan failed"),
        }
    }

    info!(
        title = %title,
        secs = start.elapsed().as_secs_f64(),
        "failed to find an ISBN"
    );
    BookOutcome::NotFound
}

fn scan_format(
    book_format: &BookFormat,
    extractor: &dyn TextExtractor,
    config: &ScanConfig,
) -> Result<Option<Identifier>, ScanError> {
    match book_format.format {
        DocumentFormat::Pdf => {
            let pdf_bytes = std::fs::read(&book_format.path)?;
            scan_paged_document(&pdf_bytes, extractor, config)
        }
        DocumentFormat::Html | DocumentFormat::Text => {
            let bytes = std::fs::read(&book_format.path)?;
            let text = String::from_utf8_lossy(&bytes);
            Ok(scan_sections(&[text], config))
        }
    }
}

fn classify(job: &BookJob, isbn: Identifier) -> BookOutcome {
    let same = job
        .existing_isbn
        .as_deref()
        .is_some_and(|existing| normalize(existing) == isbn.digits());
    if same {
        debug!(isbn = %isbn, "identical ISBN extracted");
        BookOutcome::Unchanged { isbn }
    } else {
        BookOutcome::Extracted { isbn }
    }
}

/// Runs book scans on a bounded thread pool.
///
/// Each worker owns its scanner for the book it is processing; nothing is
/// shared between books except the read-only config and extractor.
pub struct BatchRunner {
    workers: usize,
    abort: Arc<AtomicBool>,
}

impl BatchRunner {
    pub fn new(workers: usize) -> Self {
        BatchRunner {
            workers: workers.max(1),
            abort: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Setting this flag makes the runner skip every book not yet started.
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.abort)
    }

    pub fn run(
        &self,
        jobs: &[BookJob],
        extractor: &dyn TextExtractor,
        config: &ScanConfig,
    ) -> Result<BatchReport, ScanError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| ScanError::WorkerPool(e.to_string()))?;

        let total = jobs.len();
        let done = AtomicUsize::new(0);
        info!(books = total, workers = self.workers, "starting batch scan");

        let results = pool.install(|| {
            jobs.par_iter()
                .map(|job| {
                    let start = Instant::now();
                    let outcome = if self.abort.load(Ordering::Relaxed) {
                        BookOutcome::Skipped
                    } else {
                        scan_book(job, extractor, config)
                    };
                    let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!(count, total, "scanned");
                    BookResult {
                        id: job.id,
                        title: job.display_title(),
                        outcome,
                        scan_ms: start.elapsed().as_millis() as u64,
                    }
                })
                .collect::<Vec<_>>()
        });

        let report = BatchReport { results };
        info!(failures = report.failed().count(), "scan complete");
        Ok(report)
    }
}

/// Per-book results of a batch, in job order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<BookResult>,
}

impl BatchReport {
    pub fn extracted(&self) -> impl Iterator<Item = &BookResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, BookOutcome::Extracted { .. }))
    }

    pub fn unchanged(&self) -> impl Iterator<Item = &BookResult> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, BookOutcome::Unchanged { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &BookResult> {
        self.results.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &BookResult> {
        self.results
            .iter()
            .filter(|r| r.outcome == BookOutcome::Skipped)
    }

    /// One line per book: failures and skipped books, then unchanged ISBNs,
    /// then extracted ones, groups separated by a dashed line.
    pub fn details(&self) -> String {
        let mut groups: Vec<Vec<String>> = Vec::new();

        groups.push(
            self.results
                .iter()
                .filter_map(|r| match r.outcome {
                    BookOutcome::NoFormats => Some(format!("{} (No formats)", r.title)),
                    BookOutcome::NotFound => Some(format!("{} (ISBN not found)", r.title)),
                    BookOutcome::Skipped => Some(format!("{} (Skipped)", r.title)),
                    _ => None,
                })
                .collect(),
        );
        groups.push(
            self.unchanged()
                .map(|r| format!("{} (Same ISBN)", r.title))
                .collect(),
        );
        groups.push(
            self.extracted()
                .filter_map(|r| {
                    r.outcome
                        .isbn()
                        .map(|isbn| format!("{} (Extracted {})", r.title, isbn))
                })
                .collect(),
        );

        let mut lines: Vec<String> = Vec::new();
        for group in groups.into_iter().filter(|g| !g.is_empty()) {
            if !lines.is_empty() {
                lines.push("-".repeat(34));
            }
            lines.extend(group);
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u64, title: &str, outcome: BookOutcome) -> BookResult {
        BookResult {
            id,
            title: title.to_string(),
            outcome,
            scan_ms: 0,
        }
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.PDF")), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_path(Path::new("c.xhtml")), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_path(Path::new("c.txt")), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_path(Path::new("c.mobi")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_job_from_path() {
        let job = BookJob::from_path(7, Path::new("/books/Effective Java.pdf"));
        assert_eq!(job.title.as_deref(), Some("Effective Java"));
        assert_eq!(job.formats.len(), 1);

        let job = BookJob::from_path(8, Path::new("/books/notes.mobi"));
        assert!(job.formats.is_empty());
    }

    #[test]
    fn test_classify_against_existing_isbn() {
        let isbn = Identifier::validate("9780134685991").unwrap();
        let mut job = BookJob::from_path(1, Path::new("book.pdf"));

        job.existing_isbn = Some("978-0-13-468599-1".into());
        assert!(matches!(classify(&job, isbn.clone()), BookOutcome::Unchanged { .. }));

        job.existing_isbn = Some("0306406152".into());
        assert!(matches!(classify(&job, isbn.clone()), BookOutcome::Extracted { .. }));

        job.existing_isbn = None;
        assert!(matches!(classify(&job, isbn), BookOutcome::Extracted { .. }));
    }

    #[test]
    fn test_details_grouping() {
        let isbn = Identifier::validate("9780134685991").unwrap();
        let report = BatchReport {
            results: vec![
                result(1, "Found", BookOutcome::Extracted { isbn: isbn.clone() }),
                result(2, "Missing", BookOutcome::NotFound),
                result(3, "Same", BookOutcome::Unchanged { isbn }),
                result(4, "Empty", BookOutcome::NoFormats),
            ],
        };

        let separator = "-".repeat(34);
        let expected = [
            "Missing (ISBN not found)",
            "Empty (No formats)",
            separator.as_str(),
            "Same (Same ISBN)",
            separator.as_str(),
            "Found (Extracted 9780134685991)",
        ]
        .join("\n");
        assert_eq!(report.details(), expected);
        assert_eq!(report.failed().count(), 2);
    }

    #[test]
    fn test_details_without_separators() {
        let report = BatchReport {
            results: vec![result(1, "Missing", BookOutcome::NotFound)],
        };
        assert_eq!(report.details(), "Missing (ISBN not found)");
    }
}
