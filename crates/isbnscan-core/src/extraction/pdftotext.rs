use crate::error::ScanError;
use crate::extraction::{poppler, PageRange, TextExtractor};
use std::process::Command;
use tracing::debug;

/// Extraction backend using pdftotext (from poppler-utils).
///
/// Page count comes from `pdfinfo`; text from `pdftotext -enc UTF-8`.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        poppler::is_available("pdftotext")
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdftotextExtractor {
    fn page_count(&self, pdf_bytes: &[u8]) -> Result<Option<u32>, ScanError> {
        let tmpfile = poppler::write_temp_pdf(pdf_bytes)?;
        poppler::page_count(tmpfile.path())
    }

    fn extract_text(
        &self,
        pdf_bytes: &[u8],
        range: Option<PageRange>,
    ) -> Result<String, ScanError> {
        let tmpfile = poppler::write_temp_pdf(pdf_bytes)?;

        let mut command = Command::new("pdftotext");
        command.arg("-enc").arg("UTF-8").arg("-q");
        poppler::push_range_args(&mut command, range);
        command.arg(tmpfile.path()).arg("-"); // output to stdout

        let output = poppler::run_tool("pdftotext", &mut command)?;
        let text = clean_output(&String::from_utf8_lossy(&output.stdout));
        debug!(chars = text.len(), range = ?range, "pdftotext output");
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Pages are separated by form feeds; NULs show up in some broken fonts.
fn clean_output(raw: &str) -> String {
    raw.chars()
        .filter(|&c| c != '\u{0000}')
        .map(|c| if c == '\u{000C}' { '\n' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output() {
        let raw = "Copyright page\nISBN 978-0-13-468599-1\n\u{000C}Chapter 1\u{0000}\n";
        assert_eq!(
            clean_output(raw),
            "Copyright page\nISBN 978-0-13-468599-1\n\nChapter 1\n"
        );
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(PdftotextExtractor::new().backend_name(), "pdftotext");
    }
}
