//! Helpers shared by the poppler-utils backends.

use crate::error::ScanError;
use crate::extraction::PageRange;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::NamedTempFile;
use tracing::warn;

/// Copy the PDF to a temp file so the tools never see the caller's path.
pub(crate) fn write_temp_pdf(pdf_bytes: &[u8]) -> Result<NamedTempFile, ScanError> {
    let mut tmpfile = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| ScanError::Extraction(e.to_string()))?;
    tmpfile
        .write_all(pdf_bytes)
        .map_err(|e| ScanError::Extraction(e.to_string()))?;
    Ok(tmpfile)
}

/// Run a poppler tool and return its output, mapping a missing binary and a
/// non-zero exit to their own errors.
pub(crate) fn run_tool(tool: &str, command: &mut Command) -> Result<Output, ScanError> {
    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ScanError::ToolNotFound {
                tool: tool.to_string(),
            }
        } else {
            ScanError::Extraction(format!("{tool} failed: {e}"))
        }
    })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ScanError::ToolFailed {
            tool: tool.to_string(),
            code,
            stderr,
        });
    }

    Ok(output)
}

/// Add `-f`/`-l` arguments for a page range.
pub(crate) fn push_range_args(command: &mut Command, range: Option<PageRange>) {
    if let Some(range) = range {
        command
            .arg("-f")
            .arg(range.first.to_string())
            .arg("-l")
            .arg(range.last.to_string());
    }
}

/// Page count via `pdfinfo`.
///
/// A missing `pdfinfo` is an error; a failing one (corrupt or encrypted
/// file) only means the page count is unknown.
pub(crate) fn page_count(pdf_path: &Path) -> Result<Option<u32>, ScanError> {
    let mut command = Command::new("pdfinfo");
    command.arg("-enc").arg("UTF-8").arg(pdf_path);

    match run_tool("pdfinfo", &mut command) {
        Ok(output) => Ok(parse_page_count(&String::from_utf8_lossy(&output.stdout))),
        Err(ScanError::ToolFailed { code, stderr, .. }) => {
            warn!(code, stderr = %stderr, "pdfinfo errored out");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read the `Pages:` field from `pdfinfo` output.
pub(crate) fn parse_page_count(info: &str) -> Option<u32> {
    info.lines().find_map(|line| {
        let (field, value) = line.split_once(':')?;
        if field.trim() == "Pages" {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Check if a poppler tool is available on the system.
pub(crate) fn is_available(tool: &str) -> bool {
    Command::new(tool)
        .arg("-v")
        .output()
        .map(|o| o.status.success() || !o.stderr.is_empty())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          Effective Java\n\
                    Producer:       Acrobat Distiller 9.0\n\
                    Tagged:         no\n\
                    Pages:          412\n\
                    Encrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(412));
    }

    #[test]
    fn test_parse_page_count_missing() {
        assert_eq!(parse_page_count("Title: Untitled\nEncrypted: yes\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
        assert_eq!(parse_page_count(""), None);
    }

    #[test]
    fn test_range_args() {
        let mut command = Command::new("pdftotext");
        push_range_args(&mut command, Some(PageRange::new(1, 25)));
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["-f", "1", "-l", "25"]);

        let mut command = Command::new("pdftotext");
        push_range_args(&mut command, None);
        assert_eq!(command.get_args().count(), 0);
    }
}
