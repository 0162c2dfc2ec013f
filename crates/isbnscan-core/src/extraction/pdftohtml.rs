use crate::error::ScanError;
use crate::extraction::{poppler, PageRange, TextExtractor};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::process::Command;
use tracing::warn;

/// Anything shorter than this is an empty shell, usually a DRM-locked file.
const MIN_XML_LEN: usize = 100;

/// Extraction backend using `pdftohtml -xml` (from poppler-utils).
///
/// The XML output positions every text fragment in its own `<text>`
/// element; the fragments are joined with newlines, so a number split over
/// two fragments still reads as one run.
pub struct PdftohtmlExtractor;

impl PdftohtmlExtractor {
    pub fn new() -> Self {
        PdftohtmlExtractor
    }

    /// Check if pdftohtml is available on the system.
    pub fn is_available() -> bool {
        poppler::is_available("pdftohtml")
    }
}

impl Default for PdftohtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdftohtmlExtractor {
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

        let mut command = Command::new("pdftohtml");
        command
            .arg("-xml")
            .arg("-i")
            .arg("-q")
            .arg("-nomerge")
            .arg("-noframes")
            .arg("-enc")
            .arg("UTF-8")
            .arg("-stdout");
        poppler::push_range_args(&mut command, range);
        command.arg(tmpfile.path());

        let output = poppler::run_tool("pdftohtml", &mut command)?;
        if output.stdout.len() < MIN_XML_LEN {
            return Err(ScanError::Drm);
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        Ok(parse_text_elements(&xml))
    }

    fn backend_name(&self) -> &str {
        "pdftohtml"
    }
}

/// Collect the content of every `<text>` element, nested `<b>`/`<i>`
/// included. Malformed XML ends the parse with whatever was read so far.
fn parse_text_elements(xml: &str) -> String {
    let cleaned: String = xml
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();

    let mut reader = Reader::from_str(&cleaned);

    let mut fragments: Vec<String> = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == b"text" {
                    depth += 1;
                    current.clear();
                } else if depth > 0 {
                    depth += 1;
                }
            }
            Ok(Event::End(ref e)) => {
                if depth == 0 {
                    continue;
                }
                depth -= 1;
                if depth == 0 && e.name().as_ref() == b"text" && !current.is_empty() {
                    fragments.push(std::mem::take(&mut current));
                }
            }
            Ok(Event::Text(e)) => {
                if depth > 0 {
                    match e.unescape() {
                        Ok(text) => current.push_str(&text),
                        Err(_) => current.push_str(&String::from_utf8_lossy(&e)),
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, position = reader.buffer_position(), "malformed pdftohtml XML");
                break;
            }
            _ => {}
        }
    }

    if !current.is_empty() {
        fragments.push(current);
    }
    fragments.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_elements() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE pdf2xml SYSTEM "pdf2xml.dtd">
<pdf2xml producer="poppler" version="23.02.0">
<page number="4" position="absolute" top="0" left="0" height="892" width="595">
    <fontspec id="0" size="9" family="Times" color="#000000"/>
<text top="700" left="72" width="200" height="10" font="0">Copyright &#169; 2018 Pearson Education</text>
<text top="712" left="72" width="200" height="10" font="0"><b>ISBN-13:</b> 978-0-13-</text>
<text top="724" left="72" width="200" height="10" font="0">468599-1</text>
</page>
</pdf2xml>"##;
        let text = parse_text_elements(xml);
        assert_eq!(
            text,
            "Copyright \u{a9} 2018 Pearson Education\nISBN-13: 978-0-13-\n468599-1"
        );
    }

    #[test]
    fn test_parse_ignores_text_outside_elements() {
        let xml = "<pdf2xml><page number=\"1\">stray<text>inside</text></page></pdf2xml>";
        assert_eq!(parse_text_elements(xml), "inside");
    }

    #[test]
    fn test_malformed_xml_keeps_prefix() {
        let xml = "<pdf2xml><text>ISBN 0-306-40615-2</text><text>broken</oops></pdf2xml>";
        let text = parse_text_elements(xml);
        assert!(text.starts_with("ISBN 0-306-40615-2"));
    }

    #[test]
    fn test_control_characters_removed() {
        let xml = "<pdf2xml><text>ISBN\u{0001} 0-306-40615-2</text></pdf2xml>";
        assert_eq!(parse_text_elements(xml), "ISBN 0-306-40615-2");
    }
}
