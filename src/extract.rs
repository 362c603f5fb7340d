//! Multi-format text extraction.
//!
//! Dispatches on file extension and returns plain text: UTF-8 text files
//! (with a Latin-1 fallback so no file is rejected purely for encoding),
//! PDF via `pdf-extract`, DOCX via ZIP + streaming XML, and JSON
//! pretty-printed so keys and values become searchable.

use std::io::Read;
use std::path::Path;

use crate::error::StoreError;

/// Extensions accepted by [`extract_text`], lowercased.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md", "log", "pdf", "docx", "json"];

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Returns true when the path's extension is one secrag can extract.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Extracts plain text from a file, trimmed of surrounding whitespace.
///
/// Unknown extensions fail with [`StoreError::UnsupportedFormat`];
/// recognized formats that cannot be read or parsed fail with
/// [`StoreError::ExtractionFailed`]. Never panics on malformed input.
pub fn extract_text(path: &Path) -> Result<String, StoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| StoreError::UnsupportedFormat("(none)".to_string()))?;

    let text = match ext.as_str() {
        "txt" | "md" | "log" => extract_plain(path)?,
        "pdf" => extract_pdf(path)?,
        "docx" => extract_docx(path)?,
        "json" => extract_json(path)?,
        _ => return Err(StoreError::UnsupportedFormat(ext)),
    };

    Ok(text.trim().to_string())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, StoreError> {
    std::fs::read(path)
        .map_err(|e| StoreError::ExtractionFailed(format!("{}: {}", path.display(), e)))
}

/// UTF-8 with a byte-to-char Latin-1 fallback, so encoding never rejects a file.
fn extract_plain(path: &Path) -> Result<String, StoreError> {
    let bytes = read_bytes(path)?;
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => Ok(e.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

fn extract_pdf(path: &Path) -> Result<String, StoreError> {
    let bytes = read_bytes(path)?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| StoreError::ExtractionFailed(format!("PDF: {}", e)))
}

fn extract_json(path: &Path) -> Result<String, StoreError> {
    let bytes = read_bytes(path)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|e| StoreError::ExtractionFailed(format!("JSON: {}", e)))?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| StoreError::ExtractionFailed(format!("JSON: {}", e)))
}

fn extract_docx(path: &Path) -> Result<String, StoreError> {
    let bytes = read_bytes(path)?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| StoreError::ExtractionFailed(format!("DOCX: {}", e)))?;
    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|e| StoreError::ExtractionFailed(format!("DOCX: {}", e)))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| StoreError::ExtractionFailed(format!("DOCX: {}", e)))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(StoreError::ExtractionFailed(
                "DOCX: word/document.xml exceeds size limit".to_string(),
            ));
        }
    }
    extract_w_t_elements(&doc_xml)
}

/// Concatenate the text of `w:t` runs; a paragraph end (`w:p`) emits a newline.
fn extract_w_t_elements(xml: &[u8]) -> Result<String, StoreError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(StoreError::ExtractionFailed(format!("DOCX: {}", e))),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_unsupported_extension_returns_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "image.png", b"\x89PNG");
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_extension_returns_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "README", b"hello");
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_plain_utf8() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "notes.txt", "  incident report\n".as_bytes());
        assert_eq!(extract_text(&path).unwrap(), "incident report");
    }

    #[test]
    fn test_plain_latin1_fallback() {
        let tmp = tempfile::TempDir::new().unwrap();
        // 0xE9 is 'é' in Latin-1 and invalid as a standalone UTF-8 byte.
        let path = write_temp(&tmp, "caf.txt", b"caf\xe9 incident");
        let text = extract_text(&path).unwrap();
        assert_eq!(text, "caf\u{e9} incident");
    }

    #[test]
    fn test_invalid_pdf_returns_extraction_failed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "bad.pdf", b"not a pdf");
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, StoreError::ExtractionFailed(_)));
    }

    #[test]
    fn test_invalid_zip_returns_extraction_failed_for_docx() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "bad.docx", b"not a zip");
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, StoreError::ExtractionFailed(_)));
    }

    #[test]
    fn test_json_pretty_printed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "alert.json", br#"{"severity":"high","source":"ids"}"#);
        let text = extract_text(&path).unwrap();
        assert!(text.contains("\"severity\": \"high\""));
        assert!(text.contains("ids"));
    }

    #[test]
    fn test_malformed_json_returns_extraction_failed() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = write_temp(&tmp, "bad.json", b"{truncated");
        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, StoreError::ExtractionFailed(_)));
    }

    #[test]
    fn test_is_supported() {
        assert!(is_supported(Path::new("a/report.PDF")));
        assert!(is_supported(Path::new("notes.md")));
        assert!(!is_supported(Path::new("binary.exe")));
        assert!(!is_supported(Path::new("noext")));
    }
}
