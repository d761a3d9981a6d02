use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use mime_guess::from_path;
use pdf_extract::extract_text;
use std::fs;
use std::path::Path;

/// A loaded document, ready to be chunked
#[derive(Debug, Clone)]
pub struct Document {
    /// Plain text content
    pub content: String,
    /// The document's file name
    pub document_id: String,
    pub mime_type: String,
}

impl Document {
    /// Load a text or PDF file
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref();
        let document_id = path
            .file_name()
            .and_then(|name| name.to_str())
            .context("Invalid file name")?
            .to_string();

        let mime_type = from_path(path).first_or_octet_stream().to_string();
        debug!("Detected MIME type: {}", mime_type);

        let content = read_document_content(path, &mime_type)?;

        Ok(Document {
            content,
            document_id,
            mime_type,
        })
    }
}

/// Read the text of a document according to its MIME type
pub fn read_document_content<P: AsRef<Path>>(file_path: P, mime_type: &str) -> Result<String> {
    let path = file_path.as_ref();

    if mime_type.starts_with("text/") {
        info!("Reading text document: {}", path.display());
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()));
    }

    if mime_type.starts_with("application/pdf") {
        info!("Extracting PDF document: {}", path.display());
        let raw = extract_text(path)
            .with_context(|| format!("Failed to extract text from PDF: {}", path.display()))?;
        let content = normalize_whitespace(&raw);
        if content.is_empty() {
            warn!("No text could be extracted from {}", path.display());
        }
        return Ok(content);
    }

    bail!(
        "Unsupported document format: {}. Only text and PDF files are supported.",
        mime_type
    )
}

/// Tidy extracted text so blank lines mark paragraph breaks.
///
/// Carriage returns are dropped and runs of spaces collapse to one. Lines that
/// are empty or whitespace-only separate paragraphs: any run of them between
/// two text lines becomes exactly `"\n\n"`. The result is trimmed.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace('\r', "");

    let mut normalized = String::with_capacity(text.len());
    let mut blank_run = false;

    for line in text.split('\n') {
        let line = collapse_spaces(line);
        if line.trim().is_empty() {
            blank_run = true;
            continue;
        }

        // Separator before every line but the first
        if !normalized.is_empty() {
            normalized.push_str(if blank_run { "\n\n" } else { "\n" });
        }
        normalized.push_str(&line);
        blank_run = false;
    }

    normalized
}

fn collapse_spaces(line: &str) -> String {
    line.split(' ')
        .filter(|word| !word.is_empty())
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        let text = "This  has   multiple    spaces.\n\n\nAnd multiple newlines.\r\nAnd Windows line endings.";
        let expected =
            "This has multiple spaces.\n\nAnd multiple newlines.\nAnd Windows line endings.";
        assert_eq!(normalize_whitespace(text), expected);
    }

    #[test]
    fn test_normalize_drops_whitespace_only_lines() {
        let text = "  first \n   \n\n\n\n second\n";
        assert_eq!(normalize_whitespace(text), "first\n\nsecond");
    }

    #[test]
    fn test_whitespace_only_line_breaks_paragraph() {
        assert_eq!(
            normalize_whitespace("first para\n \nsecond para"),
            "first para\n\nsecond para"
        );
        assert_eq!(
            normalize_whitespace("one\n\t\n \n\ntwo\nthree"),
            "one\n\ntwo\nthree"
        );
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let err = read_document_content("image.png", "image/png").unwrap_err();
        assert!(err.to_string().contains("Unsupported document format"));
    }

    #[test]
    fn test_from_file_reads_text() {
        let path = std::env::temp_dir().join("local_rag_document_test.txt");
        fs::write(&path, "hello\n\nworld").unwrap();

        let document = Document::from_file(&path).unwrap();
        assert_eq!(document.content, "hello\n\nworld");
        assert_eq!(document.document_id, "local_rag_document_test.txt");
        assert_eq!(document.mime_type, "text/plain");

        fs::remove_file(&path).ok();
    }
}
