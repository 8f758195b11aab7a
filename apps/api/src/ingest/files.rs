//! Plain-text extraction from uploaded notes and resumes.
//!
//! Readers never fail outward: any problem comes back as a string starting
//! with `READ_ERROR_PREFIX` in place of the content.

use std::fs::File;
use std::io::{Read, Write};
use std::panic;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::warn;

pub const READ_ERROR_PREFIX: &str = "Error reading file: ";

const SUPPORTED_FILE_TYPES: &[&str] = &[".txt", ".md", ".pdf", ".docx"];
const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
enum FileReadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PDF: {0}")]
    Pdf(String),

    #[error("invalid DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("invalid DOCX document: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub fn supported_file_types() -> &'static [&'static str] {
    SUPPORTED_FILE_TYPES
}

/// True when `text` is a reader error message rather than file content.
pub fn is_read_error(text: &str) -> bool {
    text.starts_with(READ_ERROR_PREFIX)
}

/// Reads `.pdf`, `.docx` or any UTF-8 text file. An empty path yields an
/// empty string.
pub fn read_uploaded_file(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return String::new();
    }

    match read_by_extension(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to read {}: {e}", path.display());
            format!("{READ_ERROR_PREFIX}{e}")
        }
    }
}

/// Reads uploaded bytes by spilling them to a temp file that keeps the
/// original extension, so the same readers apply.
pub fn read_upload(file_name: Option<&str>, bytes: &[u8]) -> String {
    let suffix = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_else(|| ".txt".to_string());

    let spilled = tempfile::Builder::new()
        .prefix("tabchat-upload-")
        .suffix(&suffix)
        .tempfile()
        .and_then(|mut file| {
            file.write_all(bytes)?;
            file.flush()?;
            Ok(file)
        });

    match spilled {
        Ok(file) => read_uploaded_file(file.path()),
        Err(e) => {
            warn!("Failed to buffer upload: {e}");
            format!("{READ_ERROR_PREFIX}{e}")
        }
    }
}

fn read_by_extension(path: &Path) -> Result<String, FileReadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => read_pdf(path),
        "docx" => read_docx(path),
        _ => Ok(std::fs::read_to_string(path)?),
    }
}

fn read_pdf(path: &Path) -> Result<String, FileReadError> {
    // pdf-extract reports a missing file as a PDF error; surface the io error instead
    std::fs::metadata(path)?;
    // pdf-extract panics on many malformed documents instead of returning an error
    let text = panic::catch_unwind(|| pdf_extract::extract_text(path))
        .map_err(|_| FileReadError::Pdf("PDF could not be parsed".to_string()))?
        .map_err(|e| FileReadError::Pdf(e.to_string()))?;
    Ok(text.trim().to_string())
}

fn read_docx(path: &Path) -> Result<String, FileReadError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;
    docx_paragraphs(&xml).map(|paragraphs| paragraphs.join("\n").trim().to_string())
}

/// Collects the text of every `<w:p>` paragraph in a WordprocessingML body.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, FileReadError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Event::Text(t) if in_text => current.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs)
}
