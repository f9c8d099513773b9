use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;

use super::ProcessorError;

/// Supported upload formats. Adding a format means adding a variant here
/// and an arm in `extract_text` — the match is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Docx,
    Txt,
}

impl FileFormat {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(FileFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Some(FileFormat::Docx)
        } else if lower.ends_with(".txt") {
            Some(FileFormat::Txt)
        } else {
            None
        }
    }
}

/// Extract UTF-8 text from raw document bytes. Section boundaries of the
/// source document are preserved as double newlines for the chunker.
pub fn extract_text(bytes: &[u8], filename: &str) -> Result<String, ProcessorError> {
    let format = FileFormat::from_filename(filename).ok_or_else(|| {
        ProcessorError::UnsupportedFormat {
            filename: filename.to_string(),
        }
    })?;

    match format {
        FileFormat::Pdf => extract_pdf(bytes, filename),
        FileFormat::Docx => extract_docx(bytes, filename),
        FileFormat::Txt => extract_txt(bytes),
    }
}

/// Primary strategy is pdf-extract; lopdf walks the pages as the alternate
/// strategy, since PDF parsers vary in what malformed files they tolerate.
fn extract_pdf(bytes: &[u8], filename: &str) -> Result<String, ProcessorError> {
    let primary_error = match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if !text.trim().is_empty() => return Ok(text),
        Ok(_) => "no text content found".to_string(),
        Err(e) => e.to_string(),
    };

    match extract_pdf_lopdf(bytes) {
        Ok(text) if !text.trim().is_empty() => Ok(text),
        Ok(_) => Err(ProcessorError::Extraction {
            filename: filename.to_string(),
            reason: format!("{}; fallback: no text content found", primary_error),
        }),
        Err(fallback_error) => Err(ProcessorError::Extraction {
            filename: filename.to_string(),
            reason: format!("{}; fallback: {}", primary_error, fallback_error),
        }),
    }
}

fn extract_pdf_lopdf(bytes: &[u8]) -> Result<String, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let mut pages = Vec::new();
    for page_number in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| e.to_string())?;
        if !page_text.trim().is_empty() {
            pages.push(page_text.trim().to_string());
        }
    }
    Ok(pages.join("\n\n"))
}

/// DOCX is a zip archive; the document body lives in word/document.xml.
/// Text runs (`w:t`) are gathered per paragraph (`w:p`), and paragraphs
/// become double-newline-separated sections.
fn extract_docx(bytes: &[u8], filename: &str) -> Result<String, ProcessorError> {
    let extraction_error = |reason: String| ProcessorError::Extraction {
        filename: filename.to_string(),
        reason,
    };

    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| extraction_error(format!("not a valid DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| extraction_error(format!("missing document body: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| extraction_error(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let trimmed = paragraph.trim();
                    if !trimmed.is_empty() {
                        paragraphs.push(trimmed.to_string());
                    }
                    paragraph.clear();
                }
                _ => {}
            },
            Ok(Event::Empty(e))
                if matches!(e.name().as_ref(), b"w:br" | b"w:tab") && !paragraph.is_empty() =>
            {
                paragraph.push(' ');
            }
            Ok(Event::Text(t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| extraction_error(format!("malformed document XML: {}", e)))?;
                paragraph.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(extraction_error(format!("malformed document XML: {}", e)));
            }
            _ => {}
        }
    }

    if paragraphs.is_empty() {
        return Err(extraction_error("no text content found".to_string()));
    }
    Ok(paragraphs.join("\n\n"))
}

/// UTF-8 first, Windows-1252 as the legacy single-byte fallback.
fn extract_txt(bytes: &[u8]) -> Result<String, ProcessorError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(text.to_string()),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Ok(decoded.into_owned())
        }
    }
}
