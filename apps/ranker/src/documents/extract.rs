//! Plain-text extraction for PDF and DOCX resumes.

use std::fs::File;
use std::io::Read;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{Document, DocumentKind};

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type")]
    Unsupported,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("DOCX error: {0}")]
    Docx(#[from] zip::result::ZipError),

    #[error("extracted content is empty")]
    EmptyContent,
}

/// Reads one resume file into a `Document`. Empty text is an error.
pub fn extract_document(path: &Path) -> Result<Document, ExtractionError> {
    let kind = DocumentKind::from_path(path).ok_or(ExtractionError::Unsupported)?;

    let content = match kind {
        DocumentKind::Pdf => extract_pdf_text(path)?,
        DocumentKind::Docx => extract_docx_text(path)?,
    };
    if content.is_empty() {
        return Err(ExtractionError::EmptyContent);
    }

    Ok(Document::new(path, content, kind))
}

/// pdf-extract panics on some malformed files; the panic is contained here.
fn extract_pdf_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(&bytes)
    }))
    .map_err(|_| ExtractionError::Pdf("parser panicked on malformed document".to_string()))?;

    let text = extracted.map_err(|e| ExtractionError::Pdf(format!("{e:?}")))?;
    Ok(text.trim().to_string())
}

fn extract_docx_text(path: &Path) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name(DOCX_BODY)?.read_to_string(&mut xml)?;
    Ok(docx_xml_to_text(&xml))
}

/// Text runs plus the run-level tab and break elements Word places between them.
/// Tab stops (`<w:tab w:pos=".."/>` inside `<w:tabs>`) carry attributes and are not matched.
fn run_content_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:(tab)\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>")
            .expect("valid regex")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9A-Fa-f]+|#[0-9]+|lt|gt|quot|apos|amp);").expect("valid regex")
    })
}

/// Joins the content of each `<w:p>` paragraph; empty paragraphs are dropped.
/// `<w:tab/>` becomes `\t`, `<w:br/>` and `<w:cr/>` become `\n`.
pub fn docx_xml_to_text(xml: &str) -> String {
    xml.split("</w:p>")
        .map(paragraph_text)
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn paragraph_text(paragraph: &str) -> String {
    let mut text = String::new();
    for caps in run_content_regex().captures_iter(paragraph) {
        if let Some(run) = caps.get(1) {
            text.push_str(&decode_xml_entities(run.as_str()));
            continue;
        }
        if caps.get(2).is_some() {
            text.push('\t');
        } else {
            text.push('\n');
        }
    }
    text
}

/// Decodes the predefined XML entities and numeric character references in one pass.
/// References to invalid code points are left as written.
fn decode_xml_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Senior </w:t></w:r><w:r><w:t>Engineer</w:t></w:r></w:p>
<w:p></w:p>
<w:p><w:r><w:t>Rust &amp; Go &lt;backend&gt;</w:t></w:r></w:p>
<w:sectPr/></w:body></w:document>"#;

    #[test]
    fn test_docx_paragraphs_are_joined_by_newline() {
        assert_eq!(
            docx_xml_to_text(BODY),
            "Jane Doe\nSenior Engineer\nRust & Go <backend>"
        );
    }

    #[test]
    fn test_docx_without_text_is_empty() {
        assert_eq!(docx_xml_to_text("<w:document><w:body><w:p/></w:body></w:document>"), "");
    }

    #[test]
    fn test_table_and_tab_stop_tags_are_not_text() {
        let xml = concat!(
            "<w:p><w:r><w:t>Z</w:t></w:r></w:p>",
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            "<w:r><w:t>A</w:t><w:tbl>x</w:tbl></w:r></w:p>"
        );
        assert_eq!(docx_xml_to_text(xml), "Z\nA");
    }

    #[test]
    fn test_tabs_and_breaks_separate_runs() {
        let xml = concat!(
            "<w:p><w:r><w:t>O&#8217;Neil</w:t><w:tab/><w:t>Rust</w:t>",
            r#"<w:br/><w:t>Go</w:t><w:br w:type="page"/><w:t>SQL</w:t></w:r></w:p>"#
        );
        assert_eq!(docx_xml_to_text(xml), "O\u{2019}Neil\tRust\nGo\nSQL");
    }

    #[test]
    fn test_numeric_character_references_are_decoded() {
        assert_eq!(decode_xml_entities("2019&#x2013;2024"), "2019\u{2013}2024");
        assert_eq!(decode_xml_entities("caf&#233; &#X41;"), "caf\u{e9} A");
        assert_eq!(decode_xml_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_invalid_references_are_left_alone() {
        assert_eq!(decode_xml_entities("&#xD800; &#99999999999; &nbsp;"), "&#xD800; &#99999999999; &nbsp;");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = extract_document(Path::new("notes.txt")).unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported));
    }

    #[test]
    fn test_corrupt_docx_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, b"definitely not a zip archive").unwrap();
        let err = extract_document(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }

    #[test]
    fn test_corrupt_pdf_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4 garbage").unwrap();
        let err = extract_document(&path).unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Pdf(_) | ExtractionError::EmptyContent
        ));
    }
}
