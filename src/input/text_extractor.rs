//! Text extraction from various file formats

use crate::error::{Result, ScreenerError};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Parser};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::{Cursor, Read};
use std::path::Path;
use tokio::fs;

static HTML_TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));

pub trait TextExtractor {
    fn extract(&self, path: &Path) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        // pdf-extract can panic on malformed files; a blocking task contains that
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string()))
            .await
            .map_err(|e| {
                ScreenerError::PdfExtraction(format!("PDF parser aborted on '{}': {}", path.display(), e))
            })?
            .map_err(|e| {
                ScreenerError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", path.display(), e))
            })?;
        Ok(text)
    }
}

pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path).await?;

        let text = tokio::task::spawn_blocking(move || docx_to_text(&bytes))
            .await
            .map_err(|e| {
                ScreenerError::DocxExtraction(format!("DOCX parser aborted on '{}': {}", path.display(), e))
            })?
            .map_err(|e| {
                ScreenerError::DocxExtraction(format!("Failed to extract text from DOCX '{}': {}", path.display(), e))
            })?;
        Ok(text)
    }
}

/// Paragraph text from the main document part of a DOCX archive, one line per paragraph
pub fn docx_to_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| e.to_string())?
        .read_to_string(&mut xml)
        .map_err(|e| e.to_string())?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" | b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_run_text => {
                text.push_str(&t.unescape().map_err(|e| e.to_string())?);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("malformed document.xml at {}: {}", reader.buffer_position(), e)),
            _ => {}
        }
    }

    Ok(text.trim_end().to_string())
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path).await?)
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    async fn extract(&self, path: &Path) -> Result<String> {
        let markdown_content = fs::read_to_string(path).await?;
        Ok(markdown_to_text(&markdown_content))
    }
}

/// Render markdown to HTML, then strip it down to trimmed non-empty lines
pub fn markdown_to_text(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    let text = html_output
        .replace("<br>", "\n")
        .replace("<br />", "\n")
        .replace("</p>", "\n\n")
        .replace("</li>", "\n")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let clean_text = HTML_TAG_REGEX.replace_all(&text, "");

    clean_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_text() {
        let text = markdown_to_text("# Jane Doe\n\n**Skills**: Rust & Python\n\n- Docker\n- AWS\n");
        assert_eq!(text, "Jane Doe\nSkills: Rust & Python\nDocker\nAWS");
    }

    #[tokio::test]
    async fn test_pdf_garbage_is_an_error() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();
        assert!(PdfExtractor.extract(&path).await.is_err());
    }

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_docx_paragraphs_and_runs() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Skills: Rust </w:t></w:r><w:r><w:t>&amp; Python</w:t></w:r></w:p>
<w:p/>
<w:p><w:r><w:t>Docker</w:t><w:tab/><w:t>AWS</w:t></w:r></w:p>
</w:body></w:document>"#;

        let text = docx_to_text(&docx_bytes(xml)).unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Rust & Python\n\nDocker\tAWS");
    }

    #[test]
    fn test_docx_without_document_part_is_an_error() {
        assert!(docx_to_text(b"PK not really a zip").is_err());
    }
}
