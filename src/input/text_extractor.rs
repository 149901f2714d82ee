//! Text extraction from various file formats

use crate::error::{Result, ResumeAnalyzerError};
use regex::{Captures, Regex};
use std::io::{Cursor, Read};
use std::sync::LazyLock;

// Tab stop definitions are skipped whole. Self-closing `<w:t/>` must come before the
// paired form or its lazy body swallows the following markup.
static DOCX_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(
        r"(?s)<w:tabs>.*?</w:tabs>|<w:t(?:\s[^>]*)?/>|<w:t(?:\s[^>]*)?>(.*?)</w:t>|(</w:p>)|(<w:tab\b[^>]*/>)|(<w:br\b[^>]*/>|<w:cr\b[^>]*/>)",
    )
    .expect("Invalid DOCX token regex")
});
static ENTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"&(#x[0-9a-fA-F]+|#[0-9]+|amp|lt|gt|quot|apos);").expect("Invalid entity regex")
});

pub trait TextExtractor {
    /// Extract raw (untrimmed) text from an in-memory document
    fn extract(&self, bytes: &[u8]) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract panics on some malformed documents instead of erroring
        let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ResumeAnalyzerError::Extraction(format!(
                "Failed to extract text from PDF: {}",
                e
            ))),
            Err(_) => Err(ResumeAnalyzerError::Extraction(
                "Failed to extract text from PDF: malformed document".to_string(),
            )),
        }
    }
}

pub struct DocxExtractor;

impl DocxExtractor {
    const DOCUMENT_PART: &'static str = "word/document.xml";

    fn read_document_xml(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ResumeAnalyzerError::Extraction(format!("Not a valid DOCX archive: {}", e))
        })?;

        let mut part = archive.by_name(Self::DOCUMENT_PART).map_err(|e| {
            ResumeAnalyzerError::Extraction(format!("DOCX is missing {}: {}", Self::DOCUMENT_PART, e))
        })?;

        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| {
            ResumeAnalyzerError::Extraction(format!("Failed to read {}: {}", Self::DOCUMENT_PART, e))
        })?;
        Ok(xml)
    }

    /// Collect `<w:t>` runs, one line per paragraph
    fn xml_to_text(&self, xml: &str) -> String {
        let mut text = String::new();
        for cap in DOCX_TOKEN_REGEX.captures_iter(xml) {
            if let Some(run) = cap.get(1) {
                text.push_str(&decode_entities(run.as_str()));
            } else if cap.get(2).is_some() || cap.get(4).is_some() {
                text.push('\n');
            } else if cap.get(3).is_some() {
                text.push('\t');
            }
        }
        text
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let xml = self.read_document_xml(bytes)?;
        Ok(self.xml_to_text(&xml))
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let content = std::str::from_utf8(bytes).map_err(|e| {
            ResumeAnalyzerError::Extraction(format!("Text file is not valid UTF-8: {}", e))
        })?;
        Ok(content.trim_start_matches('\u{feff}').to_string())
    }
}

fn decode_entities(text: &str) -> String {
    ENTITY_REGEX
        .replace_all(text, |caps: &Captures| {
        let entity = &caps[1];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ if entity.starts_with("#x") => u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32),
            _ => entity[1..].parse::<u32>().ok().and_then(char::from_u32),
        };
        decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
