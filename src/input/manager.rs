//! Input manager for handling different file types

use crate::error::{Result, ResumeAnalyzerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

pub struct InputManager {
    cache: HashMap<String, String>,
    enable_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
            enable_cache: true,
        }
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.enable_cache = enable;
        self
    }

    /// Read a document from disk and return its trimmed plain text.
    ///
    /// The extension decides the parser. Unsupported extensions fail before
    /// the file is read.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        let path_str = path.to_string_lossy().to_string();

        if self.enable_cache {
            if let Some(cached_text) = self.cache.get(&path_str) {
                info!("Using cached text for: {}", path.display());
                return Ok(cached_text.clone());
            }
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let file_type = FileType::from_extension(extension);
        if !file_type.is_supported() {
            return Err(unsupported(&format!("{} ({})", path.display(), describe_extension(extension))));
        }

        if !path.exists() {
            return Err(ResumeAnalyzerError::InvalidInput(
                format!("File does not exist: {}", path.display())
            ));
        }

        info!("Extracting {} text from: {}", file_type, path.display());
        let bytes = fs::read(path).await?;
        let text = Self::extract_typed(&bytes, file_type)?;

        if self.enable_cache {
            self.cache.insert(path_str, text.clone());
        }

        Ok(text)
    }

    /// Extract trimmed plain text from an uploaded document given its declared
    /// extension. An empty string is a valid result.
    pub fn extract_from_bytes(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let file_type = FileType::from_extension(extension);
        if !file_type.is_supported() {
            return Err(unsupported(&describe_extension(extension)));
        }
        Self::extract_typed(bytes, file_type)
    }

    fn extract_typed(bytes: &[u8], file_type: FileType) -> Result<String> {
        let raw = match file_type {
            FileType::Pdf => PdfExtractor.extract(bytes)?,
            FileType::Docx => DocxExtractor.extract(bytes)?,
            FileType::Text => PlainTextExtractor.extract(bytes)?,
            FileType::Unknown => return Err(unsupported("unknown")),
        };

        let text = raw.trim().to_string();
        debug!("Extracted {} characters of {} text", text.chars().count(), file_type);
        Ok(text)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_extension(extension: &str) -> String {
    let ext = extension.trim_start_matches('.');
    if ext.is_empty() {
        "no extension".to_string()
    } else {
        format!(".{}", ext)
    }
}

fn unsupported(what: &str) -> ResumeAnalyzerError {
    ResumeAnalyzerError::UnsupportedFormat(format!(
        "{}. Supported: {}",
        what,
        FileType::supported_extensions().join(", ")
    ))
}
