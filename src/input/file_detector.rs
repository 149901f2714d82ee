//! File type detection

use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Pdf,
    Docx,
    Text,
    Unknown,
}

impl FileType {
    /// Accepts `pdf`, `.PDF` and the like
    pub fn from_extension(ext: &str) -> Self {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "docx" => FileType::Docx,
            "txt" => FileType::Text,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FileType::Unknown)
    }

    pub fn supported_extensions() -> &'static [&'static str] {
        &["pdf", "docx", "txt"]
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileType::Pdf => "PDF",
            FileType::Docx => "DOCX",
            FileType::Text => "plain text",
            FileType::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension(".DOCX"), FileType::Docx);
        assert_eq!(FileType::from_extension("Txt"), FileType::Text);
        assert_eq!(FileType::from_extension("rtf"), FileType::Unknown);
        assert_eq!(FileType::from_extension("md"), FileType::Unknown);
    }

    #[test]
    fn test_from_path() {
        assert_eq!(FileType::from_path(Path::new("cv/resume.pdf")), FileType::Pdf);
        assert_eq!(FileType::from_path(Path::new("resume")), FileType::Unknown);
        assert!(!FileType::from_path(Path::new("resume.rtf")).is_supported());
    }
}
