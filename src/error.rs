//! Error handling for the resume analyzer

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResumeAnalyzerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("No text found in {0}")]
    EmptyText(String),

    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Report generation failed: {0}")]
    ReportGeneration(String),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResumeAnalyzerError {
    /// Errors the user can fix by supplying better input. These are shown as
    /// warnings rather than failures.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            ResumeAnalyzerError::EmptyText(_) | ResumeAnalyzerError::MissingInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ResumeAnalyzerError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for ResumeAnalyzerError {
    fn from(err: anyhow::Error) -> Self {
        ResumeAnalyzerError::Processing(err.to_string())
    }
}

/// Convert candle core errors to our custom error type
impl From<candle_core::Error> for ResumeAnalyzerError {
    fn from(err: candle_core::Error) -> Self {
        ResumeAnalyzerError::ModelError(err.to_string())
    }
}
