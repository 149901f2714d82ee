//! Integration tests for the resume analyzer

use resume_analyzer::config::{Config, OutputFormat};
use resume_analyzer::error::{Result, ResumeAnalyzerError};
use resume_analyzer::input::InputManager;
use resume_analyzer::output::formatter::ReportGenerator;
use resume_analyzer::output::pdf::{PdfReportGenerator, REPORT_FILE_NAME, REPORT_MIME_TYPE};
use resume_analyzer::processing::analyzer::AnalysisEngine;
use resume_analyzer::processing::embeddings::Embedder;
use resume_analyzer::processing::skills::SkillVocabulary;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::TempDir;
use zip::write::FileOptions;

/// Identical skills are similar, everything else is orthogonal
struct OneHotEmbedder {
    vocabulary: SkillVocabulary,
}

impl OneHotEmbedder {
    fn new() -> Self {
        Self { vocabulary: SkillVocabulary::default() }
    }
}

impl Embedder for OneHotEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; self.vocabulary.len()];
        if let Some(index) = self.vocabulary.terms().iter().position(|t| t == text) {
            vector[index] = 1.0;
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "one-hot"
    }
}

fn engine() -> AnalysisEngine {
    AnalysisEngine::new(&Config::default(), Box::new(OneHotEmbedder::new())).unwrap()
}

#[tokio::test]
async fn test_text_extraction_from_txt() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let result = manager.extract_text(path).await;
    assert!(result.is_ok());

    let text = result.unwrap();
    assert!(text.contains("John Doe"));
    assert!(text.contains("Software Engineer"));
    assert!(text.contains("React"));
    assert!(text.contains("Node.js"));
}

#[tokio::test]
async fn test_text_extraction_from_docx() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resume.docx");

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        writer.start_file("word/document.xml", FileOptions::default()).unwrap();
        writer
            .write_all(
                br#"<?xml version="1.0"?><w:document><w:body>
                <w:p><w:r><w:t>Jane Roe</w:t></w:r></w:p>
                <w:p><w:r><w:t xml:space="preserve">Python &amp; SQL</w:t></w:r></w:p>
                </w:body></w:document>"#,
            )
            .unwrap();
        writer.finish().unwrap();
    }
    std::fs::write(&path, buffer.into_inner()).unwrap();

    let mut manager = InputManager::new();
    let text = manager.extract_text(&path).await.unwrap();
    assert!(text.starts_with("Jane Roe"));
    assert!(text.contains("Python & SQL"));
}

#[tokio::test]
async fn test_caching_functionality() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/sample_resume.txt");

    let text1 = manager.extract_text(path).await.unwrap();
    assert_eq!(manager.cache_size(), 1);

    let text2 = manager.extract_text(path).await.unwrap();
    assert_eq!(text1, text2);
    assert_eq!(manager.cache_size(), 1);

    manager.clear_cache();
    assert_eq!(manager.cache_size(), 0);
}

#[tokio::test]
async fn test_unsupported_file_type() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/unsupported.rtf");

    let err = manager.extract_text(path).await.unwrap_err();
    assert!(matches!(err, ResumeAnalyzerError::UnsupportedFormat(_)));
}

#[tokio::test]
async fn test_nonexistent_file() {
    let mut manager = InputManager::new();
    let path = Path::new("tests/fixtures/nonexistent.txt");

    let result = manager.extract_text(path).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_empty_resume_is_warning() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.txt");
    std::fs::write(&path, "  \n\n ").unwrap();

    let mut manager = InputManager::new();
    let text = manager.extract_text(&path).await.unwrap();
    assert!(text.is_empty());

    let job = std::fs::read_to_string("tests/fixtures/sample_job.txt").unwrap();
    let err = engine().analyze(&text, &job, "empty.txt").unwrap_err();
    assert!(matches!(err, ResumeAnalyzerError::EmptyText(_)));
    assert!(err.is_warning());
}

#[tokio::test]
async fn test_full_analysis_pipeline() {
    let mut manager = InputManager::new();
    let resume_text = manager
        .extract_text(Path::new("tests/fixtures/sample_resume.txt"))
        .await
        .unwrap();
    let job_text = manager
        .extract_text(Path::new("tests/fixtures/sample_job.txt"))
        .await
        .unwrap();

    let report = engine().analyze(&resume_text, &job_text, "sample_resume.txt").unwrap();

    assert_eq!(
        report.resume_skills.as_slice(),
        &["python", "sql", "react", "node", "django", "communication", "teamwork", "data analysis"]
    );
    assert_eq!(
        report.job_skills.as_slice(),
        &[
            "python", "sql", "machine learning", "deep learning", "communication",
            "problem solving", "tensorflow", "pytorch",
        ]
    );
    assert_eq!(report.matched, vec!["python", "sql", "communication"]);
    assert_eq!(
        report.missing,
        vec!["machine learning", "deep learning", "problem solving", "tensorflow", "pytorch"]
    );
    assert_eq!(report.match_percentage, 37.5);
    assert!(report.resume_preview.starts_with("John Doe"));

    let json = ReportGenerator::with_options(false, true)
        .generate_report(&report, OutputFormat::Json)
        .unwrap();
    assert!(json.contains("\"match_percentage\": 37.5"));
}

#[tokio::test]
async fn test_pdf_report_artifact() {
    let report = engine()
        .analyze("Python and SQL developer", "Python, Java", "resume.txt")
        .unwrap();
    assert_eq!(report.match_percentage, 50.0);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(REPORT_FILE_NAME);
    let artifact = PdfReportGenerator::new().write_to(&report, &path).unwrap();

    assert_eq!(artifact.file_name, "resume_analysis_report.pdf");
    assert_eq!(artifact.mime_type, REPORT_MIME_TYPE);
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(artifact.size_bytes, bytes.len() as u64);
}
