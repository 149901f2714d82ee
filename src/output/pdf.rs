//! PDF report artifact

use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::analyzer::AnalysisReport;
use crate::processing::matcher::MatchResult;
use chrono::{DateTime, Local};
use log::info;
use printpdf::*;
use std::fs;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "resume_analysis_report.pdf";
pub const REPORT_MIME_TYPE: &str = "application/pdf";

const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const PT_TO_MM: f32 = 0.3528;
/// Rough Helvetica advance width as a fraction of the font size
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 12.0;
const FOOTER_SIZE: f32 = 9.0;

/// A written report file
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
    pub size_bytes: u64,
}

struct ReportContent<'a> {
    match_percentage: f64,
    matched: &'a [String],
    missing: &'a [String],
    generated_at: DateTime<Local>,
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    pages: usize,
}

impl<'a> PageWriter<'a> {
    fn ensure_room(&mut self, height: f32) {
        if self.y - height >= MARGIN_MM {
            return;
        }
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(A4_WIDTH_MM),
            Mm(A4_HEIGHT_MM),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = A4_HEIGHT_MM - MARGIN_MM;
    }

    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        let height = line_height(size);
        self.ensure_room(height);
        self.y -= height;
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn gap(&mut self, size: f32) {
        self.y -= line_height(size) / 2.0;
    }
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.5
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_CHAR_WIDTH_EM * PT_TO_MM
}

fn columns_for(size: f32) -> usize {
    let usable = A4_WIDTH_MM - 2.0 * MARGIN_MM;
    (usable / (size * AVG_CHAR_WIDTH_EM * PT_TO_MM)).floor().max(1.0) as usize
}

/// Greedy word wrap. Words longer than a line get a line of their own.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub struct PdfReportGenerator {
    title: String,
}

impl PdfReportGenerator {
    pub fn new() -> Self {
        Self {
            title: "Resume Analysis Report".to_string(),
        }
    }

    /// Render a full analysis report
    pub fn render(&self, report: &AnalysisReport) -> Result<Vec<u8>> {
        self.render_content(&ReportContent {
            match_percentage: report.match_percentage,
            matched: &report.matched,
            missing: &report.missing,
            generated_at: report.generated_at,
        })
    }

    /// Render just a match result, stamped with the current time
    pub fn render_match(&self, result: &MatchResult) -> Result<Vec<u8>> {
        self.render_content(&ReportContent {
            match_percentage: result.match_percentage(),
            matched: &result.matched,
            missing: &result.missing,
            generated_at: Local::now(),
        })
    }

    /// Render `report` and write it to `path`, creating parent directories
    pub fn write_to(&self, report: &AnalysisReport, path: &Path) -> Result<ReportArtifact> {
        let bytes = self.render(report)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                ResumeAnalyzerError::ReportGeneration(format!("Cannot create {}: {}", parent.display(), e))
            })?;
        }
        fs::write(path, &bytes).map_err(|e| {
            ResumeAnalyzerError::ReportGeneration(format!("Cannot write {}: {}", path.display(), e))
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| REPORT_FILE_NAME.to_string());

        info!("Wrote {} byte report to {}", bytes.len(), path.display());

        Ok(ReportArtifact {
            path: path.to_path_buf(),
            file_name,
            mime_type: REPORT_MIME_TYPE,
            size_bytes: bytes.len() as u64,
        })
    }

    fn render_content(&self, content: &ReportContent) -> Result<Vec<u8>> {
        let (doc, _pages) = self.build_document(content)?;
        doc.save_to_bytes()
            .map_err(|e| ResumeAnalyzerError::ReportGeneration(format!("PDF serialization failed: {:?}", e)))
    }

    fn build_document(&self, content: &ReportContent) -> Result<(PdfDocumentReference, usize)> {
        let (doc, page1, layer1) = PdfDocument::new(
            self.title.as_str(),
            Mm(A4_WIDTH_MM),
            Mm(A4_HEIGHT_MM),
            "Layer 1",
        );

        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ResumeAnalyzerError::ReportGeneration(format!("Font error: {:?}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ResumeAnalyzerError::ReportGeneration(format!("Font error: {:?}", e)))?;

        let layer = doc.get_page(page1).get_layer(layer1);
        let mut writer = PageWriter {
            doc: &doc,
            layer,
            y: A4_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        };

        let title_x = ((A4_WIDTH_MM - text_width(&self.title, TITLE_SIZE)) / 2.0).max(MARGIN_MM);
        writer.line(&self.title, TITLE_SIZE, title_x, &bold);
        writer.gap(TITLE_SIZE);

        writer.line(
            &format!("Match Percentage: {:.2}%", content.match_percentage),
            BODY_SIZE,
            MARGIN_MM,
            &regular,
        );
        writer.gap(BODY_SIZE);

        let sections = [
            ("Matched Skills:", content.matched, "No matches found."),
            ("Missing Skills:", content.missing, "No missing skills!"),
        ];
        for (heading, skills, placeholder) in sections {
            writer.line(heading, HEADING_SIZE, MARGIN_MM, &bold);
            let body = if skills.is_empty() {
                placeholder.to_string()
            } else {
                skills.join(", ")
            };
            for line in wrap_text(&body, columns_for(BODY_SIZE)) {
                writer.line(&line, BODY_SIZE, MARGIN_MM, &regular);
            }
            writer.gap(BODY_SIZE);
        }

        writer.line(
            &format!("Generated on {}", content.generated_at.format("%Y-%m-%d %H:%M:%S")),
            FOOTER_SIZE,
            MARGIN_MM,
            &regular,
        );

        let pages = writer.pages;
        Ok((doc, pages))
    }
}

impl Default for PdfReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn content<'a>(matched: &'a [String], missing: &'a [String]) -> ReportContent<'a> {
        ReportContent {
            match_percentage: 50.0,
            matched,
            missing,
            generated_at: Local::now(),
        }
    }

    fn sample_report() -> AnalysisReport {
        AnalysisReport {
            match_percentage: 50.0,
            matched: vec!["python".to_string()],
            missing: vec!["java".to_string()],
            resume_skills: Default::default(),
            job_skills: Default::default(),
            resume_preview: String::new(),
            threshold_percent: 70,
            embedding_model: "stub".to_string(),
            generated_at: Local::now(),
            source: "resume.txt".to_string(),
            processing_time_ms: 0,
        }
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("python, sql, java", 11), vec!["python,", "sql, java"]);
        assert_eq!(wrap_text("supercalifragilistic a", 5), vec!["supercalifragilistic", "a"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn test_render_is_pdf() {
        let bytes = PdfReportGenerator::new().render(&sample_report()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_empty_lists_render() {
        let result = MatchResult::default();
        let bytes = PdfReportGenerator::new().render_match(&result).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_lists_paginate() {
        let many: Vec<String> = (0..3000).map(|i| format!("skill-{}", i)).collect();
        let generator = PdfReportGenerator::new();

        let (_, pages) = generator.build_document(&content(&[], &[])).unwrap();
        assert_eq!(pages, 1);

        let (_, pages) = generator.build_document(&content(&many, &many)).unwrap();
        assert!(pages > 1);
    }

    #[test]
    fn test_write_to_creates_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reports").join(REPORT_FILE_NAME);

        let artifact = PdfReportGenerator::new().write_to(&sample_report(), &path).unwrap();
        assert_eq!(artifact.file_name, REPORT_FILE_NAME);
        assert_eq!(artifact.mime_type, "application/pdf");
        assert_eq!(artifact.size_bytes, std::fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_write_failure_is_report_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "x").unwrap();

        let err = PdfReportGenerator::new()
            .write_to(&sample_report(), &blocker.join(REPORT_FILE_NAME))
            .unwrap_err();
        assert!(matches!(err, ResumeAnalyzerError::ReportGeneration(_)));
    }
}
