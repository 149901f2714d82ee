//! Analysis engine combining skill extraction and semantic matching

use crate::config::Config;
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::embeddings::Embedder;
use crate::processing::matcher::{MatchResult, SimilarityMatcher, SimilarityThreshold};
use crate::processing::skills::{SkillExtractor, SkillSet, SkillVocabulary};
use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Everything produced by one résumé/job comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Share of job skills covered by the résumé, 0-100, two decimals
    pub match_percentage: f64,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
    pub resume_skills: SkillSet,
    pub job_skills: SkillSet,
    pub resume_preview: String,
    pub threshold_percent: u8,
    pub embedding_model: String,
    pub generated_at: DateTime<Local>,
    pub source: String,
    pub processing_time_ms: u64,
}

impl AnalysisReport {
    pub fn match_result(&self) -> MatchResult {
        MatchResult {
            matched: self.matched.clone(),
            missing: self.missing.clone(),
        }
    }
}

pub struct AnalysisEngine {
    embedder: Box<dyn Embedder>,
    extractor: SkillExtractor,
    threshold: SimilarityThreshold,
    preview_chars: usize,
}

impl AnalysisEngine {
    pub fn new(config: &Config, embedder: Box<dyn Embedder>) -> Result<Self> {
        let vocabulary = SkillVocabulary::with_custom_skills(&config.matching.custom_skills);
        let extractor = SkillExtractor::new(vocabulary)?;
        let threshold = SimilarityThreshold::from_percent(config.matching.threshold_percent)?;

        Ok(Self {
            embedder,
            extractor,
            threshold,
            preview_chars: config.output.preview_chars,
        })
    }

    /// Override the configured threshold for this engine
    pub fn with_threshold(mut self, threshold: SimilarityThreshold) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> SimilarityThreshold {
        self.threshold
    }

    pub fn extractor(&self) -> &SkillExtractor {
        &self.extractor
    }

    pub fn analyze(&self, resume_text: &str, job_text: &str, source: &str) -> Result<AnalysisReport> {
        if job_text.trim().is_empty() {
            return Err(ResumeAnalyzerError::MissingInput(
                "Please provide a job description".to_string()
            ));
        }
        if resume_text.trim().is_empty() {
            return Err(ResumeAnalyzerError::EmptyText(source.to_string()));
        }

        let start_time = Instant::now();

        let resume_skills = self.extractor.extract(resume_text);
        let job_skills = self.extractor.extract(job_text);
        info!(
            "Found {} resume skills and {} job skills",
            resume_skills.len(),
            job_skills.len()
        );

        let matcher = SimilarityMatcher::new(self.embedder.as_ref(), self.threshold);
        let result = matcher.match_skills(resume_skills.as_slice(), job_skills.as_slice())?;
        let match_percentage = round_to_hundredths(result.match_percentage());

        info!(
            "Matched {}/{} job skills ({:.2}%) at threshold {}%",
            result.matched.len(),
            result.total(),
            match_percentage,
            self.threshold.percent()
        );

        Ok(AnalysisReport {
            match_percentage,
            matched: result.matched,
            missing: result.missing,
            resume_skills,
            job_skills,
            resume_preview: preview(resume_text, self.preview_chars),
            threshold_percent: self.threshold.percent(),
            embedding_model: self.embedder.model_name().to_string(),
            generated_at: Local::now(),
            source: source.to_string(),
            processing_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First `max_chars` characters of `text`, with "..." appended when cut
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
