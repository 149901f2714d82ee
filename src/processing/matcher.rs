//! Semantic skill matching between a résumé and a job description

use crate::config::validate_threshold_percent;
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::embeddings::{cosine_similarity, embed_distinct, Embedder};
use log::debug;
use serde::{Deserialize, Serialize};

/// Minimum cosine similarity for a job skill to count as covered
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SimilarityThreshold(f32);

impl SimilarityThreshold {
    /// Threshold as accepted from users: an integer percentage in 50..=90
    pub fn from_percent(percent: u8) -> Result<Self> {
        validate_threshold_percent(percent)?;
        Ok(Self(f32::from(percent) / 100.0))
    }

    /// Raw similarity value in (0, 1]
    pub fn new(value: f32) -> Result<Self> {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ResumeAnalyzerError::InvalidThreshold(format!(
                "{} is outside (0, 1]",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn percent(&self) -> u8 {
        (self.0 * 100.0).round() as u8
    }

    pub fn is_met_by(&self, similarity: f32) -> bool {
        similarity >= self.0
    }
}

/// Partition of the job's skills into covered and uncovered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

impl MatchResult {
    pub fn total(&self) -> usize {
        self.matched.len() + self.missing.len()
    }

    /// Share of job skills matched, 0-100. A job with no skills scores 0.
    pub fn match_percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.matched.len() as f64 / total as f64 * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

pub struct SimilarityMatcher<'a> {
    embedder: &'a dyn Embedder,
    threshold: SimilarityThreshold,
}

impl<'a> SimilarityMatcher<'a> {
    pub fn new(embedder: &'a dyn Embedder, threshold: SimilarityThreshold) -> Self {
        Self { embedder, threshold }
    }

    pub fn threshold(&self) -> SimilarityThreshold {
        self.threshold
    }

    /// A job skill is matched when its best similarity against any résumé
    /// skill reaches the threshold. Output preserves job skill order.
    pub fn match_skills(&self, resume_skills: &[String], job_skills: &[String]) -> Result<MatchResult> {
        if job_skills.is_empty() {
            return Ok(MatchResult::default());
        }

        if resume_skills.is_empty() {
            return Ok(MatchResult {
                matched: Vec::new(),
                missing: job_skills.to_vec(),
            });
        }

        let vectors = embed_distinct(self.embedder, resume_skills.iter().chain(job_skills.iter()))?;
        let vector = |skill: &String| {
            vectors.get(skill).ok_or_else(|| {
                ResumeAnalyzerError::Embedding(format!("No embedding produced for '{}'", skill))
            })
        };

        let mut result = MatchResult::default();

        for job_skill in job_skills {
            let job_vector = vector(job_skill)?;
            let mut best = f32::MIN;

            for resume_skill in resume_skills {
                let similarity = cosine_similarity(job_vector, vector(resume_skill)?)?;
                best = best.max(similarity);
                if self.threshold.is_met_by(similarity) {
                    break;
                }
            }

            debug!("Best similarity for '{}': {:.3}", job_skill, best);

            if self.threshold.is_met_by(best) {
                result.matched.push(job_skill.clone());
            } else {
                result.missing.push(job_skill.clone());
            }
        }

        Ok(result)
    }
}
