//! Configuration management for the resume analyzer

use crate::error::{Result, ResumeAnalyzerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_THRESHOLD_PERCENT: u8 = 50;
pub const MAX_THRESHOLD_PERCENT: u8 = 90;
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 70;
pub const DEFAULT_REPORT_FILE: &str = "resume_analysis_report.pdf";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub embedding_backend: EmbeddingBackend,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Static Model2Vec embeddings (fast, no GPU)
    Model2Vec,
    /// BERT sentence-transformer run through candle
    Bert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Semantic match threshold as an integer percentage (50-90)
    pub threshold_percent: u8,
    /// Extra terms appended to the built-in skill vocabulary
    #[serde(default)]
    pub custom_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    pub batch_size: usize,
    pub enable_caching: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub preview_chars: usize,
    pub report_file: PathBuf,
    pub generate_report: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Html,
}

impl Default for Config {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".resume-analyzer")
            .join("models");

        Self {
            models: ModelConfig {
                models_dir,
                embedding_backend: EmbeddingBackend::Model2Vec,
                default_embedding_model: "minishlab/potion-base-8M".to_string(),
            },
            matching: MatchingConfig {
                threshold_percent: DEFAULT_THRESHOLD_PERCENT,
                custom_skills: Vec::new(),
            },
            processing: ProcessingConfig {
                batch_size: 32,
                enable_caching: true,
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                preview_chars: 2000,
                report_file: PathBuf::from(DEFAULT_REPORT_FILE),
                generate_report: true,
            },
        }
    }
}

impl Config {
    /// Load `config_path`, creating it with defaults if absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ResumeAnalyzerError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ResumeAnalyzerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-analyzer")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold_percent(self.matching.threshold_percent)?;
        if self.processing.batch_size == 0 {
            return Err(ResumeAnalyzerError::Configuration(
                "processing.batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }

    /// Set a scalar value by dotted key, e.g. `matching.threshold_percent`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut updated = self.clone();
        match key {
            "models.models_dir" => updated.models.models_dir = PathBuf::from(value),
            "models.embedding_backend" => {
                updated.models.embedding_backend = match value.to_lowercase().as_str() {
                    "model2vec" => EmbeddingBackend::Model2Vec,
                    "bert" => EmbeddingBackend::Bert,
                    _ => {
                        return Err(ResumeAnalyzerError::Configuration(format!(
                            "Unknown embedding backend: {}. Supported: model2vec, bert",
                            value
                        )))
                    }
                }
            }
            "models.default_embedding_model" => updated.models.default_embedding_model = value.to_string(),
            "matching.threshold_percent" => {
                let percent = parse_value::<u8>(key, value)?;
                validate_threshold_percent(percent)?;
                updated.matching.threshold_percent = percent;
            }
            "processing.batch_size" => updated.processing.batch_size = parse_value(key, value)?,
            "processing.enable_caching" => updated.processing.enable_caching = parse_value(key, value)?,
            "output.format" => {
                updated.output.format = crate::cli::parse_output_format(value)
                    .map_err(ResumeAnalyzerError::Configuration)?
            }
            "output.color_output" => updated.output.color_output = parse_value(key, value)?,
            "output.preview_chars" => updated.output.preview_chars = parse_value(key, value)?,
            "output.report_file" => updated.output.report_file = PathBuf::from(value),
            "output.generate_report" => updated.output.generate_report = parse_value(key, value)?,
            _ => {
                return Err(ResumeAnalyzerError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        ResumeAnalyzerError::Configuration(format!("Invalid value for {}: {}", key, value))
    })
}

pub fn validate_threshold_percent(percent: u8) -> Result<()> {
    if (MIN_THRESHOLD_PERCENT..=MAX_THRESHOLD_PERCENT).contains(&percent) {
        Ok(())
    } else {
        Err(ResumeAnalyzerError::InvalidThreshold(format!(
            "{}% is outside the allowed range {}-{}%",
            percent, MIN_THRESHOLD_PERCENT, MAX_THRESHOLD_PERCENT
        )))
    }
}
