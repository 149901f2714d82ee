//! CLI interface for the resume analyzer

use crate::config::{OutputFormat, MAX_THRESHOLD_PERCENT, MIN_THRESHOLD_PERCENT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-analyzer")]
#[command(about = "Match a resume against a job description by skill similarity")]
#[command(long_about = "Extract skills from a resume (PDF, DOCX, TXT) and a job description, compare them with sentence embeddings, and produce a match score with a PDF report")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume against a job description
    Analyze {
        /// Path to resume file (PDF, DOCX, TXT)
        #[arg(short, long)]
        resume: Option<PathBuf>,

        /// Path to a job description file (PDF, DOCX, TXT)
        #[arg(short, long, conflicts_with = "job_text")]
        job: Option<PathBuf>,

        /// Job description text given inline
        #[arg(long)]
        job_text: Option<String>,

        /// Semantic match threshold in percent (50-90)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(MIN_THRESHOLD_PERCENT as i64..=MAX_THRESHOLD_PERCENT as i64))]
        threshold: Option<u8>,

        /// Embedding model to use (repo id, local directory or known model id)
        #[arg(short, long)]
        embedding: Option<String>,

        /// Output format: console, json, html
        #[arg(short, long)]
        output: Option<String>,

        /// Save formatted output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Where to write the PDF report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Skip writing the PDF report
        #[arg(long)]
        no_report: bool,

        /// Show extracted skill sets and the resume text preview
        #[arg(short, long)]
        detailed: bool,
    },

    /// List the skill vocabulary, or the skills found in a file or text
    Skills {
        /// Extract skills from this file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Extract skills from this text
        #[arg(short, long)]
        text: Option<String>,
    },

    /// Embedding model management commands
    Models {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ModelAction {
    /// List known embedding models
    List,

    /// Download a model
    Download {
        /// Model id, name or HuggingFace repo ID
        model: String,

        /// Force re-download if model exists
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a downloaded model
    Remove {
        /// Model id to remove
        model: String,
    },

    /// Show model information
    Info {
        /// Model id
        model: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "matching.threshold_percent")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "html" => Ok(OutputFormat::Html),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, html", format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "resume-analyzer", "analyze", "--resume", "cv.pdf", "--job-text", "python developer", "--threshold", "80",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { resume, job_text, threshold, .. } => {
                assert_eq!(resume, Some(PathBuf::from("cv.pdf")));
                assert_eq!(job_text.as_deref(), Some("python developer"));
                assert_eq!(threshold, Some(80));
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn test_threshold_range_enforced() {
        let result = Cli::try_parse_from([
            "resume-analyzer", "analyze", "--resume", "cv.pdf", "--job-text", "x", "--threshold", "95",
        ]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "resume-analyzer", "analyze", "--resume", "cv.pdf", "--job-text", "x", "--threshold", "49",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_job_sources_conflict() {
        let result = Cli::try_parse_from([
            "resume-analyzer", "analyze", "--resume", "cv.pdf", "--job", "job.txt", "--job-text", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("html"), Ok(OutputFormat::Html));
        assert!(parse_output_format("pdf").is_err());
    }
}
