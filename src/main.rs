//! Resume analyzer: skill matching between a resume and a job description

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use resume_analyzer::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_analyzer::config::{Config, OutputFormat};
use resume_analyzer::error::{Result, ResumeAnalyzerError};
use resume_analyzer::input::InputManager;
use resume_analyzer::output::formatter::{save_report_to_file, ReportGenerator};
use resume_analyzer::output::pdf::PdfReportGenerator;
use resume_analyzer::processing::analyzer::AnalysisEngine;
use resume_analyzer::processing::embeddings::load_embedder;
use resume_analyzer::processing::matcher::SimilarityThreshold;
use resume_analyzer::processing::model_manager::EmbeddingModelManager;
use resume_analyzer::processing::skills::{SkillExtractor, SkillVocabulary};
use std::path::Path;
use std::process;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level)
    ).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration from {}: {}", config_path.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        if e.is_warning() {
            warn!("{}", e);
            eprintln!("{} {}", "⚠️ ".yellow(), e.to_string().yellow());
        } else {
            error!("Command failed: {}", e);
            eprintln!("{} {}", "❌".red(), e.to_string().red());
        }
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job,
            job_text,
            threshold,
            embedding,
            output,
            save,
            report,
            no_report,
            detailed,
        } => {
            let resume = resume.ok_or_else(|| {
                ResumeAnalyzerError::MissingInput("Please upload a resume (--resume <file>)".to_string())
            })?;
            if job.is_none() && job_text.as_deref().map_or(true, |t| t.trim().is_empty()) {
                return Err(ResumeAnalyzerError::MissingInput(
                    "Please provide a job description (--job <file> or --job-text <text>)".to_string()
                ));
            }

            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(ResumeAnalyzerError::InvalidInput)?,
                None => config.output.format,
            };
            let threshold = SimilarityThreshold::from_percent(
                threshold.unwrap_or(config.matching.threshold_percent)
            )?;
            let chatty = output_format == OutputFormat::Console;

            info!("Starting resume analysis");
            if chatty {
                println!("🚀 Resume analysis");
                println!("📄 Resume: {}", resume.display());
                match &job {
                    Some(job) => println!("💼 Job Description: {}", job.display()),
                    None => println!("💼 Job Description: (inline text)"),
                }
                println!("🎚️  Threshold: {}%", threshold.percent());
            }

            let mut input_manager = InputManager::new().with_cache(config.processing.enable_caching);

            let resume_text = input_manager.extract_text(&resume).await?;
            if resume_text.is_empty() {
                return Err(ResumeAnalyzerError::EmptyText(resume.display().to_string()));
            }

            let job_text = match (&job, job_text) {
                (Some(job), _) => input_manager.extract_text(job).await?,
                (None, Some(text)) => text,
                (None, None) => String::new(),
            };
            if job_text.trim().is_empty() {
                return Err(ResumeAnalyzerError::MissingInput(
                    "The job description contains no text".to_string()
                ));
            }

            let spinner = start_spinner(chatty, "Loading embedding model...");
            let embedder = load_embedder(&config, embedding.as_deref()).await;
            spinner.finish_and_clear();
            let engine = AnalysisEngine::new(&config, embedder?)?.with_threshold(threshold);

            let spinner = start_spinner(chatty, "Matching skills...");
            let source = resume
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| resume.display().to_string());
            let analysis = engine.analyze(&resume_text, &job_text, &source);
            spinner.finish_and_clear();
            let analysis = analysis?;

            let generator = ReportGenerator::with_options(config.output.color_output, detailed);
            let formatted = generator.generate_report(&analysis, output_format)?;
            println!("{}", formatted);

            if let Some(save_path) = save {
                save_report_to_file(&formatted, &save_path)?;
                info!("Output saved to {}", save_path.display());
                if chatty {
                    println!("💾 Output saved to: {}", save_path.display());
                }
            }

            if !no_report && config.output.generate_report {
                let report_path = report.unwrap_or_else(|| config.output.report_file.clone());
                match PdfReportGenerator::new().write_to(&analysis, &report_path) {
                    Ok(artifact) => {
                        if chatty {
                            println!(
                                "📑 Report: {} ({} bytes, {})",
                                artifact.path.display(),
                                artifact.size_bytes,
                                artifact.mime_type
                            );
                        }
                    }
                    // The analysis is already printed; only the artifact is lost
                    Err(e) => {
                        error!("{}", e);
                        eprintln!("{} {}", "❌".red(), e.to_string().red());
                    }
                }
            }
        }

        Commands::Skills { file, text } => {
            let vocabulary = SkillVocabulary::with_custom_skills(&config.matching.custom_skills);

            let input = match (file, text) {
                (Some(path), _) => {
                    let mut input_manager = InputManager::new();
                    let text = input_manager.extract_text(&path).await?;
                    if text.is_empty() {
                        return Err(ResumeAnalyzerError::EmptyText(path.display().to_string()));
                    }
                    Some(text)
                }
                (None, Some(text)) => Some(text),
                (None, None) => None,
            };

            match input {
                Some(text) => {
                    let skills = SkillExtractor::new(vocabulary)?.extract(&text);
                    if skills.is_empty() {
                        println!("🔍 No known skills found");
                    } else {
                        println!("🔍 Found {} skills:", skills.len());
                        for skill in &skills {
                            println!("  • {}", skill);
                        }
                    }
                }
                None => {
                    println!("📚 Skill vocabulary ({} terms):", vocabulary.len());
                    for term in vocabulary.terms() {
                        println!("  • {}", term);
                    }
                }
            }
        }

        Commands::Models { action } => {
            let mut model_manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("🧠 Embedding Models:");
                    for model in model_manager.list_available_models() {
                        let status = if model_manager.is_model_downloaded(&model.id) {
                            "✅ Downloaded"
                        } else {
                            "⬇️  Available"
                        };
                        let default_marker = if model.repo_id == config.models.default_embedding_model {
                            " (default)"
                        } else {
                            ""
                        };
                        println!(
                            "  • {}{} ({}) - {} MB [{}]",
                            model.name, default_marker, model.repo_id, model.size_mb, status
                        );
                        println!("    {}", model.description);
                        if !model_manager.is_model_downloaded(&model.id) {
                            println!("    💡 Download: resume-analyzer models download {}", model.id);
                        }
                        println!();
                    }
                }
                ModelAction::Download { model, force } => {
                    println!("⬇️  Downloading model: {}", model);
                    if force {
                        println!("🔄 Force download enabled");
                    }

                    if let Some(model_id) = model_manager.resolve_model_id(&model) {
                        if !force && model_manager.is_model_downloaded(&model_id) {
                            println!("✅ Model '{}' is already downloaded!", model_id);
                            println!("💡 Use --force to re-download");
                            return Ok(());
                        }
                    }

                    let model_path = model_manager.download_model(&model, force).await?;
                    println!("📁 Location: {}", model_path.display());
                }
                ModelAction::Remove { model } => {
                    println!("🗑️  Removing model: {}", model);
                    let model_path = model_manager.remove_model(&model).await?;
                    println!("✅ Model '{}' removed successfully!", model);
                    println!("📁 Removed directory: {}", model_path.display());
                }
                ModelAction::Info { model } => {
                    let model_id = model_manager
                        .resolve_model_id(&model)
                        .ok_or_else(|| ResumeAnalyzerError::ModelError(format!("Unknown embedding model: {}", model)))?;
                    let model_info = model_manager
                        .get_model_info(&model_id)
                        .ok_or_else(|| ResumeAnalyzerError::ModelError(format!("Unknown embedding model: {}", model)))?;

                    println!("📋 Model Information for '{}'\n", model_id);
                    println!("Name: {}", model_info.name);
                    println!("Repository: {}", model_info.repo_id);
                    println!("Backend: {:?}", model_info.backend);
                    println!("Dimensions: {}", model_info.dimensions);
                    println!("Size: {} MB", model_info.size_mb);
                    println!("Description: {}", model_info.description);

                    match model_manager.get_model_path(&model_id) {
                        Some(model_path) => {
                            println!("Status: ✅ Downloaded");
                            println!("Location: {}", model_path.display());
                        }
                        None => {
                            println!("Status: ⬇️  Available for download");
                            println!("\n💡 To download this model, run:");
                            println!("   resume-analyzer models download {}", model_id);
                        }
                    }
                }
            }
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => print_config(&config, config_path),
            Some(ConfigAction::Path) => println!("{}", config_path.display()),
            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }
            Some(ConfigAction::Set { key, value }) => {
                config.set_value(&key, &value)?;
                config.save_to(config_path)?;
                println!("✅ Set {} = {}", key, value);
            }
        },
    }

    Ok(())
}

fn start_spinner(visible: bool, message: &'static str) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn print_config(config: &Config, config_path: &Path) {
    println!("⚙️  Current Configuration ({})\n", config_path.display());
    println!("Models Directory: {}", config.models_dir().display());
    println!("Embedding Backend: {:?}", config.models.embedding_backend);
    println!("Default Embedding Model: {}", config.models.default_embedding_model);
    println!("\nMatching:");
    println!("  Threshold: {}%", config.matching.threshold_percent);
    if !config.matching.custom_skills.is_empty() {
        println!("  Custom skills: {}", config.matching.custom_skills.join(", "));
    }
    println!("\nProcessing:");
    println!("  Batch size: {}", config.processing.batch_size);
    println!("  Caching: {}", config.processing.enable_caching);
    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Colors: {}", config.output.color_output);
    println!("  Preview characters: {}", config.output.preview_chars);
    println!(
        "  PDF report: {} ({})",
        config.output.report_file.display(),
        if config.output.generate_report { "enabled" } else { "disabled" }
    );
}
