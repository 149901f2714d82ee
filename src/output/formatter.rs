//! Console, JSON and HTML rendering of an analysis report

use crate::config::OutputFormat;
use crate::error::{Result, ResumeAnalyzerError};
use crate::processing::analyzer::AnalysisReport;
use askama::Template;
use colored::{Color, Colorize};
use std::path::Path;

pub trait OutputFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Terminal output with colored skill badges
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct HtmlFormatter;

/// Dispatches to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    html_formatter: HtmlFormatter,
}

#[derive(Template)]
#[template(source = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Resume Analysis Report</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f8f9fa;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        .header {
            text-align: center;
            margin-bottom: 30px;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
        }
        .score { font-size: 2em; font-weight: bold; color: #007acc; }
        .badge {
            display: inline-block;
            padding: 4px 12px;
            margin: 4px;
            border-radius: 14px;
            color: white;
            font-weight: bold;
        }
        .badge-matched { background: green; }
        .badge-missing { background: #d9534f; }
        .section { margin: 25px 0; }
        .section h2 {
            color: #007acc;
            border-bottom: 2px solid #e9ecef;
            padding-bottom: 10px;
        }
        .empty { color: #6c757d; font-style: italic; }
        pre {
            white-space: pre-wrap;
            background: #f8f9fa;
            padding: 15px;
            border-radius: 6px;
        }
        .metadata {
            background: #e9ecef;
            padding: 15px;
            border-radius: 6px;
            margin-top: 30px;
            font-size: 0.9em;
            color: #6c757d;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Resume Analysis Report</h1>
            <p class="score">Match Percentage: {{ match_percentage }}%</p>
            <p>Threshold: {{ threshold_percent }}%</p>
        </div>

        <div class="section">
            <h2>Matched Skills</h2>
            {% if matched.is_empty() %}
            <p class="empty">No matches found.</p>
            {% else %}
            {% for skill in matched %}<span class="badge badge-matched">{{ skill }}</span>{% endfor %}
            {% endif %}
        </div>

        <div class="section">
            <h2>Missing Skills</h2>
            {% if missing.is_empty() %}
            <p class="empty">No missing skills!</p>
            {% else %}
            {% for skill in missing %}<span class="badge badge-missing">{{ skill }}</span>{% endfor %}
            {% endif %}
        </div>

        <div class="section">
            <h2>Extracted Skills</h2>
            <p><strong>Resume:</strong> {{ resume_skills }}</p>
            <p><strong>Job description:</strong> {{ job_skills }}</p>
        </div>

        <div class="section">
            <h2>Resume Preview</h2>
            <pre>{{ resume_preview }}</pre>
        </div>

        <div class="metadata">
            <p><strong>Generated:</strong> {{ generated_at }}</p>
            <p><strong>Model:</strong> {{ embedding_model }} | <strong>Resume:</strong> {{ source }}</p>
        </div>
    </div>
</body>
</html>"#, ext = "html")]
struct HtmlTemplate<'a> {
    match_percentage: String,
    threshold_percent: u8,
    matched: &'a [String],
    missing: &'a [String],
    resume_skills: String,
    job_skills: String,
    resume_preview: &'a str,
    generated_at: String,
    embedding_model: &'a str,
    source: &'a str,
}

const NO_SKILLS_DETECTED: &str = "No skills detected.";

fn join_or_placeholder(skills: &[String]) -> String {
    if skills.is_empty() {
        NO_SKILLS_DETECTED.to_string()
    } else {
        skills.join(", ")
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            _ => "▒",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            _ => Color::Yellow,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, percentage: f64) -> String {
        let (badge, color) = match percentage {
            p if p >= 90.0 => ("EXCELLENT", Color::Green),
            p if p >= 75.0 => ("STRONG", Color::BrightGreen),
            p if p >= 50.0 => ("PARTIAL", Color::Yellow),
            p if p > 0.0 => ("WEAK", Color::Red),
            _ => ("NO MATCH", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_badges(&self, skills: &[String], color: Color) -> String {
        skills
            .iter()
            .map(|skill| {
                if self.use_colors {
                    format!(" {} ", skill).on_color(color).white().bold().to_string()
                } else {
                    format!("[{}]", skill)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_skill_set(&self, skills: &[String]) -> String {
        if skills.is_empty() {
            self.colorize(NO_SKILLS_DETECTED, Color::BrightBlack)
        } else {
            skills.join(", ")
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("📊 RESUME ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Model: {} | Threshold: {}%\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S"),
            report.embedding_model,
            report.threshold_percent
        ));

        output.push_str(&self.format_header("Match Score", 2));
        output.push_str(&format!(
            "Match Percentage: {:.2}% {}\n",
            report.match_percentage,
            self.format_score_badge(report.match_percentage)
        ));

        output.push_str(&self.format_header("✅ Matched Skills", 3));
        if report.matched.is_empty() {
            output.push_str(&format!("  {}\n", self.colorize("No matches found.", Color::BrightBlack)));
        } else {
            output.push_str(&format!("  {}\n", self.format_badges(&report.matched, Color::Green)));
        }

        output.push_str(&self.format_header("❌ Missing Skills", 3));
        if report.missing.is_empty() {
            output.push_str(&format!("  {}\n", self.colorize("No missing skills!", Color::Green)));
        } else {
            output.push_str(&format!("  {}\n", self.format_badges(&report.missing, Color::Red)));
        }

        output.push_str(&self.format_header("🔍 Extracted Resume Skills", 3));
        output.push_str(&format!("  {}\n", self.format_skill_set(report.resume_skills.as_slice())));
        output.push_str(&self.format_header("🔍 Job Description Skills", 3));
        output.push_str(&format!("  {}\n", self.format_skill_set(report.job_skills.as_slice())));

        if self.detailed {
            output.push_str(&self.format_header(&format!("📄 Resume Preview ({})", report.source), 2));
            output.push_str(&report.resume_preview);
            output.push('\n');
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl HtmlFormatter {
    fn create_template_data<'a>(&self, report: &'a AnalysisReport) -> HtmlTemplate<'a> {
        HtmlTemplate {
            match_percentage: format!("{:.2}", report.match_percentage),
            threshold_percent: report.threshold_percent,
            matched: &report.matched,
            missing: &report.missing,
            resume_skills: join_or_placeholder(report.resume_skills.as_slice()),
            job_skills: join_or_placeholder(report.job_skills.as_slice()),
            resume_preview: &report.resume_preview,
            generated_at: report.generated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            embedding_model: &report.embedding_model,
            source: &report.source,
        }
    }
}

impl OutputFormatter for HtmlFormatter {
    fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        self.create_template_data(report)
            .render()
            .map_err(|e| ResumeAnalyzerError::OutputFormatting(format!("HTML template error: {}", e)))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Html
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false)
    }

    pub fn with_options(use_colors: bool, detailed: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(true),
            html_formatter: HtmlFormatter,
        }
    }

    pub fn generate_report(&self, report: &AnalysisReport, format: OutputFormat) -> Result<String> {
        let formatters: [&dyn OutputFormatter; 3] =
            [&self.console_formatter, &self.json_formatter, &self.html_formatter];

        formatters
            .into_iter()
            .find(|formatter| formatter.supports_format() == format)
            .ok_or_else(|| ResumeAnalyzerError::OutputFormatting(format!("No formatter for {:?}", format)))?
            .format_report(report)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(file_path, content)?;
    Ok(())
}
