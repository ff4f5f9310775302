//! Output formatters for screening reports

use crate::config::OutputFormat;
use crate::error::{Result, ScreenerError};
use crate::output::report::ScreeningReport;
use crate::processing::ranking::{CandidateProfile, RankingEntry};
use crate::processing::skills::{SkillSet, StrategyDiagnostic, StrategyStatus};
use colored::{Color, Colorize};
use std::path::Path;

/// Renders reports and single-candidate profiles
pub trait OutputFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String>;
    fn format_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for structured consumers
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// One row per candidate, ranked first, then rejected
pub struct CsvFormatter;

/// Dispatches to the formatter for the requested format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
    csv_formatter: CsvFormatter,
}

fn score_label(score: f32) -> (&'static str, Color) {
    match score {
        s if s >= 80.0 => ("STRONG", Color::Green),
        s if s >= 60.0 => ("GOOD", Color::BrightGreen),
        s if s >= 40.0 => ("FAIR", Color::Yellow),
        s if s >= 20.0 => ("WEAK", Color::Red),
        _ => ("POOR", Color::BrightRed),
    }
}

fn describe_status(status: &StrategyStatus) -> String {
    match status {
        StrategyStatus::Contributed { count } => format!("{} skills", count),
        StrategyStatus::Unavailable => "unavailable".to_string(),
        StrategyStatus::Failed { reason } => format!("failed: {}", reason),
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn category_or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("Unknown")
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
            _ => "░",
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

    fn format_score_badge(&self, score: f32) -> String {
        let (badge, color) = score_label(score);
        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_profile_body(&self, profile: &CandidateProfile) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "  Email: {} | Phone: {}\n",
            or_dash(profile.contact.email.as_deref()),
            or_dash(profile.contact.phone.as_deref())
        ));
        if let Some(experience) = &profile.experience {
            output.push_str(&format!("  Experience: {} years\n", experience));
        }
        if !profile.education.is_empty() {
            output.push_str(&format!("  Education: {}\n", profile.education.join("; ")));
        }
        output.push_str(&format!("  Category: {}\n", category_or_unknown(profile.category.as_deref())));
        output.push_str(&format!(
            "  Skills ({}): {}\n",
            profile.skills.len(),
            self.colorize(&profile.skills.sorted().join(", "), Color::Cyan)
        ));
        output
    }

    fn format_diagnostics(&self, degraded: bool, diagnostics: &[StrategyDiagnostic]) -> String {
        if !degraded && !self.detailed {
            return String::new();
        }
        let rendered: Vec<String> = diagnostics
            .iter()
            .map(|d| format!("{} ({})", d.strategy, describe_status(&d.status)))
            .collect();
        format!("  Strategies: {}\n", self.colorize(&rendered.join(", "), Color::BrightBlack))
    }

    fn format_entry(&self, rank: usize, entry: &RankingEntry, report: &ScreeningReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{:>3}. {} {:>7.2} {}\n",
            rank,
            self.colorize(&entry.candidate_id, Color::White),
            entry.score,
            self.format_score_badge(entry.score)
        ));

        let matched = report.matched_skills(entry);
        if !matched.is_empty() {
            output.push_str(&format!(
                "  Matched: {}\n",
                self.colorize(&matched.join(", "), Color::Green)
            ));
        }

        if self.detailed {
            output.push_str(&format!(
                "  Email: {} | Phone: {}\n",
                or_dash(entry.contact.email.as_deref()),
                or_dash(entry.contact.phone.as_deref())
            ));
            if let Some(experience) = &entry.experience {
                output.push_str(&format!("  Experience: {} years\n", experience));
            }
            if let Some(category) = &entry.category {
                output.push_str(&format!("  Category: {}\n", category));
            }
            output.push_str(&format!("  Skills: {}\n", entry.skills.sorted().join(", ")));
        }

        output.push_str(&self.format_diagnostics(entry.degraded, &entry.diagnostics));
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("CANDIDATE SCREENING", 1));
        output.push_str(&format!(
            "Generated: {} | Processing time: {}ms\n",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.metadata.processing_time_ms
        ));

        output.push_str(&self.format_header("Job Description", 2));
        output.push_str(&format!("Source: {}\n", report.job.source));
        output.push_str(&format!("{}\n", self.colorize(&report.job.preview, Color::BrightBlack)));
        if !report.job.skills.is_empty() {
            output.push_str(&format!(
                "Skills sought: {}\n",
                self.colorize(&report.job.skills.sorted().join(", "), Color::Cyan)
            ));
        }

        output.push_str(&self.format_header("Ranking", 2));
        if report.ranking.entries.is_empty() {
            output.push_str("No candidates could be ranked.\n");
        }
        for (index, entry) in report.ranking.entries.iter().enumerate() {
            output.push_str(&self.format_entry(index + 1, entry, report));
        }

        if !report.ranking.rejected.is_empty() {
            output.push_str(&self.format_header("Not Ranked", 3));
            for rejected in &report.ranking.rejected {
                output.push_str(&format!(
                    "  • {} {}\n",
                    self.colorize(&rejected.candidate_id, Color::Red),
                    self.colorize(&format!("({})", rejected.reason), Color::BrightBlack)
                ));
            }
        }

        output.push_str(&format!(
            "\nModels: {} | Strategies: {}\n",
            report.metadata.models_used.embedding_model,
            report.metadata.models_used.strategies.join(" > ")
        ));

        Ok(output)
    }

    fn format_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<String> {
        let mut output = self.format_header(&format!("Candidate: {}", candidate_id), 1);
        output.push_str(&self.format_profile_body(profile));
        output.push_str(&self.format_diagnostics(profile.is_degraded(), &profile.diagnostics));
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

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        self.to_json(report)
    }

    fn format_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<String> {
        self.to_json(&serde_json::json!({
            "candidate_id": candidate_id,
            "profile": profile,
        }))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Candidate Screening Report\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Processing Time:** {}ms\n\n",
                report.metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.metadata.processing_time_ms
            ));
        }

        output.push_str("## Job Description\n\n");
        output.push_str(&format!("**Source:** `{}`\n\n", report.job.source));
        output.push_str(&format!("> {}\n\n", report.job.preview));
        if !report.job.skills.is_empty() {
            output.push_str(&format!("**Skills sought:** {}\n\n", report.job.skills.sorted().join(", ")));
        }

        output.push_str("## Ranking\n\n");
        if report.ranking.entries.is_empty() {
            output.push_str("_No candidates could be ranked._\n\n");
        } else {
            output.push_str("| Rank | Candidate | Score | Category | Matched skills | Email | Phone | Notes |\n");
            output.push_str("|-----:|-----------|------:|----------|----------------|-------|-------|-------|\n");
            for (index, entry) in report.ranking.entries.iter().enumerate() {
                let notes = if entry.degraded { "degraded extraction" } else { "" };
                output.push_str(&format!(
                    "| {} | {} | {:.2} | {} | {} | {} | {} | {} |\n",
                    index + 1,
                    Self::escape_cell(&entry.candidate_id),
                    entry.score,
                    Self::escape_cell(or_dash(entry.category.as_deref())),
                    Self::escape_cell(&report.matched_skills(entry).join(", ")),
                    or_dash(entry.contact.email.as_deref()),
                    or_dash(entry.contact.phone.as_deref()),
                    notes
                ));
            }
            output.push('\n');
        }

        if !report.ranking.rejected.is_empty() {
            output.push_str("## Not Ranked\n\n");
            for rejected in &report.ranking.rejected {
                output.push_str(&format!("- `{}`: {}\n", rejected.candidate_id, rejected.reason));
            }
            output.push('\n');
        }

        if self.include_metadata {
            output.push_str("---\n\n");
            output.push_str(&format!(
                "*resume-screener v{} | embedding model `{}` | strategies {}*\n",
                report.metadata.screener_version,
                report.metadata.models_used.embedding_model,
                report.metadata.models_used.strategies.join(" > ")
            ));
        }

        Ok(output)
    }

    fn format_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<String> {
        let mut output = format!("# Candidate: {}\n\n", candidate_id);
        output.push_str(&format!("- **Email:** {}\n", or_dash(profile.contact.email.as_deref())));
        output.push_str(&format!("- **Phone:** {}\n", or_dash(profile.contact.phone.as_deref())));
        if let Some(experience) = &profile.experience {
            output.push_str(&format!("- **Experience:** {} years\n", experience));
        }
        for degree in &profile.education {
            output.push_str(&format!("- **Education:** {}\n", degree));
        }
        output.push_str(&format!(
            "- **Category:** {}\n",
            category_or_unknown(profile.category.as_deref())
        ));
        output.push_str(&format!("\n## Skills\n\n{}\n", profile.skills.sorted().join(", ")));

        if profile.is_degraded() {
            output.push_str("\n## Extraction\n\n");
            for diagnostic in &profile.diagnostics {
                output.push_str(&format!("- {}: {}\n", diagnostic.strategy, describe_status(&diagnostic.status)));
            }
        }
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl CsvFormatter {
    const HEADER: [&'static str; 10] = [
        "rank",
        "candidate",
        "status",
        "score",
        "category",
        "email",
        "phone",
        "experience",
        "skills",
        "notes",
    ];

    fn write_rows(rows: Vec<[String; 10]>) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(Self::HEADER).map_err(csv_error)?;
        for row in rows {
            writer.write_record(&row).map_err(csv_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ScreenerError::OutputFormatting(format!("Failed to flush CSV: {}", e)))?;
        String::from_utf8(bytes).map_err(|e| ScreenerError::OutputFormatting(format!("CSV is not UTF-8: {}", e)))
    }

    fn profile_row(
        rank: String,
        candidate_id: &str,
        status: &str,
        score: String,
        profile: ProfileColumns<'_>,
        notes: String,
    ) -> [String; 10] {
        [
            rank,
            candidate_id.to_string(),
            status.to_string(),
            score,
            profile.category.unwrap_or_default().to_string(),
            profile.email.unwrap_or_default().to_string(),
            profile.phone.unwrap_or_default().to_string(),
            profile.experience.unwrap_or_default().to_string(),
            profile.skills.sorted().join("; "),
            notes,
        ]
    }
}

/// Borrowed profile fields shared by ranking entries and single profiles
struct ProfileColumns<'a> {
    category: Option<&'a str>,
    email: Option<&'a str>,
    phone: Option<&'a str>,
    experience: Option<&'a str>,
    skills: &'a SkillSet,
}

fn csv_error(e: csv::Error) -> ScreenerError {
    ScreenerError::OutputFormatting(format!("Failed to write CSV: {}", e))
}

fn degraded_note(degraded: bool, diagnostics: &[StrategyDiagnostic]) -> String {
    if !degraded {
        return String::new();
    }
    let strategies: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.is_degraded())
        .map(|d| d.strategy.as_str())
        .collect();
    format!("degraded: {}", strategies.join(", "))
}

impl OutputFormatter for CsvFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut rows = Vec::with_capacity(report.ranking.entries.len() + report.ranking.rejected.len());
        for (index, entry) in report.ranking.entries.iter().enumerate() {
            rows.push(Self::profile_row(
                (index + 1).to_string(),
                &entry.candidate_id,
                "ranked",
                format!("{:.2}", entry.score),
                ProfileColumns {
                    category: entry.category.as_deref(),
                    email: entry.contact.email.as_deref(),
                    phone: entry.contact.phone.as_deref(),
                    experience: entry.experience.as_deref(),
                    skills: &entry.skills,
                },
                degraded_note(entry.degraded, &entry.diagnostics),
            ));
        }
        for rejected in &report.ranking.rejected {
            let mut row: [String; 10] = Default::default();
            row[1] = rejected.candidate_id.clone();
            row[2] = "rejected".to_string();
            row[9] = rejected.reason.clone();
            rows.push(row);
        }
        Self::write_rows(rows)
    }

    fn format_profile(&self, candidate_id: &str, profile: &CandidateProfile) -> Result<String> {
        let row = Self::profile_row(
            String::new(),
            candidate_id,
            "analyzed",
            String::new(),
            ProfileColumns {
                category: profile.category.as_deref(),
                email: profile.contact.email.as_deref(),
                phone: profile.contact.phone.as_deref(),
                experience: profile.experience.as_deref(),
                skills: &profile.skills,
            },
            degraded_note(profile.is_degraded(), &profile.diagnostics),
        );
        Self::write_rows(vec![row])
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Csv
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
            csv_formatter: CsvFormatter,
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
            csv_formatter: CsvFormatter,
        }
    }

    fn formatter(&self, format: OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
            OutputFormat::Csv => &self.csv_formatter,
        }
    }

    pub fn generate_report(&self, report: &ScreeningReport, format: OutputFormat) -> Result<String> {
        self.formatter(format).format_report(report)
    }

    pub fn generate_profile(
        &self,
        candidate_id: &str,
        profile: &CandidateProfile,
        format: OutputFormat,
    ) -> Result<String> {
        self.formatter(format).format_profile(candidate_id, profile)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, job_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(job_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_screening{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_screening{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_screening{}.md", base_name, timestamp_suffix),
        OutputFormat::Csv => format!("{}_screening{}.csv", base_name, timestamp_suffix),
    }
}
