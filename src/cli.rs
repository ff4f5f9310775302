//! CLI interface for the resume screener

use crate::config::OutputFormat;
use crate::error::Result;
use crate::input::InputManager;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen and rank resumes against a job description")]
#[command(long_about = "Extract skills and contact details from resumes with a hybrid NER / classifier / keyword cascade and rank candidates by semantic similarity to a job description")]
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
    /// Rank a batch of resumes against a job description
    Screen {
        /// Resume files or directories of resumes (PDF, TXT, MD)
        #[arg(short, long, num_args = 1.., required = true)]
        resumes: Vec<PathBuf>,

        /// Path to job description file (TXT, MD, PDF)
        #[arg(short, long)]
        job: PathBuf,

        /// Output format: console, json, markdown, csv (defaults to config)
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Show only the best N candidates
        #[arg(short, long)]
        top: Option<usize>,

        /// Include contact details and all skills per candidate
        #[arg(short, long)]
        detailed: bool,

        /// Skip the BERT entity recognizer
        #[arg(long)]
        no_ner: bool,

        /// Skip the learned token classifier
        #[arg(long)]
        no_classifier: bool,
    },

    /// Extract skills and contact details from one resume
    Analyze {
        /// Path to resume file
        file: PathBuf,

        /// Output format: console, json, markdown, csv (defaults to config)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Semantic similarity of one resume to a job description
    Score {
        /// Path to resume file
        #[arg(short, long)]
        resume: PathBuf,

        /// Path to job description file
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Model management commands
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
    /// List known models and their download state
    List,

    /// Download a model
    Download {
        /// Model id or HuggingFace repo ID
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
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        "csv" => Ok(OutputFormat::Csv),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown, csv", format)),
    }
}

/// Expand directories into the documents they contain; files pass through as given
pub fn expand_resume_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(InputManager::collect_documents(input)?);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}
