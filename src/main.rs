//! Resume screener: rank resumes against a job description

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use resume_screener::cli::{self, Cli, Commands, ConfigAction, ModelAction};
use resume_screener::config::{Config, OutputFormat};
use resume_screener::error::{Result, ScreenerError};
use resume_screener::input::InputManager;
use resume_screener::models::catalog;
use resume_screener::models::manager::ModelManager;
use resume_screener::output::formatter::{save_report_to_file, suggest_filename, ReportGenerator};
use resume_screener::output::report::{JobSummary, ModelsUsed, ScreeningReport};
use resume_screener::processing::screener::{candidate_id, Screener};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Screen {
            resumes,
            job,
            output,
            save,
            top,
            detailed,
            no_ner,
            no_classifier,
        } => {
            if no_ner {
                config.extraction.enable_ner = false;
            }
            if no_classifier {
                config.extraction.enable_classifier = false;
            }
            let format = resolve_format(output.as_deref(), &config)?;

            let start_time = Instant::now();
            let screener = Screener::from_config(&config);
            let job_text = read_job(screener.input(), &job).await?;

            let paths = cli::expand_resume_paths(&resumes)?;
            info!("Screening {} resumes against {}", paths.len(), job.display());

            let progress = ProgressBar::new(paths.len() as u64);
            progress.set_style(
                ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            let ranking = screener
                .rank_files_with_progress(&paths, &job_text, |id| {
                    progress.set_message(id.to_string());
                    progress.inc(1);
                })
                .await?;
            progress.finish_and_clear();

            let job_skills = screener.cascade().extract(&job_text);
            let job_summary = JobSummary::new(job.display().to_string(), &job_text, job_skills);
            let mut report = ScreeningReport::new(
                job_summary,
                ranking,
                start_time.elapsed().as_millis() as u64,
                models_used(&config, &screener),
            );
            if let Some(n) = top {
                report.truncate(n);
            }

            let use_colors = config.output.color_output && save.is_none();
            let generator = ReportGenerator::with_options(use_colors, detailed, true, true);
            let rendered = generator.generate_report(&report, format)?;

            // a directory target gets a generated file name
            let save = save.map(|path| {
                if path.is_dir() {
                    path.join(suggest_filename(format, &job.to_string_lossy(), true))
                } else {
                    path
                }
            });
            emit(&rendered, save.as_deref())?;
        }

        Commands::Analyze { file, output } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let screener = Screener::from_config(&config);

            let text = screener.input().extract_text(&file).await?;
            let profile = screener.analyze_candidate(&text)?;

            let generator = ReportGenerator::with_options(config.output.color_output, true, true, true);
            let rendered = generator.generate_profile(&candidate_id(&file), &profile, format)?;
            println!("{}", rendered);
        }

        Commands::Score { resume, job } => {
            let screener = Screener::from_config(&config);
            let resume_text = screener.input().extract_text(&resume).await?;
            let job_text = read_job(screener.input(), &job).await?;

            let score = screener.score_against_job(&resume_text, &job_text)?;
            println!("{}: {:.2}", candidate_id(&resume), score);
        }

        Commands::Models { action } => {
            let mut model_manager = ModelManager::new(config.models_dir().clone()).await?;

            match action {
                ModelAction::List => {
                    println!("Known models ({})\n", config.models_dir().display());
                    for model in catalog::known_models() {
                        let status = if model_manager.is_model_downloaded(model.id) {
                            "downloaded"
                        } else {
                            "available"
                        };
                        println!("  {} [{:?}] {} MB, {}", model.id, model.kind, model.size_mb, status);
                        println!("    {} ({})", model.description, model.repo_id);
                    }
                }

                ModelAction::Download { model, force } => {
                    if !force && model_manager.is_model_downloaded(&model) {
                        println!("Model '{}' is already downloaded, use --force to re-download", model);
                        return Ok(());
                    }
                    let model_path = model_manager.download_model(&model, force).await?;
                    println!("Model '{}' downloaded to {}", model, model_path.display());
                }

                ModelAction::Remove { model } => {
                    let model_path = model_manager.remove_model(&model).await?;
                    println!("Removed {}", model_path.display());
                }
            }
        }

        Commands::Config { action } => {
            let path = config_path.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                    println!("# {}\n{}", path.display(), rendered);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&path)?;
                    println!("Configuration reset: {}", path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn resolve_format(requested: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match requested {
        Some(format) => cli::parse_output_format(format).map_err(ScreenerError::InvalidInput),
        None => Ok(config.output.format),
    }
}

async fn read_job(input: &InputManager, path: &Path) -> Result<String> {
    let job_text = input.extract_text(path).await?;
    if job_text.trim().is_empty() {
        return Err(ScreenerError::InvalidInput(format!(
            "Job description has no readable text: {}",
            path.display()
        )));
    }
    Ok(job_text)
}

fn models_used(config: &Config, screener: &Screener) -> ModelsUsed {
    ModelsUsed {
        embedding_model: config.models.embedding_model.clone(),
        strategies: screener
            .cascade()
            .strategy_names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

fn emit(rendered: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(rendered, path)?;
            println!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}
