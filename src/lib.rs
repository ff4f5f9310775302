//! Resume screener library
//!
//! Hybrid skill extraction (BERT NER, learned token classifier, keyword
//! dictionary) and semantic ranking of candidate documents against a job
//! description.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ScreenerError};
pub use processing::ranking::{CandidateProfile, Ranking, RankingEntry};
pub use processing::screener::{Candidate, Screener};
