//! Text processing and analysis module

pub mod category;
pub mod classifier;
pub mod contact;
pub mod embeddings;
pub mod keywords;
pub mod ner;
pub mod ranking;
pub mod screener;
pub mod signals;
pub mod skills;
