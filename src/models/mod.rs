//! Model catalog, lazy model handles, and model downloads

pub mod catalog;
pub mod manager;
pub mod provider;

pub use provider::ModelProvider;
