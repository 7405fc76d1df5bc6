pub mod cli;
pub mod config;
pub mod graph;
pub mod llm;
pub mod outlet;
pub mod types;
pub mod utils;
pub mod web;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use workflow::{Workflow, launch};
