pub mod analysis;
pub mod constants;
pub mod error_ext;
pub mod languages;
pub mod server;
pub mod types;

pub use analysis::{analyze, analyze_with, AnalyzerOptions};
pub use server::config::{AwilixConfig, ConfigManager};
pub use server::LspServer;
