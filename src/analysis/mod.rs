pub mod cache;
pub mod container;
pub mod document;
pub mod parser;
pub mod preprocess;

pub use cache::ContainerCache;
pub use container::{analyze, analyze_program, analyze_with, AnalyzerOptions};
pub use document::DocumentManager;
pub use parser::{parse_module, ParseError, ParseOptions, Program};
