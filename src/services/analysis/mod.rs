pub mod analyzer;
pub mod dashboard;
pub mod parser;
pub mod relations;
pub mod types;
pub mod utils;

pub use analyzer::analyze_column;
pub use relations::find_related_columns;
