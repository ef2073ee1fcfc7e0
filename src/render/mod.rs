//! Report rendering: the semicolon-separated summary table.

pub mod report;

pub use report::write_report;
