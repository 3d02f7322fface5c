pub mod formatter;

pub use formatter::{format_report, format_summary, risk_score, SeverityBand};
