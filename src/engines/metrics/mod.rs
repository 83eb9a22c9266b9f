pub mod scorer;
pub mod report_parser;

pub use scorer::{clamp01, DefaultScorer, NormalizedMetrics, Scorer};
pub use report_parser::ReportParser;
