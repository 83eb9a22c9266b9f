pub mod candidates;
pub mod evaluation;
pub mod generation;
pub mod metrics;
