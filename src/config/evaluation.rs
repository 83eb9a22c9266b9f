use super::traits::ConfigSection;
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};

/// External backtest runner invoked once per candidate.
///
/// The runner receives the strategy source on stdin and must print the
/// rendered performance report on stdout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            command: "tv-backtest".to_string(),
            args: Vec::new(),
            timeout_secs: 60,
        }
    }
}

impl ConfigSection for EvaluatorConfig {
    fn section_name() -> &'static str {
        "evaluation"
    }

    fn validate(&self) -> Result<(), StratevolveError> {
        if self.command.trim().is_empty() {
            return Err(StratevolveError::Configuration(
                "evaluation.command must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(StratevolveError::Configuration(
                "evaluation.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
