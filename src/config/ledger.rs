use super::traits::ConfigSection;
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub database_path: PathBuf,
    pub persist: PersistPolicy,
}

/// Which genomes of a finished round are written to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistPolicy {
    #[default]
    Best,
    All,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data.db"),
            persist: PersistPolicy::Best,
        }
    }
}

impl ConfigSection for LedgerConfig {
    fn section_name() -> &'static str {
        "ledger"
    }

    fn validate(&self) -> Result<(), StratevolveError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(StratevolveError::Configuration(
                "ledger.database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
