pub mod traits;
pub mod scoring;
pub mod evolution;
pub mod generation;
pub mod evaluation;
pub mod ledger;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use scoring::{NormalizationBounds, ScoreConfig, ScoringConfig};
pub use evolution::{EvolutionConfig, FailurePolicy};
pub use generation::GeneratorConfig;
pub use evaluation::EvaluatorConfig;
pub use ledger::{LedgerConfig, PersistPolicy};
