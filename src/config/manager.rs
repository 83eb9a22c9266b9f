use super::{
    evaluation::EvaluatorConfig,
    evolution::EvolutionConfig,
    generation::GeneratorConfig,
    ledger::LedgerConfig,
    scoring::ScoringConfig,
    traits::ConfigSection,
};
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `STRATEVOLVE__EVOLUTION__SEED=7`
pub const ENV_PREFIX: &str = "STRATEVOLVE";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub evolution: EvolutionConfig,
    pub generation: GeneratorConfig,
    pub evaluation: EvaluatorConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), StratevolveError> {
        self.scoring.validate()?;
        self.evolution.validate()?;
        self.generation.validate()?;
        self.evaluation.validate()?;
        self.ledger.validate()?;
        Ok(())
    }
}

/// Resolves the run configuration once at startup.
///
/// Layers, lowest priority first: built-in defaults, an optional TOML file,
/// then `STRATEVOLVE__SECTION__FIELD` environment variables.
pub struct ConfigManager {
    config: AppConfig,
}

impl ConfigManager {
    pub fn new(config: AppConfig) -> Result<Self, StratevolveError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn load(path: Option<&Path>) -> Result<Self, StratevolveError> {
        let defaults = config::Config::try_from(&AppConfig::default())
            .map_err(|e| StratevolveError::Configuration(format!("Failed to seed defaults: {}", e)))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                return Err(StratevolveError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| StratevolveError::Configuration(format!("Failed to parse config: {}", e)))?;

        log::debug!("Resolved configuration: {:?}", config);
        Self::new(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), StratevolveError> {
        let toml_str = toml::to_string_pretty(&self.config)
            .map_err(|e| StratevolveError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| StratevolveError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    pub fn into_inner(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FailurePolicy, PersistPolicy};

    #[test]
    fn test_load_without_file_uses_defaults() {
        let manager = ConfigManager::load(None).unwrap();
        assert_eq!(manager.get().evolution.elitism_rate, 0.2);
        assert_eq!(manager.get().scoring.bounds.max_trade_count, 500.0);
    }

    #[test]
    fn test_partial_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stratevolve.toml");
        std::fs::write(
            &path,
            r#"
[evolution]
crossover_rate = 0.9
failure_policy = "zero_fitness"
seed = 42

[scoring.weights]
profit_w = 1.0

[ledger]
persist = "all"
"#,
        )
        .unwrap();

        let config = ConfigManager::load(Some(&path)).unwrap().into_inner();
        assert_eq!(config.evolution.crossover_rate, 0.9);
        assert_eq!(config.evolution.failure_policy, FailurePolicy::ZeroFitness);
        assert_eq!(config.evolution.seed, Some(42));
        assert_eq!(config.evolution.mutation_rate, 0.1);
        assert_eq!(config.scoring.weights.profit_w, 1.0);
        assert_eq!(config.scoring.weights.drawdown_w, 0.25);
        assert_eq!(config.ledger.persist, PersistPolicy::All);
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[evolution]\nelitism_rate = 3.0\n").unwrap();

        let err = ConfigManager::load(Some(&path)).err().unwrap();
        assert!(matches!(err, StratevolveError::Configuration(_)));
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = ConfigManager::load(Some(Path::new("/nonexistent/stratevolve.toml")))
            .err()
            .unwrap();
        assert!(matches!(err, StratevolveError::Configuration(_)));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stratevolve.toml");
        std::fs::write(
            &path,
            "[evaluation]\ncommand = \"tv-runner\"\ntimeout_secs = 30\n",
        )
        .unwrap();

        let var = "STRATEVOLVE__EVALUATION__TIMEOUT_SECS";
        std::env::set_var(var, "17");
        let loaded = ConfigManager::load(Some(&path));
        std::env::remove_var(var);

        let config = loaded.unwrap().into_inner();
        assert_eq!(config.evaluation.timeout_secs, 17);
        assert_eq!(config.evaluation.command, "tv-runner");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = AppConfig::default();
        config.evolution.mutation_rate = 0.3;
        config.evolution.seed = Some(9);
        ConfigManager::new(config.clone()).unwrap().save_to_file(&path).unwrap();

        let loaded = ConfigManager::load(Some(&path)).unwrap().into_inner();
        assert_eq!(loaded.evolution.mutation_rate, 0.3);
        assert_eq!(loaded.evolution.seed, Some(9));
    }
}
