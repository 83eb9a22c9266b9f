use super::traits::{check_unit_interval, ConfigSection};
use crate::error::StratevolveError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Text appended to a child when it mutates
    pub mutation_marker: String,
    pub failure_policy: FailurePolicy,
    /// Prompt sent to the generator for every seed genome
    pub seed_prompt: String,
    pub seed: Option<u64>,
}

/// What the genetic trainer does when a child cannot be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Propagate the error and abort the round
    #[default]
    Abort,
    /// Keep the child with fitness 0 and record the error in its metadata
    ZeroFitness,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            num_generations: 5,
            elitism_rate: 0.2,
            crossover_rate: 0.5,
            mutation_rate: 0.1,
            mutation_marker: "\n// mutation".to_string(),
            failure_policy: FailurePolicy::Abort,
            seed_prompt: "Generate a random Pine Script trading strategy".to_string(),
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), StratevolveError> {
        if self.population_size == 0 {
            return Err(StratevolveError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if self.num_generations == 0 {
            return Err(StratevolveError::Configuration(
                "Number of generations must be at least 1".to_string(),
            ));
        }
        let section = Self::section_name();
        check_unit_interval(section, "elitism_rate", self.elitism_rate)?;
        check_unit_interval(section, "crossover_rate", self.crossover_rate)?;
        check_unit_interval(section, "mutation_rate", self.mutation_rate)?;
        Ok(())
    }
}
