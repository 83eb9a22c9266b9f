use crate::config::{EvolutionConfig, FailurePolicy};
use crate::engines::evaluation::CandidateEvaluator;
use crate::engines::generation::{
    genome::{Genome, Population},
    operators::{append_mutation, elite_count, midpoint_crossover, select_elite_parents},
};
use crate::engines::metrics::Scorer;
use crate::error::{Result, StratevolveError};
use crate::types::Metadata;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::str::FromStr;

/// Round-update policy: turns one population into the next.
///
/// Implementations must return a population of the same size as the input.
pub trait Trainer {
    fn train_epoch(&mut self, population: Population) -> Result<Population>;
}

/// Which trainer drives a run, resolved once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingMode {
    Genetic,
    Reinforcement,
}

impl FromStr for TrainingMode {
    type Err = StratevolveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ga" | "genetic" => Ok(Self::Genetic),
            "rl" | "ppo" | "reinforcement" => Ok(Self::Reinforcement),
            other => Err(StratevolveError::Configuration(format!(
                "Unknown training mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TrainingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genetic => write!(f, "ga"),
            Self::Reinforcement => write!(f, "rl"),
        }
    }
}

/// Tunable rates of the genetic trainer, read-only after construction
#[derive(Debug, Clone, PartialEq)]
pub struct GeneticParams {
    pub elitism_rate: f64,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub mutation_marker: String,
    pub failure_policy: FailurePolicy,
}

impl From<&EvolutionConfig> for GeneticParams {
    fn from(config: &EvolutionConfig) -> Self {
        Self {
            elitism_rate: config.elitism_rate,
            crossover_rate: config.crossover_rate,
            mutation_rate: config.mutation_rate,
            mutation_marker: config.mutation_marker.clone(),
            failure_policy: config.failure_policy,
        }
    }
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self::from(&EvolutionConfig::default())
    }
}

/// Elitist genetic algorithm over strategy source text.
///
/// Each round keeps the top `elitism_rate` fraction untouched and refills
/// the rest with children bred from the elites. Every child is evaluated
/// and scored before it joins the population; evaluation runs one child at
/// a time.
pub struct GeneticTrainer {
    params: GeneticParams,
    evaluator: Box<dyn CandidateEvaluator>,
    scorer: Box<dyn Scorer>,
    rng: StdRng,
}

impl GeneticTrainer {
    pub fn new(
        params: GeneticParams,
        evaluator: Box<dyn CandidateEvaluator>,
        scorer: Box<dyn Scorer>,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            params,
            evaluator,
            scorer,
            rng,
        }
    }

    fn breed_child(&mut self, elites: &[Genome]) -> String {
        let (parent1, parent2) = select_elite_parents(elites, &mut self.rng);

        let child = if self.rng.gen::<f64>() < self.params.crossover_rate {
            midpoint_crossover(parent1.source_text(), parent2.source_text())
        } else {
            parent1.source_text().to_string()
        };

        if self.rng.gen::<f64>() < self.params.mutation_rate {
            append_mutation(child, &self.params.mutation_marker)
        } else {
            child
        }
    }

    fn evaluate_child(&mut self, source_text: String) -> Result<Genome> {
        match self.evaluator.evaluate(&source_text) {
            Ok(report) => {
                let fitness = self.scorer.score(&report);
                Ok(Genome::scored(source_text, fitness, Some(report)))
            }
            Err(e) if e.is_evaluation_failure()
                && self.params.failure_policy == FailurePolicy::ZeroFitness =>
            {
                log::warn!("Evaluation failed, keeping child at fitness 0: {}", e);
                let mut metadata = Metadata::new();
                metadata.insert("evaluation_error".to_string(), e.to_string().into());
                Ok(Genome::scored(source_text, 0.0, None).with_metadata(metadata))
            }
            Err(e) => Err(e),
        }
    }
}

impl Trainer for GeneticTrainer {
    fn train_epoch(&mut self, population: Population) -> Result<Population> {
        let size = population.len();
        if size == 0 {
            return Ok(population);
        }

        // Stable: equal fitness keeps input order
        let mut next = population;
        next.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));

        let elites = elite_count(size, self.params.elitism_rate);
        next.truncate(elites);
        log::debug!(
            "Keeping {} elites, breeding {} children",
            elites,
            size - elites
        );

        while next.len() < size {
            let child = self.breed_child(&next[..elites]);
            let genome = self.evaluate_child(child)?;
            log::debug!(
                "Child {}/{} scored {:.4}",
                next.len() - elites + 1,
                size - elites,
                genome.fitness()
            );
            next.push(genome);
        }

        Ok(next)
    }
}

/// Placeholder for a policy-gradient trainer. Returns its input unchanged,
/// so no progress happens across rounds in this mode.
#[derive(Debug, Default)]
pub struct ReinforcementTrainer;

impl Trainer for ReinforcementTrainer {
    fn train_epoch(&mut self, population: Population) -> Result<Population> {
        log::info!("Reinforcement trainer is not implemented; returning input population");
        Ok(population)
    }
}

/// Build the trainer for `mode`. The reinforcement stub ignores the ports.
pub fn build_trainer(
    mode: TrainingMode,
    config: &EvolutionConfig,
    evaluator: Box<dyn CandidateEvaluator>,
    scorer: Box<dyn Scorer>,
) -> Box<dyn Trainer> {
    match mode {
        TrainingMode::Genetic => Box::new(GeneticTrainer::new(
            GeneticParams::from(config),
            evaluator,
            scorer,
            config.seed,
        )),
        TrainingMode::Reinforcement => Box::new(ReinforcementTrainer),
    }
}
