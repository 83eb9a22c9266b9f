use crate::config::PersistPolicy;
use crate::engines::candidates::CandidateGenerator;
use crate::engines::generation::{
    genome::{fittest, Genome, Population},
    progress::ProgressCallback,
    trainer::Trainer,
};
use crate::error::{Result, StratevolveError};
use crate::storage::GenerationLedger;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub best: Genome,
    pub generations: u32,
    /// Best fitness after each round, index 0 = generation 1
    pub best_fitness_per_generation: Vec<f64>,
}

/// Runs the generation loop: seed, train, persist, repeat.
///
/// Rounds execute strictly one after another. A failed round propagates
/// before anything of that round reaches the ledger. Ledger write
/// failures only log a warning.
pub struct EvolutionDriver {
    generator: Box<dyn CandidateGenerator>,
    trainer: Box<dyn Trainer>,
    ledger: Box<dyn GenerationLedger>,
    persist: PersistPolicy,
    seed_prompt: String,
}

impl EvolutionDriver {
    pub fn new(
        generator: Box<dyn CandidateGenerator>,
        trainer: Box<dyn Trainer>,
        ledger: Box<dyn GenerationLedger>,
        persist: PersistPolicy,
        seed_prompt: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            trainer,
            ledger,
            persist,
            seed_prompt: seed_prompt.into(),
        }
    }

    pub fn ledger(&self) -> &dyn GenerationLedger {
        self.ledger.as_ref()
    }

    /// Ask the generator for `size` independent candidates at fitness 0
    pub fn initial_population(&mut self, size: usize) -> Result<Population> {
        (0..size)
            .map(|i| {
                log::debug!("Generating seed strategy {}/{}", i + 1, size);
                self.generator.generate(&self.seed_prompt).map(Genome::seed)
            })
            .collect()
    }

    pub fn run<C: ProgressCallback>(
        &mut self,
        population_size: usize,
        generations: u32,
        callback: &mut C,
    ) -> Result<RunSummary> {
        if population_size == 0 || generations == 0 {
            return Err(StratevolveError::Configuration(
                "Population size and generation count must be positive".to_string(),
            ));
        }

        let mut population = self.initial_population(population_size)?;
        let mut best_fitness_per_generation = Vec::with_capacity(generations as usize);

        for generation in 1..=generations {
            callback.on_generation_start(generation, generations);

            population = self.trainer.train_epoch(population)?;
            if population.len() != population_size {
                return Err(StratevolveError::Evaluation(format!(
                    "Trainer returned {} genomes, expected {}",
                    population.len(),
                    population_size
                )));
            }

            let persisted = self.persist_round(generation, &population);
            let best = fittest(&population).ok_or_else(|| {
                StratevolveError::Evaluation("Population is empty".to_string())
            })?;
            best_fitness_per_generation.push(best.fitness());
            callback.on_generation_complete(generation, best, persisted);
        }

        // Ties between equal fitness values resolve arbitrarily
        let best = fittest(&population)
            .cloned()
            .ok_or_else(|| StratevolveError::Evaluation("Population is empty".to_string()))?;
        log::info!("=== Final best strategy score: {:.4} ===", best.fitness());

        Ok(RunSummary {
            best,
            generations,
            best_fitness_per_generation,
        })
    }

    /// Returns the number of records written
    fn persist_round(&mut self, generation: u32, population: &[Genome]) -> usize {
        let selected: Vec<&Genome> = match self.persist {
            PersistPolicy::Best => fittest(population).into_iter().collect(),
            PersistPolicy::All => population.iter().collect(),
        };

        let mut written = 0;
        for genome in selected {
            match self.ledger.append(
                generation,
                genome.fitness(),
                genome.source_text(),
                genome.metadata(),
            ) {
                Ok(()) => written += 1,
                Err(e) => log::warn!(
                    "Failed to persist generation {} record (fitness {:.4}): {}",
                    generation,
                    genome.fitness(),
                    e
                ),
            }
        }
        written
    }
}
