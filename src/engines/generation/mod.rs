pub mod genome;
pub mod operators;
pub mod trainer;
pub mod progress;
pub mod driver;

pub use genome::{fittest, Genome, Population};
pub use trainer::{
    build_trainer, GeneticParams, GeneticTrainer, ReinforcementTrainer, Trainer, TrainingMode,
};
pub use progress::{ConsoleProgressCallback, ProgressCallback};
pub use driver::{EvolutionDriver, RunSummary};
