use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use stratevolve::config::{AppConfig, ConfigManager, PersistPolicy};
use stratevolve::engines::candidates::{CandidateGenerator, ChatCompletionGenerator};
use stratevolve::engines::evaluation::CommandEvaluator;
use stratevolve::engines::generation::{
    build_trainer, ConsoleProgressCallback, EvolutionDriver, TrainingMode,
};
use stratevolve::engines::metrics::DefaultScorer;
use stratevolve::storage::{GenerationLedger, InMemoryLedger, LedgerQuery, SqliteLedger};

#[derive(Parser)]
#[command(name = "stratevolve", version, about = "TradingView strategy evolver")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evolve strategies and print the best one on stdout
    Run {
        /// Training mode: ga, or rl (alias ppo)
        #[arg(long, default_value = "ga")]
        mode: TrainingMode,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        generations: Option<u32>,

        #[arg(long = "pop-size", value_parser = clap::value_parser!(u64).range(1..))]
        pop_size: Option<u64>,

        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum)]
        persist: Option<PersistArg>,

        /// Keep the ledger in memory instead of writing the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Print persisted records as JSON lines
    History {
        #[arg(long)]
        generation: Option<u32>,

        #[arg(long)]
        limit: Option<usize>,
    },
    /// Refine an existing strategy file and print the result
    Rewrite {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        prompt: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PersistArg {
    Best,
    All,
}

impl From<PersistArg> for PersistPolicy {
    fn from(arg: PersistArg) -> Self {
        match arg {
            PersistArg::Best => PersistPolicy::Best,
            PersistArg::All => PersistPolicy::All,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    let config = ConfigManager::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .into_inner();

    match cli.command {
        Command::Run {
            mode,
            generations,
            pop_size,
            seed,
            persist,
            dry_run,
        } => {
            let mut config = config;
            if let Some(generations) = generations {
                config.evolution.num_generations = generations as usize;
            }
            if let Some(pop_size) = pop_size {
                config.evolution.population_size = usize::try_from(pop_size)
                    .context("Population size does not fit in memory")?;
            }
            if seed.is_some() {
                config.evolution.seed = seed;
            }
            if let Some(persist) = persist {
                config.ledger.persist = persist.into();
            }
            config.validate()?;
            run_evolution(config, mode, dry_run)
        }
        Command::History { generation, limit } => {
            let ledger = SqliteLedger::open(&config.ledger.database_path)?;
            for record in ledger.query(&LedgerQuery { generation, limit })? {
                println!("{}", serde_json::to_string(&record)?);
            }
            Ok(())
        }
        Command::Rewrite { file, prompt } => {
            let existing = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let mut generator = ChatCompletionGenerator::from_env(config.generation)?;
            println!("{}", generator.rewrite(&existing, &prompt)?);
            Ok(())
        }
    }
}

fn run_evolution(config: AppConfig, mode: TrainingMode, dry_run: bool) -> Result<()> {
    log::info!(
        "Starting {} run: {} generations, population {}",
        mode,
        config.evolution.num_generations,
        config.evolution.population_size
    );

    let generator = ChatCompletionGenerator::from_env(config.generation.clone())?;
    let evaluator = CommandEvaluator::new(&config.evaluation)?;
    let scorer = DefaultScorer::from_config(&config.scoring);
    let trainer = build_trainer(mode, &config.evolution, Box::new(evaluator), Box::new(scorer));

    let ledger: Box<dyn GenerationLedger> = if dry_run {
        Box::new(InMemoryLedger::new())
    } else {
        Box::new(SqliteLedger::open(&config.ledger.database_path)?)
    };

    let generations = u32::try_from(config.evolution.num_generations)
        .context("Generation count is too large")?;

    let mut driver = EvolutionDriver::new(
        Box::new(generator),
        trainer,
        ledger,
        config.ledger.persist,
        config.evolution.seed_prompt.clone(),
    );
    let summary = driver
        .run(
            config.evolution.population_size,
            generations,
            &mut ConsoleProgressCallback,
        )
        .context("Evolution run aborted")?;

    println!("{}", summary.best.source_text());
    Ok(())
}
