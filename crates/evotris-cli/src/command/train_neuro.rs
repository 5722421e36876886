use std::path::PathBuf;

use anyhow::Context as _;
use evotris_engine::{Game, PieceSeed};
use evotris_evaluator::feature_encoder::FeatureEncoding;
use evotris_training::neuro_trainer::NeuroTrainer;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainNeuroArg {
    /// Training configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to train
    #[arg(long, default_value_t = 50)]
    generations: usize,
    /// Feature encoding fed to the networks (occupancy or surface)
    #[arg(long)]
    encoding: Option<FeatureEncoding>,
    /// Genome archive output path
    #[arg(long, default_value = "best_genome.json")]
    output: PathBuf,
    /// Name stored in the archive
    #[arg(long, default_value = "neat")]
    name: String,
}

pub(crate) fn run(arg: &TrainNeuroArg) -> anyhow::Result<()> {
    let TrainNeuroArg {
        config,
        generations,
        encoding,
        output,
        name,
    } = arg;
    let mut config = util::load_config(config.as_deref())?;
    if let Some(encoding) = encoding {
        config.neuro.encoding = *encoding;
    }
    let seed = util::resolve_seed(config.seed);

    let mut trainer = NeuroTrainer::new(Game::with_seed(PieceSeed::from(seed)), config.neuro, seed);
    tracing::info!(
        seed,
        generations,
        encoding = %config.neuro.encoding,
        inputs = config.neuro.num_inputs(),
        outputs = config.neuro.num_outputs(),
        population = config.neuro.neat.population_size,
        "neuroevolution started"
    );
    trainer.train(*generations);

    let archive = trainer
        .save_best(output, name)
        .with_context(|| format!("Failed to save genome archive: {}", output.display()))?;

    eprintln!();
    eprintln!("Genome saved successfully");
    eprintln!("  Path: {}", output.display());
    eprintln!("  Name: {}", archive.name);
    eprintln!("  Trained at: {}", archive.trained_at);
    eprintln!("  Fitness: {:.3}", archive.fitness);
    eprintln!(
        "  Network: {} hidden nodes, {} enabled connections",
        archive.genome.num_hidden(),
        archive.genome.num_enabled_connections()
    );

    Ok(())
}
