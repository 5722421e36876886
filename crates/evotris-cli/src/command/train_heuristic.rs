use std::path::PathBuf;

use anyhow::Context as _;
use chrono::Utc;
use evotris_engine::{Game, PieceSeed};
use evotris_training::{genetic::Population, heuristic_trainer::HeuristicTrainer};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;

use crate::{model::heuristic_model::HeuristicModel, util};

/// Frames between progress log lines.
const PROGRESS_INTERVAL: usize = 200;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainHeuristicArg {
    /// Training configuration file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations to train
    #[arg(long, default_value_t = 30)]
    generations: usize,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &TrainHeuristicArg) -> anyhow::Result<()> {
    let TrainHeuristicArg {
        config,
        generations,
        output,
    } = arg;
    let config = util::load_config(config.as_deref())?;
    let seed = util::resolve_seed(config.seed);

    let mut rng = Pcg32::seed_from_u64(seed);
    let population = Population::random(config.genetic, &mut rng);
    let mut trainer = HeuristicTrainer::new(
        population,
        Game::with_seed(PieceSeed::from(seed)),
        config.search,
        config.driver,
        seed,
    );
    tracing::info!(
        seed,
        generations,
        population = config.genetic.population_size,
        "heuristic training started"
    );

    let mut completed = 0;
    let mut frame = 0;
    while completed < *generations {
        completed += trainer.advance_frame();
        frame += 1;
        if frame % PROGRESS_INTERVAL == 0 {
            let status = trainer.status();
            tracing::info!(
                generation = status.generation,
                agent = status.agent_index + 1,
                population = status.population_size,
                score = status.current_score,
                best_average_score = status.best_average_score,
                "training"
            );
        }
    }

    let population = trainer.population();
    let best = match population.best_agent() {
        Some(best) => best,
        None => {
            tracing::warn!("no agent scored above zero; saving the first agent");
            population
                .agents()
                .first()
                .context("population is empty")?
        }
    };
    let games = population.params().games_per_generation.max(1);
    let model = HeuristicModel {
        name: "heuristic".to_owned(),
        trained_at: Utc::now(),
        generations: population.generation(),
        fitness: best.fitness(),
        average_score: best.fitness() / f64::from(games),
        search: config.search,
        weights: *best.weights(),
    };
    util::save_json(&model, output.as_deref())?;

    eprintln!();
    eprintln!("Model saved successfully");
    if let Some(path) = &output {
        eprintln!("  Path: {}", path.display());
    }
    eprintln!("  Trained at: {}", model.trained_at);
    eprintln!("  Generations: {}", model.generations);
    eprintln!("  Average score: {:.1}", model.average_score);
    for (key, weight) in model.weights.iter() {
        eprintln!("  {key}: {weight:.3}");
    }

    Ok(())
}
