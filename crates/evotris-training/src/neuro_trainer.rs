//! Neuroevolution of direct controllers.
//!
//! A controller sees the [`FeatureEncoding`] of the current state and answers every move
//! with one action decoded from its outputs:
//!
//! | Output | Action |
//! |---|---|
//! | `out[0] > 0.5` | rotate |
//! | `out[1] < -0.3` / `out[1] > 0.3` | move left / right |
//! | always | one `move_down()` |
//! | `out[2] > 0.5` (drop burst only) | up to 3 more `move_down()`s, stopping at a score change |
//!
//! An episode runs on a freshly reset engine until game over or `move_cap` moves. Its
//! fitness is the final score; a scoring run is shaped by
//! `+0.1 · moves − 0.5 · max_height − 2 · holes`, and the result is floored at 1 so
//! fitness-proportional selection always has positive weights.

use std::path::Path;

use evotris_engine::GameEngine;
use evotris_evaluator::{board_analysis::BoardAnalysis, feature_encoder::FeatureEncoding};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{
    genome_archive::{GenomeArchive, GenomeArchiveError},
    neat::{FeedForwardNetwork, Genome, NeatParams, NeatPopulation},
    stats::DescriptiveStats,
};

const ROTATE_THRESHOLD: f32 = 0.5;
const SHIFT_THRESHOLD: f32 = 0.3;
const DROP_THRESHOLD: f32 = 0.5;
const DROP_BURST_STEPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuroParams {
    /// Moves per training episode.
    pub move_cap: usize,
    /// Safety bound on moves when replaying a trained genome.
    pub play_cap: usize,
    pub encoding: FeatureEncoding,
    /// Adds a third output that can drop the piece several rows at once.
    pub drop_burst: bool,
    pub neat: NeatParams,
}

impl Default for NeuroParams {
    fn default() -> Self {
        Self {
            move_cap: 500,
            play_cap: 100_000,
            encoding: FeatureEncoding::default(),
            drop_burst: false,
            neat: NeatParams::default(),
        }
    }
}

impl NeuroParams {
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.encoding.input_len()
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        if self.drop_burst { 3 } else { 2 }
    }
}

/// Outcome of one controller episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpisodeReport {
    pub score: u32,
    pub moves: usize,
    pub max_height: u8,
    pub holes: u32,
    pub fitness: f64,
}

/// Summary of one training generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    pub generation: usize,
    pub fitness: DescriptiveStats,
    pub best_score: u32,
    pub num_species: usize,
    pub champion_fitness: f64,
}

/// Applies the action encoded by `outputs` to `engine`.
pub fn apply_action<E>(engine: &mut E, outputs: &[f32], drop_burst: bool)
where
    E: GameEngine,
{
    if outputs.first().is_some_and(|&o| o > ROTATE_THRESHOLD) {
        engine.rotate();
    }
    match outputs.get(1) {
        Some(&o) if o < -SHIFT_THRESHOLD => engine.move_left(),
        Some(&o) if o > SHIFT_THRESHOLD => engine.move_right(),
        _ => {}
    }
    engine.move_down();

    if drop_burst && outputs.get(2).is_some_and(|&o| o > DROP_THRESHOLD) {
        let score = engine.score();
        for _ in 0..DROP_BURST_STEPS {
            let outcome = engine.move_down();
            if outcome.is_game_over() || outcome.is_ignored() || engine.score() > score {
                break;
            }
        }
    }
}

/// Final score adjusted by survival length and board shape, floored at 1.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn shape_fitness(score: u32, moves: usize, max_height: u8, holes: u32) -> f64 {
    let mut fitness = f64::from(score);
    if score > 0 {
        fitness += 0.1 * moves as f64 - 0.5 * f64::from(max_height) - 2.0 * f64::from(holes);
    }
    fitness.max(1.0)
}

/// Resets `engine` and lets `network` play until game over or `move_cap` moves.
pub fn run_episode<E>(
    engine: &mut E,
    network: &FeedForwardNetwork,
    encoding: FeatureEncoding,
    drop_burst: bool,
    move_cap: usize,
) -> EpisodeReport
where
    E: GameEngine,
{
    engine.reset();
    let mut moves = 0;
    while moves < move_cap && !engine.is_game_over() {
        let inputs = encoding.encode(&engine.snapshot());
        let outputs = network.activate(&inputs);
        apply_action(engine, &outputs, drop_burst);
        moves += 1;
    }

    let analysis = BoardAnalysis::from_grid(engine.grid());
    let score = engine.score();
    let max_height = analysis.max_height();
    let holes = analysis.num_holes();
    EpisodeReport {
        score,
        moves,
        max_height,
        holes,
        fitness: shape_fitness(score, moves, max_height, holes),
    }
}

/// Owns a NEAT population, the engine its controllers play on, and the best genome seen.
#[derive(Debug, Clone)]
pub struct NeuroTrainer<E> {
    engine: E,
    params: NeuroParams,
    population: NeatPopulation,
    champion: Option<Genome>,
    rng: Pcg32,
}

impl<E> NeuroTrainer<E>
where
    E: GameEngine,
{
    pub fn new(engine: E, params: NeuroParams, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let population =
            NeatPopulation::new(params.num_inputs(), params.num_outputs(), params.neat, &mut rng);
        Self {
            engine,
            params,
            population,
            champion: None,
            rng,
        }
    }

    #[must_use]
    pub fn params(&self) -> &NeuroParams {
        &self.params
    }

    #[must_use]
    pub fn population(&self) -> &NeatPopulation {
        &self.population
    }

    /// Best genome ever evaluated, with its fitness set.
    #[must_use]
    pub fn champion(&self) -> Option<&Genome> {
        self.champion.as_ref()
    }

    /// Plays one training episode with `genome` and returns its report.
    pub fn evaluate(&mut self, genome: &Genome) -> EpisodeReport {
        let network = FeedForwardNetwork::new(genome);
        run_episode(
            &mut self.engine,
            &network,
            self.params.encoding,
            self.params.drop_burst,
            self.params.move_cap,
        )
    }

    /// Evaluates every genome, records the champion, and breeds the next generation.
    pub fn run_generation(&mut self) -> GenerationSummary {
        let generation = self.population.generation();
        let mut best_score = 0;
        for index in 0..self.population.genomes().len() {
            let genome = &self.population.genomes()[index];
            let network = FeedForwardNetwork::new(genome);
            let report = run_episode(
                &mut self.engine,
                &network,
                self.params.encoding,
                self.params.drop_burst,
                self.params.move_cap,
            );
            tracing::debug!(
                generation,
                genome = index,
                score = report.score,
                moves = report.moves,
                fitness = report.fitness,
                "episode finished"
            );
            best_score = best_score.max(report.score);
            self.population.genomes_mut()[index].set_fitness(report.fitness);
        }

        if let Some(best) = self.population.best_genome() {
            let improved = self
                .champion
                .as_ref()
                .is_none_or(|champion| best.fitness() > champion.fitness());
            if improved {
                self.champion = Some(best.clone());
            }
        }

        let fitness = DescriptiveStats::new(
            self.population
                .genomes()
                .iter()
                .filter_map(Genome::fitness),
        )
        .unwrap_or_default();
        self.population.reproduce(&mut self.rng);

        let summary = GenerationSummary {
            generation,
            fitness,
            best_score,
            num_species: self.population.species().len(),
            champion_fitness: self
                .champion
                .as_ref()
                .and_then(Genome::fitness)
                .unwrap_or(0.0),
        };
        tracing::info!(
            generation,
            best = summary.fitness.max,
            mean = summary.fitness.mean,
            best_score,
            species = summary.num_species,
            champion = summary.champion_fitness,
            "generation finished"
        );
        summary
    }

    /// Runs `generations` generations and returns the champion.
    pub fn train(&mut self, generations: usize) -> Option<&Genome> {
        for _ in 0..generations {
            self.run_generation();
        }
        self.champion()
    }

    /// Writes the champion to `path` as a [`GenomeArchive`].
    pub fn save_best<P>(&self, path: P, name: &str) -> Result<GenomeArchive, GenomeArchiveError>
    where
        P: AsRef<Path>,
    {
        let champion = self.champion.as_ref().ok_or(GenomeArchiveError::NoChampion)?;
        let archive = GenomeArchive::new(
            name,
            champion.clone(),
            self.params.encoding,
            self.params.drop_burst,
        );
        archive.save(path)?;
        Ok(archive)
    }

    /// Replays `genome` on the trainer's engine until game over or `play_cap` moves.
    pub fn play_genome(&mut self, genome: &Genome) -> EpisodeReport {
        play_genome(&mut self.engine, genome, &self.params)
    }
}

/// Replays `genome` on `engine` until game over or `params.play_cap` moves.
pub fn play_genome<E>(engine: &mut E, genome: &Genome, params: &NeuroParams) -> EpisodeReport
where
    E: GameEngine,
{
    let network = FeedForwardNetwork::new(genome);
    run_episode(
        engine,
        &network,
        params.encoding,
        params.drop_burst,
        params.play_cap,
    )
}
