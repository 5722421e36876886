//! Frame-driven training of heuristic weights.
//!
//! [`HeuristicTrainer::step`] performs one simulated move of the active agent: it searches
//! the best placement with the agent's weights and commits it with a single drop. An episode
//! ends on game over or after `move_cap` moves, and is credited to the agent; after
//! `games_per_generation` episodes the next agent takes over, and after the last agent the
//! population evolves.

use evotris_engine::GameEngine;
use evotris_evaluator::{
    placement_search::{PlacementSearch, SearchParams, apply_placement},
    weights::HeuristicWeights,
};
use rand::SeedableRng as _;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::genetic::Population;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverParams {
    /// Agent moves simulated per [`HeuristicTrainer::advance_frame`].
    pub steps_per_frame: usize,
    /// Moves after which a surviving episode ends with its current score.
    pub move_cap: usize,
}

impl Default for DriverParams {
    fn default() -> Self {
        Self {
            steps_per_frame: 50,
            move_cap: 5_000,
        }
    }
}

/// What a single [`HeuristicTrainer::step`] completed besides the move itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    Moved,
    /// An episode ended (game over or move cap) and was credited to `agent` before this move.
    EpisodeFinished { agent: usize, score: u32 },
    /// The last agent finished and the population evolved into `generation`.
    GenerationFinished { generation: usize },
}

/// Progress snapshot for logs and displays.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingStatus {
    pub generation: usize,
    pub agent_index: usize,
    pub population_size: usize,
    pub current_score: u32,
    /// Best-ever fitness divided by `games_per_generation`.
    pub best_average_score: f64,
    pub best_weights: Option<HeuristicWeights>,
}

#[derive(Debug, Clone)]
pub struct HeuristicTrainer<E> {
    population: Population,
    engine: E,
    search: PlacementSearch,
    driver: DriverParams,
    agent_index: usize,
    episode_moves: usize,
    rng: Pcg32,
}

impl<E> HeuristicTrainer<E>
where
    E: GameEngine,
{
    /// Creates a trainer; `engine` is reset so the first agent starts a fresh game.
    pub fn new(
        population: Population,
        mut engine: E,
        search: SearchParams,
        driver: DriverParams,
        seed: u64,
    ) -> Self {
        engine.reset();
        Self {
            population,
            engine,
            search: PlacementSearch::new(search),
            driver,
            agent_index: 0,
            episode_moves: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn population(&self) -> &Population {
        &self.population
    }

    #[must_use]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[must_use]
    pub fn agent_index(&self) -> usize {
        self.agent_index
    }

    /// Simulates one move of the active agent.
    pub fn step(&mut self) -> StepOutcome {
        let mut outcome = StepOutcome::Moved;
        if self.engine.is_game_over() || self.episode_moves >= self.driver.move_cap {
            outcome = self.finish_episode();
            self.engine.reset();
            self.episode_moves = 0;
        }

        let weights = *self.population.agents()[self.agent_index].weights();
        let placement = self.search.best_move(&self.engine, &weights);
        if !apply_placement(&mut self.engine, placement) {
            tracing::trace!(?placement, "placement left the piece outside the grid");
        }
        self.episode_moves += 1;
        outcome
    }

    /// Performs `steps_per_frame` steps and returns the number of generations completed.
    pub fn advance_frame(&mut self) -> usize {
        let mut generations = 0;
        for _ in 0..self.driver.steps_per_frame {
            if self.step().is_generation_finished() {
                generations += 1;
            }
        }
        generations
    }

    #[must_use]
    pub fn status(&self) -> TrainingStatus {
        let games = self.population.params().games_per_generation.max(1);
        TrainingStatus {
            generation: self.population.generation(),
            agent_index: self.agent_index,
            population_size: self.population.len(),
            current_score: self.engine.score(),
            best_average_score: self.population.best_fitness() / f64::from(games),
            best_weights: self.population.best_agent().map(|agent| *agent.weights()),
        }
    }

    fn finish_episode(&mut self) -> StepOutcome {
        let agent = self.agent_index;
        let score = self.engine.score();
        self.population.record_episode(agent, score);
        tracing::debug!(
            generation = self.population.generation(),
            agent,
            score,
            moves = self.episode_moves,
            capped = !self.engine.is_game_over(),
            "episode finished"
        );

        let games = self.population.params().games_per_generation;
        if self.population.agents()[agent].episodes() < games {
            return StepOutcome::EpisodeFinished { agent, score };
        }
        self.agent_index += 1;
        if self.agent_index < self.population.len() {
            return StepOutcome::EpisodeFinished { agent, score };
        }

        self.log_generation();
        self.population.evolve_with_rng(&mut self.rng);
        self.agent_index = 0;
        StepOutcome::GenerationFinished {
            generation: self.population.generation(),
        }
    }

    fn log_generation(&self) {
        let Some(fitness) = self.population.fitness_stats() else {
            return;
        };
        tracing::info!(
            generation = self.population.generation(),
            min = fitness.min,
            max = fitness.max,
            mean = fitness.mean,
            median = fitness.median,
            std_dev = fitness.std_dev,
            "generation finished"
        );
        for (key, stats) in self.population.weight_stats() {
            tracing::debug!(
                weight = %key,
                min = stats.min,
                max = stats.max,
                mean = stats.mean,
                normalized_std_dev = stats.normalized_std_dev,
                "weight spread"
            );
        }
    }
}
