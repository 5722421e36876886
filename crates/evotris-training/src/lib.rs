//! Training loops for evotris agents.
//!
//! Two optimization strategies share this crate:
//!
//! - **Heuristic path** - [`genetic`] evolves a population of
//!   [`HeuristicWeights`](evotris_evaluator::weights::HeuristicWeights) with tournament
//!   selection, per-field crossover and bounded uniform mutation. [`heuristic_trainer`]
//!   drives it one agent move at a time, crediting each agent with the raw score of its
//!   episodes.
//! - **Neuro path** - [`neat`] evolves the topology and weights of feedforward networks
//!   (NEAT-style speciation and reproduction). [`neuro_trainer`] plays one episode per
//!   genome, shapes the fitness, and keeps the champion, which [`genome_archive`] persists.
//!
//! # Supporting Modules
//!
//! - [`config`] - TOML training configuration with validation
//! - [`stats`] - Descriptive statistics for progress logging
//! - [`weights`] - Genetic operators on heuristic weight records
//!
//! Every stochastic operation takes a caller-provided `Rng` so runs can be reproduced
//! from a seed.

pub mod config;
pub mod genetic;
pub mod genome_archive;
pub mod heuristic_trainer;
pub mod neat;
pub mod neuro_trainer;
pub mod stats;
pub mod weights;
