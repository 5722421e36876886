//! NeuroEvolution of Augmenting Topologies (NEAT) for feedforward controllers.
//!
//! # Key Components
//!
//! - [`Genome`] - Node genes and connection genes with innovation numbers
//! - [`FeedForwardNetwork`] - Evaluates a genome's enabled connections layer by layer
//! - [`InnovationTracker`] - Hands out innovation numbers and hidden node ids so identical
//!   structural mutations line up across genomes
//! - [`Species`] - Genomes grouped by compatibility distance
//! - [`NeatPopulation`] - Speciation, fitness sharing and reproduction
//!
//! # Generation Cycle
//!
//! 1. The caller assigns a strictly positive fitness to every genome
//! 2. Genomes are speciated against the previous representatives
//! 3. Each species' fitness is shared among its members; offspring quotas follow the
//!    shared totals
//! 4. Species elites are copied unchanged, the rest are bred from the top
//!    `survival_threshold` of each species by roulette selection
//!
//! Networks are kept acyclic: add-connection rejects any edge that would close a cycle,
//! counting disabled connections too, so re-enabling a connection is always safe.

pub use self::{genome::*, innovation::*, network::*, params::*, population::*, species::*};

mod genome;
mod innovation;
mod network;
mod params;
mod population;
mod species;
