//! Genetic algorithm over heuristic weight records.
//!
//! # Algorithm Overview
//!
//! 1. **Evaluate Fitness** - Each agent plays `games_per_generation` episodes; the raw
//!    final scores are summed into its fitness (not averaged)
//! 2. **Hall of Fame** - The best agent of the generation replaces the best-ever agent only
//!    when its fitness is strictly greater
//! 3. **Elite Selection** - The top `population_size / elite_divisor` agents are kept unchanged
//! 4. **Tournament Selection** - Parents are the fittest of `tournament_size` distinct
//!    agents drawn uniformly; tournaments are independent of each other
//! 5. **Crossover** - Each field comes from one parent or the other
//! 6. **Mutation** - Each field is perturbed with probability `mutation_rate`
//! 7. **Reset** - Every agent starts the next generation with zero fitness and episodes
//!
//! # Example
//!
//! ```
//! use evotris_training::genetic::{GeneticParams, Population};
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let mut rng = Pcg32::seed_from_u64(0);
//! let mut population = Population::random(GeneticParams::default(), &mut rng);
//! for (i, score) in [120, 40, 0].into_iter().enumerate() {
//!     population.record_episode(i, score);
//! }
//! population.evolve_with_rng(&mut rng);
//!
//! assert_eq!(population.generation(), 1);
//! assert_eq!(population.best_fitness(), 120.0);
//! ```

use evotris_evaluator::weights::{HeuristicWeights, WeightKey};
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::{stats::DescriptiveStats, weights};

/// A candidate weight record with the fitness it has collected this generation.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicAgent {
    weights: HeuristicWeights,
    fitness: f64,
    episodes: u32,
}

impl HeuristicAgent {
    #[must_use]
    pub fn new(weights: HeuristicWeights) -> Self {
        Self {
            weights,
            fitness: 0.0,
            episodes: 0,
        }
    }

    pub fn random<R>(rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        Self::new(weights::random(rng))
    }

    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Sum of the final scores of this generation's episodes.
    #[must_use]
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    #[must_use]
    pub fn episodes(&self) -> u32 {
        self.episodes
    }

    /// Mean score per episode, or 0 before the first episode.
    #[must_use]
    pub fn average_fitness(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.fitness / f64::from(self.episodes)
        }
    }

    pub fn record_episode(&mut self, score: u32) {
        self.fitness += f64::from(score);
        self.episodes += 1;
    }

    fn reset_fitness(&mut self) {
        self.fitness = 0.0;
        self.episodes = 0;
    }
}

/// Controls population size and the genetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    /// Episodes each agent plays per generation.
    pub games_per_generation: u32,
    /// Per-field mutation probability.
    pub mutation_rate: f64,
    /// Half-width of the uniform mutation offset.
    pub mutation_range: f64,
    pub tournament_size: usize,
    /// Elites are the top `population_size / elite_divisor` agents.
    pub elite_divisor: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 20,
            games_per_generation: 3,
            mutation_rate: 0.1,
            mutation_range: 0.2,
            tournament_size: 3,
            elite_divisor: 5,
        }
    }
}

impl GeneticParams {
    #[must_use]
    pub fn elite_count(&self) -> usize {
        self.population_size.checked_div(self.elite_divisor).unwrap_or(0)
    }
}

/// A fixed-size population of heuristic agents plus the best agent ever seen.
#[derive(Debug, Clone)]
pub struct Population {
    params: GeneticParams,
    agents: Vec<HeuristicAgent>,
    generation: usize,
    best_agent: Option<HeuristicAgent>,
    best_fitness: f64,
}

impl Population {
    pub fn random<R>(params: GeneticParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let agents = (0..params.population_size)
            .map(|_| HeuristicAgent::random(rng))
            .collect();
        Self::from_agents(params, agents)
    }

    /// Creates a population from explicit agents; `params.population_size` is ignored in
    /// favour of `agents.len()`.
    #[must_use]
    pub fn from_agents(params: GeneticParams, agents: Vec<HeuristicAgent>) -> Self {
        Self {
            params: GeneticParams {
                population_size: agents.len(),
                ..params
            },
            agents,
            generation: 0,
            best_agent: None,
            best_fitness: 0.0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    #[must_use]
    pub fn agents(&self) -> &[HeuristicAgent] {
        &self.agents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Best agent ever seen, with the fitness it had when it was recorded.
    #[must_use]
    pub fn best_agent(&self) -> Option<&HeuristicAgent> {
        self.best_agent.as_ref()
    }

    /// Fitness of [`Self::best_agent`]; 0 until an agent scores above 0.
    #[must_use]
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Credits agent `index` with one finished episode.
    pub fn record_episode(&mut self, index: usize, score: u32) {
        self.agents[index].record_episode(score);
    }

    #[must_use]
    pub fn fitness_stats(&self) -> Option<DescriptiveStats> {
        DescriptiveStats::new(self.agents.iter().map(HeuristicAgent::fitness))
    }

    /// Per-field spread of the weights across the population.
    #[must_use]
    pub fn weight_stats(&self) -> Vec<(WeightKey, DescriptiveStats)> {
        WeightKey::ALL
            .into_iter()
            .filter_map(|key| {
                let values = self.agents.iter().map(|agent| agent.weights.get(key));
                DescriptiveStats::new(values).map(|stats| (key, stats))
            })
            .collect()
    }

    /// Replaces the population with the next generation using the thread-local RNG.
    pub fn evolve(&mut self) {
        self.evolve_with_rng(&mut rand::rng());
    }

    pub fn evolve_with_rng<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        self.agents.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        if let Some(top) = self.agents.first().filter(|top| top.fitness > self.best_fitness) {
            self.best_fitness = top.fitness;
            self.best_agent = Some(top.clone());
        }

        let elite_count = self.params.elite_count().min(self.agents.len());
        let mut next_agents = Vec::with_capacity(self.agents.len());
        next_agents.extend(self.agents[..elite_count].iter().cloned());

        while next_agents.len() < self.agents.len() {
            let p1 = tournament_select(&self.agents, self.params.tournament_size, rng);
            let p2 = tournament_select(&self.agents, self.params.tournament_size, rng);
            let mut child = weights::crossover(&p1.weights, &p2.weights, rng);
            weights::mutate(
                &mut child,
                self.params.mutation_rate,
                self.params.mutation_range,
                rng,
            );
            next_agents.push(HeuristicAgent::new(child));
        }

        for agent in &mut next_agents {
            agent.reset_fitness();
        }
        self.agents = next_agents;
        self.generation += 1;
    }
}

/// Returns the fittest of `tournament_size` distinct agents drawn uniformly.
///
/// A tournament always has at least one entrant. `agents` must not be empty.
fn tournament_select<'a, R>(
    agents: &'a [HeuristicAgent],
    tournament_size: usize,
    rng: &mut R,
) -> &'a HeuristicAgent
where
    R: Rng + ?Sized,
{
    agents
        .choose_multiple(rng, tournament_size.max(1))
        .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        .unwrap_or(&agents[0])
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn scored_population(scores: &[u32], seed: u64) -> (Population, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let params = GeneticParams {
            population_size: scores.len(),
            ..GeneticParams::default()
        };
        let mut population = Population::random(params, &mut rng);
        for (i, &score) in scores.iter().enumerate() {
            population.record_episode(i, score);
        }
        (population, rng)
    }

    #[test]
    fn test_fitness_accumulates_raw_scores() {
        let mut agent = HeuristicAgent::new(HeuristicWeights::default());
        agent.record_episode(30);
        agent.record_episode(0);
        agent.record_episode(60);
        assert_eq!(agent.fitness(), 90.0);
        assert_eq!(agent.episodes(), 3);
        assert_eq!(agent.average_fitness(), 30.0);
    }

    #[test]
    fn test_elite_count() {
        assert_eq!(GeneticParams::default().elite_count(), 4);
        let params = GeneticParams {
            population_size: 4,
            ..GeneticParams::default()
        };
        assert_eq!(params.elite_count(), 0);
    }

    #[test]
    fn test_best_agent_requires_strict_improvement() {
        let (mut population, mut rng) = scored_population(&[0; 10], 3);
        population.evolve_with_rng(&mut rng);
        assert!(population.best_agent().is_none());
        assert_eq!(population.best_fitness(), 0.0);

        population.record_episode(2, 50);
        population.evolve_with_rng(&mut rng);
        let best = population.best_agent().unwrap().clone();
        assert_eq!(best.fitness(), 50.0);

        population.record_episode(5, 50);
        population.evolve_with_rng(&mut rng);
        assert_eq!(population.best_agent(), Some(&best));
    }

    #[test]
    fn test_tournament_picks_fittest_entrant() {
        let (population, mut rng) = scored_population(&[10, 20, 30], 0);
        for _ in 0..20 {
            let winner = tournament_select(population.agents(), 3, &mut rng);
            assert_eq!(winner.fitness(), 30.0);
        }
    }

    #[test]
    fn test_empty_tournament_falls_back_to_single_entrant() {
        let (population, mut rng) = scored_population(&[10, 20, 30], 4);
        for _ in 0..20 {
            let winner = tournament_select(population.agents(), 0, &mut rng);
            assert!(population.agents().contains(winner));
        }

        let mut rng = Pcg32::seed_from_u64(5);
        let params = GeneticParams {
            population_size: 6,
            tournament_size: 0,
            ..GeneticParams::default()
        };
        let mut population = Population::random(params, &mut rng);
        population.record_episode(0, 40);
        population.evolve_with_rng(&mut rng);
        assert_eq!(population.len(), 6);
        assert_eq!(population.generation(), 1);
    }

    #[test]
    fn test_weight_stats_cover_every_field() {
        let (population, _) = scored_population(&[0; 5], 9);
        let stats = population.weight_stats();
        assert_eq!(
            stats.iter().map(|(key, _)| *key).collect::<Vec<_>>(),
            WeightKey::ALL
        );
        let fitness = population.fitness_stats().unwrap();
        assert_eq!(fitness.max, 0.0);
    }

    proptest! {
        #[test]
        fn evolve_preserves_size_elites_and_resets_fitness(
            scores in proptest::collection::vec(0u32..1000, 5..30),
            generations in 1usize..4,
            seed in any::<u64>(),
        ) {
            let (mut population, mut rng) = scored_population(&scores, seed);
            let size = population.len();

            for _ in 0..generations {
                let mut sorted = population.agents().to_vec();
                sorted.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
                let elites: Vec<_> = sorted[..population.params().elite_count()]
                    .iter()
                    .map(|agent| *agent.weights())
                    .collect();

                population.evolve_with_rng(&mut rng);

                prop_assert_eq!(population.len(), size);
                for (agent, weights) in population.agents().iter().zip(&elites) {
                    prop_assert_eq!(agent.weights(), weights);
                }
                for agent in population.agents() {
                    prop_assert_eq!(agent.fitness(), 0.0);
                    prop_assert_eq!(agent.episodes(), 0);
                }
                for (i, &score) in scores.iter().enumerate() {
                    population.record_episode(i, score);
                }
            }
        }
    }
}
