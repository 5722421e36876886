use rand::{Rng, seq::IndexedRandom};

use super::{
    genome::Genome,
    innovation::InnovationTracker,
    params::NeatParams,
    species::{Species, speciate},
};

/// A NEAT population with its species and innovation history.
#[derive(Debug, Clone)]
pub struct NeatPopulation {
    params: NeatParams,
    num_inputs: usize,
    num_outputs: usize,
    genomes: Vec<Genome>,
    species: Vec<Species>,
    tracker: InnovationTracker,
    generation: usize,
    next_species_id: usize,
}

impl NeatPopulation {
    /// Creates `params.population_size` fully connected genomes with random weights.
    pub fn new<R>(num_inputs: usize, num_outputs: usize, params: NeatParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut tracker = InnovationTracker::new(num_inputs + num_outputs);
        let genomes = (0..params.population_size)
            .map(|_| Genome::fully_connected(num_inputs, num_outputs, &mut tracker, &params, rng))
            .collect();
        Self {
            params,
            num_inputs,
            num_outputs,
            genomes,
            species: vec![],
            tracker,
            generation: 0,
            next_species_id: 0,
        }
    }

    #[must_use]
    pub fn params(&self) -> &NeatParams {
        &self.params
    }

    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }

    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    pub fn genomes_mut(&mut self) -> &mut [Genome] {
        &mut self.genomes
    }

    /// Species from the most recent reproduction; empty before the first one.
    #[must_use]
    pub fn species(&self) -> &[Species] {
        &self.species
    }

    /// Evaluated genome with the highest fitness.
    #[must_use]
    pub fn best_genome(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.fitness().is_some())
            .max_by(|a, b| a.fitness().unwrap_or(0.0).total_cmp(&b.fitness().unwrap_or(0.0)))
    }

    /// Replaces the current genomes with the next generation.
    ///
    /// Every genome should carry a fitness; unevaluated ones count as zero. The population
    /// size stays at `params.population_size`.
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn reproduce<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let params = self.params;
        speciate(
            &mut self.species,
            &self.genomes,
            &params,
            self.generation,
            &mut self.next_species_id,
        );

        for s in &mut self.species {
            s.record_fitness(&self.genomes, self.generation);
        }
        self.remove_stagnant_species();

        let shared: Vec<f64> = self
            .species
            .iter()
            .map(|s| {
                let total: f64 = s.members().iter().map(|&i| fitness_of(&self.genomes[i])).sum();
                total / s.members().len() as f64
            })
            .collect();
        let quotas = apportion(&shared, params.population_size);

        let mut next = Vec::with_capacity(params.population_size);
        for (s, quota) in self.species.iter().zip(quotas) {
            if quota == 0 {
                continue;
            }
            let mut members: Vec<&Genome> = s.members().iter().map(|&i| &self.genomes[i]).collect();
            members.sort_by(|a, b| fitness_of(b).total_cmp(&fitness_of(a)));

            let elites = params.elitism.min(quota).min(members.len());
            for elite in &members[..elites] {
                let mut child = (*elite).clone();
                child.clear_fitness();
                next.push(child);
            }

            let survivors = ((params.survival_threshold * members.len() as f64).ceil() as usize)
                .max(2)
                .min(members.len());
            let parents = &members[..survivors];
            for _ in elites..quota {
                let Some(parent1) = roulette(parents, rng) else {
                    break;
                };
                let mut child = match roulette(parents, rng) {
                    Some(parent2) if rng.random_bool(params.crossover_prob) => {
                        Genome::crossover(parent1, parent2, &params, rng)
                    }
                    _ => parent1.clone(),
                };
                child.clear_fitness();
                child.mutate(&mut self.tracker, &params, rng);
                next.push(child);
            }
        }

        self.genomes = next;
        self.generation += 1;
    }

    fn remove_stagnant_species(&mut self) {
        let mut ranked: Vec<usize> = (0..self.species.len()).collect();
        ranked.sort_by(|&a, &b| {
            self.species[b]
                .best_fitness()
                .total_cmp(&self.species[a].best_fitness())
        });
        let protected = self.params.species_elitism.max(1);
        let mut keep = vec![false; self.species.len()];
        for (rank, &index) in ranked.iter().enumerate() {
            keep[index] =
                rank < protected || self.species[index].stagnation(self.generation) < self.params.max_stagnation;
        }
        let mut keep = keep.into_iter();
        self.species.retain(|_| keep.next().unwrap_or(true));
    }
}

fn fitness_of(genome: &Genome) -> f64 {
    genome.fitness().unwrap_or(0.0).max(0.0)
}

fn roulette<'a, R>(parents: &[&'a Genome], rng: &mut R) -> Option<&'a Genome>
where
    R: Rng + ?Sized,
{
    parents
        .choose_weighted(rng, |g| fitness_of(g))
        .ok()
        .or_else(|| parents.choose(rng))
        .copied()
}

/// Splits `total` offspring proportionally to `weights`, handing out the rounding remainder
/// by largest fractional part. Falls back to equal shares when the weights sum to zero.
#[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn apportion(weights: &[f64], total: usize) -> Vec<usize> {
    if weights.is_empty() {
        return vec![];
    }
    let sum: f64 = weights.iter().sum();
    let exact: Vec<f64> = if sum > 0.0 && sum.is_finite() {
        weights.iter().map(|w| w / sum * total as f64).collect()
    } else {
        vec![total as f64 / weights.len() as f64; weights.len()]
    };

    let mut quotas: Vec<usize> = exact.iter().map(|x| x.floor() as usize).collect();
    let assigned: usize = quotas.iter().sum();
    let mut by_remainder: Vec<usize> = (0..exact.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.total_cmp(&ra)
    });
    for &i in by_remainder.iter().cycle().take(total.saturating_sub(assigned)) {
        quotas[i] += 1;
    }
    quotas
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_apportion() {
        assert_eq!(apportion(&[1.0, 1.0], 10), vec![5, 5]);
        assert_eq!(apportion(&[3.0, 1.0], 10), vec![8, 2]);
        assert_eq!(apportion(&[0.0, 0.0, 0.0], 10).iter().sum::<usize>(), 10);
        assert_eq!(apportion(&[1.0, 1.0, 1.0], 10).iter().sum::<usize>(), 10);
        assert!(apportion(&[], 10).is_empty());
    }

    #[test]
    fn test_new_population() {
        let mut rng = Pcg32::seed_from_u64(0);
        let population = NeatPopulation::new(5, 2, NeatParams::default(), &mut rng);
        assert_eq!(population.genomes().len(), 50);
        assert_eq!(population.generation(), 0);
        assert!(population.species().is_empty());
        assert!(population.best_genome().is_none());
    }

    #[test]
    fn test_reproduce_keeps_population_size() {
        let mut rng = Pcg32::seed_from_u64(1);
        let params = NeatParams {
            population_size: 30,
            ..NeatParams::default()
        };
        let mut population = NeatPopulation::new(6, 3, params, &mut rng);

        for generation in 0..10 {
            for (i, genome) in population.genomes_mut().iter_mut().enumerate() {
                genome.set_fitness(1.0 + (i % 7) as f64 + genome.num_hidden() as f64);
            }
            let best = population.best_genome().and_then(Genome::fitness);
            assert!(best.is_some());

            population.reproduce(&mut rng);
            assert_eq!(population.genomes().len(), 30, "generation {generation}");
            assert_eq!(population.generation(), generation + 1);
            assert!(!population.species().is_empty());
            for genome in population.genomes() {
                assert_eq!(genome.fitness(), None);
                assert_eq!(genome.validate(), Ok(()));
            }
        }
    }

    #[test]
    fn test_elites_survive_unchanged() {
        let mut rng = Pcg32::seed_from_u64(2);
        let params = NeatParams {
            population_size: 10,
            elitism: 1,
            ..NeatParams::default()
        };
        let mut population = NeatPopulation::new(3, 1, params, &mut rng);
        for (i, genome) in population.genomes_mut().iter_mut().enumerate() {
            genome.set_fitness(if i == 4 { 100.0 } else { 1.0 });
        }
        let mut champion = population.genomes()[4].clone();
        champion.clear_fitness();

        population.reproduce(&mut rng);
        assert!(population.genomes().contains(&champion));
    }
}
