use super::{genome::Genome, params::NeatParams};

/// A group of mutually compatible genomes.
#[derive(Debug, Clone)]
pub struct Species {
    id: usize,
    representative: Genome,
    members: Vec<usize>,
    best_fitness: f64,
    last_improved: usize,
}

impl Species {
    fn new(id: usize, representative: Genome, generation: usize) -> Self {
        Self {
            id,
            representative,
            members: vec![],
            best_fitness: f64::MIN,
            last_improved: generation,
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[must_use]
    pub fn representative(&self) -> &Genome {
        &self.representative
    }

    /// Indices of the member genomes in the population.
    #[must_use]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Best raw fitness any member has reached so far.
    #[must_use]
    pub fn best_fitness(&self) -> f64 {
        self.best_fitness
    }

    /// Generations since the best fitness last improved.
    #[must_use]
    pub fn stagnation(&self, generation: usize) -> usize {
        generation.saturating_sub(self.last_improved)
    }

    /// Updates the improvement record from the members' current fitness.
    pub(crate) fn record_fitness(&mut self, genomes: &[Genome], generation: usize) {
        let best = self
            .members
            .iter()
            .filter_map(|&i| genomes[i].fitness())
            .fold(f64::MIN, f64::max);
        if best > self.best_fitness {
            self.best_fitness = best;
            self.last_improved = generation;
        }
    }
}

/// Assigns every genome to the first species whose representative is within the
/// compatibility threshold, founding new species as needed.
///
/// Empty species are dropped, and each surviving species takes the member closest to its
/// previous representative as the new one.
pub(crate) fn speciate(
    species: &mut Vec<Species>,
    genomes: &[Genome],
    params: &NeatParams,
    generation: usize,
    next_id: &mut usize,
) {
    for s in species.iter_mut() {
        s.members.clear();
    }

    for (index, genome) in genomes.iter().enumerate() {
        let found = species
            .iter_mut()
            .find(|s| s.representative.distance(genome, params) < params.compatibility_threshold);
        if let Some(s) = found {
            s.members.push(index);
        } else {
            let mut s = Species::new(*next_id, genome.clone(), generation);
            *next_id += 1;
            s.members.push(index);
            species.push(s);
        }
    }

    species.retain(|s| !s.members.is_empty());
    for s in species.iter_mut() {
        let closest = s.members.iter().copied().min_by(|&a, &b| {
            let da = s.representative.distance(&genomes[a], params);
            let db = s.representative.distance(&genomes[b], params);
            da.total_cmp(&db)
        });
        if let Some(closest) = closest {
            s.representative = genomes[closest].clone();
        }
    }
}
