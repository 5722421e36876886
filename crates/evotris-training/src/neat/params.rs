use serde::{Deserialize, Serialize};

/// Mutation, speciation and reproduction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeatParams {
    pub population_size: usize,

    /// Standard deviation of initial weights and biases.
    pub init_stdev: f32,
    /// Weights and biases are clamped to `[-weight_limit, weight_limit]`.
    pub weight_limit: f32,
    /// Per-connection probability of a weight mutation.
    pub weight_mutate_rate: f64,
    /// Standard deviation of a weight perturbation.
    pub weight_perturb_power: f32,
    /// Per-connection probability of replacing a weight with a fresh draw.
    pub weight_replace_rate: f64,
    pub bias_mutate_rate: f64,
    pub bias_perturb_power: f32,

    pub add_connection_prob: f64,
    pub add_node_prob: f64,
    pub toggle_enable_prob: f64,
    /// Chance that a matching gene disabled in either parent stays disabled.
    pub inherit_disabled_prob: f64,
    /// Chance of breeding two parents instead of cloning one.
    pub crossover_prob: f64,

    pub compatibility_threshold: f64,
    /// `c1`, applied to the excess and disjoint gene count.
    pub excess_coefficient: f64,
    /// `c3`, applied to the mean weight difference of matching genes.
    pub weight_coefficient: f64,

    /// Genomes copied unchanged from each species.
    pub elitism: usize,
    /// Fraction of each species allowed to breed.
    pub survival_threshold: f64,
    /// Generations without improvement before a species is dropped.
    pub max_stagnation: usize,
    /// Number of best species never dropped for stagnation.
    pub species_elitism: usize,
}

impl Default for NeatParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            init_stdev: 1.0,
            weight_limit: 30.0,
            weight_mutate_rate: 0.8,
            weight_perturb_power: 0.5,
            weight_replace_rate: 0.1,
            bias_mutate_rate: 0.7,
            bias_perturb_power: 0.5,
            add_connection_prob: 0.5,
            add_node_prob: 0.2,
            toggle_enable_prob: 0.01,
            inherit_disabled_prob: 0.75,
            crossover_prob: 0.75,
            compatibility_threshold: 3.0,
            excess_coefficient: 1.0,
            weight_coefficient: 0.5,
            elitism: 2,
            survival_threshold: 0.2,
            max_stagnation: 20,
            species_elitism: 2,
        }
    }
}

impl NeatParams {
    /// Every probability-valued field paired with its name.
    #[must_use]
    pub fn probabilities(&self) -> [(&'static str, f64); 9] {
        [
            ("weight_mutate_rate", self.weight_mutate_rate),
            ("weight_replace_rate", self.weight_replace_rate),
            ("bias_mutate_rate", self.bias_mutate_rate),
            ("add_connection_prob", self.add_connection_prob),
            ("add_node_prob", self.add_node_prob),
            ("toggle_enable_prob", self.toggle_enable_prob),
            ("inherit_disabled_prob", self.inherit_disabled_prob),
            ("crossover_prob", self.crossover_prob),
            ("survival_threshold", self.survival_threshold),
        ]
    }
}
