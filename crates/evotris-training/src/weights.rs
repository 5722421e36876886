//! Genetic operators on [`HeuristicWeights`].
//!
//! Each operator is written once over [`WeightKey`] and applied field by field:
//!
//! - **Initialization**: [`random`] draws penalties from `[-1, 0)` and the
//!   lines-cleared reward from `[0, 1)`
//! - **Crossover**: [`crossover`] takes every field from one parent or the other with equal
//!   probability
//! - **Mutation**: [`mutate`] perturbs each field with probability `rate` by a uniform
//!   offset in `[-range, range]`
//!
//! Weights are left unbounded; mutation can drift a penalty above zero.

use evotris_evaluator::weights::{HeuristicWeights, WeightKey};
use rand::Rng;

/// Draws an initial weight record.
pub fn random<R>(rng: &mut R) -> HeuristicWeights
where
    R: Rng + ?Sized,
{
    HeuristicWeights::from_fn(|key| {
        if key.is_reward() {
            rng.random_range(0.0..1.0)
        } else {
            rng.random_range(-1.0..0.0)
        }
    })
}

/// Uniform per-field crossover.
pub fn crossover<R>(p1: &HeuristicWeights, p2: &HeuristicWeights, rng: &mut R) -> HeuristicWeights
where
    R: Rng + ?Sized,
{
    HeuristicWeights::from_fn(|key: WeightKey| {
        if rng.random_bool(0.5) {
            p1.get(key)
        } else {
            p2.get(key)
        }
    })
}

/// Perturbs each field with probability `rate` by an offset drawn from `[-range, range]`.
pub fn mutate<R>(weights: &mut HeuristicWeights, rate: f64, range: f64, rng: &mut R)
where
    R: Rng + ?Sized,
{
    for (_key, w) in weights.iter_mut() {
        if rng.random_bool(rate) {
            *w += rng.random_range(-range..=range);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    fn arb_weights() -> impl Strategy<Value = HeuristicWeights> {
        (-2.0..2.0f64, -2.0..2.0f64, -2.0..2.0f64, -2.0..2.0f64).prop_map(
            |(height, holes, bumpiness, lines_cleared)| HeuristicWeights {
                height,
                holes,
                bumpiness,
                lines_cleared,
            },
        )
    }

    #[test]
    fn test_random_respects_signs() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..100 {
            let weights = random(&mut rng);
            for (key, w) in weights.iter() {
                if key.is_reward() {
                    assert!((0.0..1.0).contains(&w), "{key}: {w}");
                } else {
                    assert!((-1.0..0.0).contains(&w), "{key}: {w}");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn crossover_takes_each_field_from_a_parent(
            p1 in arb_weights(),
            p2 in arb_weights(),
            seed in any::<u64>(),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let child = crossover(&p1, &p2, &mut rng);
            for key in WeightKey::ALL {
                let w = child.get(key);
                prop_assert!(w == p1.get(key) || w == p2.get(key));
            }
        }

        #[test]
        fn zero_rate_mutation_is_identity(weights in arb_weights(), seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut mutated = weights;
            mutate(&mut mutated, 0.0, 0.2, &mut rng);
            prop_assert_eq!(mutated, weights);
        }

        #[test]
        fn full_rate_mutation_stays_in_range(weights in arb_weights(), seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut mutated = weights;
            mutate(&mut mutated, 1.0, 0.2, &mut rng);
            for key in WeightKey::ALL {
                let delta = mutated.get(key) - weights.get(key);
                prop_assert!(delta.abs() <= 0.2 + 1e-12, "{}: {}", key, delta);
            }
        }
    }
}
