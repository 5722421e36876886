use serde::{Deserialize, Serialize};

/// Identifies one field of [`HeuristicWeights`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum WeightKey {
    #[display("height")]
    Height,
    #[display("holes")]
    Holes,
    #[display("bumpiness")]
    Bumpiness,
    #[display("lines_cleared")]
    LinesCleared,
}

impl WeightKey {
    pub const LEN: usize = 4;

    pub const ALL: [Self; Self::LEN] = [
        WeightKey::Height,
        WeightKey::Holes,
        WeightKey::Bumpiness,
        WeightKey::LinesCleared,
    ];

    /// Whether a larger feature value is desirable.
    ///
    /// Penalties start out negative and the lines-cleared reward positive when a population
    /// is initialized.
    #[must_use]
    pub const fn is_reward(self) -> bool {
        matches!(self, WeightKey::LinesCleared)
    }
}

/// Coefficients of the linear board evaluation.
///
/// # Example
///
/// ```
/// use evotris_evaluator::weights::{HeuristicWeights, WeightKey};
///
/// let weights = HeuristicWeights::from_fn(|key| if key.is_reward() { 1.0 } else { -1.0 });
/// assert_eq!(weights.get(WeightKey::Holes), -1.0);
/// assert_eq!(weights.iter().filter(|(_, w)| *w > 0.0).count(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HeuristicWeights {
    pub height: f64,
    pub holes: f64,
    pub bumpiness: f64,
    pub lines_cleared: f64,
}

impl HeuristicWeights {
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(WeightKey) -> f64,
    {
        Self {
            height: f(WeightKey::Height),
            holes: f(WeightKey::Holes),
            bumpiness: f(WeightKey::Bumpiness),
            lines_cleared: f(WeightKey::LinesCleared),
        }
    }

    #[must_use]
    pub fn get(&self, key: WeightKey) -> f64 {
        match key {
            WeightKey::Height => self.height,
            WeightKey::Holes => self.holes,
            WeightKey::Bumpiness => self.bumpiness,
            WeightKey::LinesCleared => self.lines_cleared,
        }
    }

    pub fn get_mut(&mut self, key: WeightKey) -> &mut f64 {
        match key {
            WeightKey::Height => &mut self.height,
            WeightKey::Holes => &mut self.holes,
            WeightKey::Bumpiness => &mut self.bumpiness,
            WeightKey::LinesCleared => &mut self.lines_cleared,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WeightKey, f64)> + '_ {
        WeightKey::ALL.into_iter().map(|key| (key, self.get(key)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WeightKey, &mut f64)> {
        [
            (WeightKey::Height, &mut self.height),
            (WeightKey::Holes, &mut self.holes),
            (WeightKey::Bumpiness, &mut self.bumpiness),
            (WeightKey::LinesCleared, &mut self.lines_cleared),
        ]
        .into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_visits_every_key_in_order() {
        let mut seen = Vec::new();
        let weights = HeuristicWeights::from_fn(|key| {
            seen.push(key);
            f64::from(u8::try_from(seen.len()).unwrap())
        });
        assert_eq!(seen, WeightKey::ALL);
        assert_eq!(
            weights.iter().map(|(_, w)| w).collect::<Vec<_>>(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_iter_mut_writes_through() {
        let mut weights = HeuristicWeights::default();
        for (key, w) in weights.iter_mut() {
            if key == WeightKey::Bumpiness {
                *w = -0.25;
            }
        }
        assert_eq!(weights.bumpiness, -0.25);
        *weights.get_mut(WeightKey::Height) += 1.5;
        assert_eq!(weights.get(WeightKey::Height), 1.5);
    }

    #[test]
    fn test_serde_field_names() {
        let weights = HeuristicWeights {
            height: -0.5,
            holes: -0.75,
            bumpiness: -0.125,
            lines_cleared: 0.5,
        };
        let json = serde_json::to_value(weights).unwrap();
        assert_eq!(json["lines_cleared"], 0.5);
        assert_eq!(json["holes"], -0.75);
        for key in WeightKey::ALL {
            assert!(json.get(key.to_string()).is_some(), "{key}");
        }
    }
}
