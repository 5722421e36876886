//! Training configuration loaded from TOML.
//!
//! Every table and field is optional; missing values take their defaults:
//!
//! ```toml
//! seed = 42
//!
//! [genetic]
//! population_size = 20
//! games_per_generation = 3
//!
//! [search]
//! drop_cap = 25
//!
//! [driver]
//! steps_per_frame = 50
//! move_cap = 5000
//!
//! [neuro]
//! move_cap = 500
//! encoding = "surface"
//!
//! [neuro.neat]
//! population_size = 50
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use evotris_evaluator::placement_search::SearchParams;
use serde::{Deserialize, Serialize};

use crate::{genetic::GeneticParams, heuristic_trainer::DriverParams, neuro_trainer::NeuroParams};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ConfigError {
    #[display("failed to read config file {}", path.display())]
    #[from(skip)]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to parse config file")]
    Parse(toml::de::Error),
    #[display("invalid config: {message}")]
    #[from(skip)]
    Invalid { message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Seed for piece order and evolution; random when absent.
    pub seed: Option<u64>,
    pub genetic: GeneticParams,
    pub search: SearchParams,
    pub driver: DriverParams,
    pub neuro: NeuroParams,
}

impl TrainingConfig {
    /// Reads, parses and validates a TOML file.
    pub fn load<P>(path: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let genetic = &self.genetic;
        if genetic.population_size == 0 {
            return Err(ConfigError::invalid("genetic.population_size must be > 0"));
        }
        if genetic.games_per_generation == 0 {
            return Err(ConfigError::invalid(
                "genetic.games_per_generation must be > 0",
            ));
        }
        if genetic.elite_divisor == 0 {
            return Err(ConfigError::invalid("genetic.elite_divisor must be > 0"));
        }
        if genetic.elite_count() >= genetic.population_size {
            return Err(ConfigError::invalid(
                "genetic elite count must be smaller than genetic.population_size",
            ));
        }
        if genetic.tournament_size == 0 || genetic.tournament_size > genetic.population_size {
            return Err(ConfigError::invalid(
                "genetic.tournament_size must be in [1, population_size]",
            ));
        }
        check_probability("genetic.mutation_rate", genetic.mutation_rate)?;
        if !(genetic.mutation_range.is_finite() && genetic.mutation_range >= 0.0) {
            return Err(ConfigError::invalid("genetic.mutation_range must be >= 0"));
        }

        if self.search.drop_cap == 0 {
            return Err(ConfigError::invalid("search.drop_cap must be > 0"));
        }
        if self.search.column_margin < 0 {
            return Err(ConfigError::invalid("search.column_margin must be >= 0"));
        }

        if self.driver.steps_per_frame == 0 || self.driver.move_cap == 0 {
            return Err(ConfigError::invalid(
                "driver.steps_per_frame and driver.move_cap must be > 0",
            ));
        }

        let neuro = &self.neuro;
        if neuro.move_cap == 0 || neuro.play_cap == 0 {
            return Err(ConfigError::invalid(
                "neuro.move_cap and neuro.play_cap must be > 0",
            ));
        }
        let neat = &neuro.neat;
        if neat.population_size == 0 {
            return Err(ConfigError::invalid("neuro.neat.population_size must be > 0"));
        }
        for (name, value) in neat.probabilities() {
            check_probability(&format!("neuro.neat.{name}"), value)?;
        }
        if !(neat.compatibility_threshold.is_finite() && neat.compatibility_threshold > 0.0) {
            return Err(ConfigError::invalid(
                "neuro.neat.compatibility_threshold must be > 0",
            ));
        }
        let powers = [
            neat.init_stdev,
            neat.weight_perturb_power,
            neat.bias_perturb_power,
            neat.weight_limit,
        ];
        if powers.iter().any(|p| !(p.is_finite() && *p >= 0.0)) {
            return Err(ConfigError::invalid(
                "neuro.neat standard deviations and weight_limit must be >= 0",
            ));
        }
        Ok(())
    }
}

fn check_probability(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(format!("{name} must be in [0, 1]")))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use evotris_evaluator::feature_encoder::FeatureEncoding;

    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TrainingConfig::default();
        assert_eq!(config.validate().map_err(|e| e.to_string()), Ok(()));
        assert_eq!(config.genetic.population_size, 20);
        assert_eq!(config.search.drop_cap, 25);
        assert_eq!(config.driver.steps_per_frame, 50);
        assert_eq!(config.driver.move_cap, 5_000);
        assert_eq!(config.neuro.move_cap, 500);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.toml");
        fs::write(
            &path,
            r#"
seed = 7

[genetic]
population_size = 10
mutation_rate = 0.25

[neuro]
encoding = "surface"
drop_burst = true

[neuro.neat]
population_size = 16
"#,
        )
        .unwrap();

        let config = TrainingConfig::load(&path).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.genetic.population_size, 10);
        assert_eq!(config.genetic.mutation_rate, 0.25);
        assert_eq!(config.genetic.tournament_size, 3);
        assert_eq!(config.neuro.encoding, FeatureEncoding::Surface);
        assert!(config.neuro.drop_burst);
        assert_eq!(config.neuro.neat.population_size, 16);
        assert_eq!(config.neuro.neat.elitism, 2);
        assert_eq!(config.driver.steps_per_frame, 50);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let cases: [fn(&mut TrainingConfig); 11] = [
            |c| c.genetic.population_size = 0,
            |c| c.genetic.elite_divisor = 1,
            |c| c.genetic.tournament_size = 21,
            |c| c.genetic.tournament_size = 0,
            |c| c.genetic.mutation_rate = 1.5,
            |c| c.search.drop_cap = 0,
            |c| c.search.column_margin = -1,
            |c| c.driver.steps_per_frame = 0,
            |c| c.driver.move_cap = 0,
            |c| c.neuro.neat.crossover_prob = -0.1,
            |c| c.neuro.neat.population_size = 0,
        ];
        for (i, modify) in cases.into_iter().enumerate() {
            let mut config = TrainingConfig::default();
            modify(&mut config);
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid { .. })),
                "case {i}"
            );
        }
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = TrainingConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));

        let path = dir.path().join("bad.toml");
        fs::write(&path, "[genetic]\npopulation_size = \"many\"\n").unwrap();
        assert!(matches!(
            TrainingConfig::load(&path),
            Err(ConfigError::Parse(_))
        ));

        fs::write(&path, "[genetic]\npopulation_size = 0\n").unwrap();
        assert!(matches!(
            TrainingConfig::load(&path),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
