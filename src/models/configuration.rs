use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Engine parameters for one optimisation run.
///
/// All fields have defaults, so a partial JSON document is enough:
///
/// ```rust
/// use fx_hga::models::Configuration;
///
/// let configuration: Configuration =
///     serde_json::from_str(r#"{"populationSize": 60, "seed": 7}"#)?;
/// assert_eq!(configuration.population_size, 60);
/// assert_eq!(configuration.migration_interval, 10);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// Genomes per island.
    pub population_size: usize,
    /// Generations between two migration passes.
    pub migration_interval: u64,
    /// Leaves created next to the root at initialisation.
    pub initial_leaves: usize,
    /// Upper bound on the number of leaves.
    pub max_leaves: usize,
    /// Generations between two leaf spawns.
    pub spawn_interval: u64,
    /// Generations a worker runs before reporting and yielding.
    pub worker_batch_size: u32,
    /// Seed for a reproducible run. Drawn from the OS when absent.
    pub seed: Option<u64>,
    /// Presentation colours, assigned to islands by id.
    pub palette: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            population_size: 100,
            migration_interval: 10,
            initial_leaves: 2,
            max_leaves: 20,
            spawn_interval: 20,
            worker_batch_size: 5,
            seed: None,
            palette: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("population size must be at least 1")]
    EmptyPopulation,
    #[error("migration interval must be at least 1")]
    InvalidMigrationInterval,
    #[error("spawn interval must be at least 1")]
    InvalidSpawnInterval,
    #[error("worker batch size must be at least 1")]
    InvalidBatchSize,
    #[error("leaf cap must be at least 1")]
    InvalidLeafCap,
    #[error("initial leaves ({initial}) exceed the leaf cap ({cap})")]
    TooManyLeaves { initial: usize, cap: usize },
}

impl Configuration {
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_migration_interval(mut self, migration_interval: u64) -> Self {
        self.migration_interval = migration_interval;
        self
    }

    pub fn with_initial_leaves(mut self, initial_leaves: usize) -> Self {
        self.initial_leaves = initial_leaves;
        self
    }

    pub fn with_max_leaves(mut self, max_leaves: usize) -> Self {
        self.max_leaves = max_leaves;
        self
    }

    pub fn with_spawn_interval(mut self, spawn_interval: u64) -> Self {
        self.spawn_interval = spawn_interval;
        self
    }

    pub fn with_worker_batch_size(mut self, worker_batch_size: u32) -> Self {
        self.worker_batch_size = worker_batch_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_palette(mut self, palette: Vec<String>) -> Self {
        self.palette = palette;
        self
    }

    /// Colour for an island id, cycling through the palette.
    pub fn color_for(&self, id: u32) -> Option<String> {
        if self.palette.is_empty() {
            return None;
        }
        Some(self.palette[id as usize % self.palette.len()].clone())
    }

    #[instrument(level = "debug", skip(self), fields(population_size = self.population_size, migration_interval = self.migration_interval, max_leaves = self.max_leaves))]
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.population_size == 0 {
            return Err(ConfigurationError::EmptyPopulation);
        }
        if self.migration_interval == 0 {
            return Err(ConfigurationError::InvalidMigrationInterval);
        }
        if self.spawn_interval == 0 {
            return Err(ConfigurationError::InvalidSpawnInterval);
        }
        if self.worker_batch_size == 0 {
            return Err(ConfigurationError::InvalidBatchSize);
        }
        if self.max_leaves == 0 {
            return Err(ConfigurationError::InvalidLeafCap);
        }
        if self.initial_leaves > self.max_leaves {
            return Err(ConfigurationError::TooManyLeaves {
                initial: self.initial_leaves,
                cap: self.max_leaves,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Configuration::default().validate(), Ok(()));
    }

    #[test]
    fn test_invalid_configurations() {
        let base = Configuration::default();

        assert_eq!(
            base.clone().with_population_size(0).validate(),
            Err(ConfigurationError::EmptyPopulation)
        );
        assert_eq!(
            base.clone().with_migration_interval(0).validate(),
            Err(ConfigurationError::InvalidMigrationInterval)
        );
        assert_eq!(
            base.clone().with_spawn_interval(0).validate(),
            Err(ConfigurationError::InvalidSpawnInterval)
        );
        assert_eq!(
            base.clone().with_worker_batch_size(0).validate(),
            Err(ConfigurationError::InvalidBatchSize)
        );
        assert_eq!(
            base.clone().with_max_leaves(0).validate(),
            Err(ConfigurationError::InvalidLeafCap)
        );
        assert_eq!(
            base.with_initial_leaves(5).with_max_leaves(3).validate(),
            Err(ConfigurationError::TooManyLeaves { initial: 5, cap: 3 })
        );
    }

    #[test]
    fn test_palette_cycles_by_id() {
        let configuration =
            Configuration::default().with_palette(vec!["red".into(), "blue".into()]);

        assert_eq!(configuration.color_for(0).as_deref(), Some("red"));
        assert_eq!(configuration.color_for(3).as_deref(), Some("blue"));
        assert_eq!(Configuration::default().color_for(3), None);
    }
}
