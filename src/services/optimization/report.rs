use crate::models::{Gene, Island, IslandId, QualityMetrics, Role};
use crate::services::topology::MigrationOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Presentation view of one island after a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandSummary {
    pub id: IslandId,
    pub role: Role,
    pub best_distance: Option<f64>,
    pub best_genome: Option<Vec<Gene>>,
    pub population_size: usize,
    pub color: Option<String>,
    pub visible: bool,
}

impl From<&Island> for IslandSummary {
    fn from(island: &Island) -> Self {
        let best = island.best_genome();
        Self {
            id: island.id(),
            role: island.role(),
            best_distance: best.and_then(|genome| genome.distance()),
            best_genome: best.map(|genome| genome.genes().to_vec()),
            population_size: island.population().len(),
            color: island.color().map(str::to_owned),
            visible: island.is_visible(),
        }
    }
}

/// Everything the presentation layer needs after one generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub generation: u64,
    pub timestamp: DateTime<Utc>,
    pub best_distance: Option<f64>,
    pub best_genome: Option<Vec<Gene>>,
    pub islands: Vec<IslandSummary>,
    pub leaf_count: usize,
    pub root_count: usize,
    #[serde(flatten)]
    pub metrics: QualityMetrics,
    /// Present when migration ran during this generation.
    pub migration: Option<MigrationOutcome>,
    pub pruned: Vec<IslandId>,
    pub spawned: Option<IslandId>,
}

impl GenerationReport {
    pub fn migrated(&self) -> bool {
        self.migration.is_some()
    }
}
