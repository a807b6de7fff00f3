use super::{City, DistanceEvaluator, GenomeLayout, GroundTruth, GroundTruthTable, Metric};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Fatal faults in a problem definition. These are integration bugs in
/// whatever supplied the problem, not runtime states the engine can absorb.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProblemError {
    #[error("problem must contain at least one city")]
    NoCities,
    #[error("problem must have at least one salesman")]
    NoSalesmen,
    #[error("coordinate set has {provided} cities, genomes reference {expected}")]
    MissingCoordinates { expected: usize, provided: usize },
}

fn one() -> usize {
    1
}

/// A single- or multi-salesman TSP instance as handed over by a loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub problem_id: String,
    pub cities: Vec<City>,
    pub depot: City,
    #[serde(default = "one")]
    pub salesmen: usize,
    #[serde(default)]
    pub ground_truth: GroundTruthTable,
}

impl Problem {
    pub fn new(problem_id: impl Into<String>, cities: Vec<City>, depot: City, salesmen: usize) -> Self {
        Self {
            problem_id: problem_id.into(),
            cities,
            depot,
            salesmen,
            ground_truth: GroundTruthTable::new(),
        }
    }

    pub fn with_ground_truth(mut self, truth: GroundTruth) -> Self {
        self.ground_truth.insert(self.problem_id.clone(), truth);
        self
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn layout(&self) -> GenomeLayout {
        GenomeLayout::new(self.city_count(), self.salesmen)
    }

    pub fn metric(&self) -> Metric {
        Metric::for_problem(&self.problem_id)
    }

    /// Ground truth for this problem, if the table has an entry for it.
    pub fn ground_truth(&self) -> Option<&GroundTruth> {
        self.ground_truth.get(&self.problem_id)
    }

    #[instrument(level = "debug", skip(self), fields(problem_id = %self.problem_id, cities = self.cities.len(), salesmen = self.salesmen))]
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.cities.is_empty() {
            return Err(ProblemError::NoCities);
        }
        if self.salesmen == 0 {
            return Err(ProblemError::NoSalesmen);
        }
        Ok(())
    }

    /// Builds the evaluator over the canonical coordinates.
    pub fn evaluator(&self) -> Result<DistanceEvaluator, ProblemError> {
        self.validate()?;
        DistanceEvaluator::new(self.cities.clone(), self.depot, self.metric(), self.layout())
    }
}
