mod breeder;
mod city;
mod configuration;
mod crossover;
mod evaluator;
mod genome;
mod ground_truth;
mod island;
mod metrics;
mod mutagen;
mod problem;
mod selector;
mod similarity;

pub use breeder::{Breeder, ELITE_DIVISOR, elite_count};
pub use city::{City, EARTH_RADIUS_KM, Metric, PLANAR_PROBLEM_PREFIX};
pub use configuration::{Configuration, ConfigurationError};
pub use crossover::Crossover;
pub use evaluator::{DistanceEvaluator, EMPTY_LEG_PENALTY, Evaluator};
pub use genome::{Evaluation, Gene, Genome, GenomeLayout, Token};
pub use ground_truth::{GroundTruth, GroundTruthTable, OPTIMUM_TOLERANCE};
pub use island::{Island, IslandId, Role};
pub use metrics::{
    BETA_SQUARED, FoundOptima, MetricsEngine, PRECISION, QualityMetrics, diversity, f_beta,
};
pub use mutagen::{MUTATION_RATE, Mutagen, MutationRate, ProbabilityOutOfRange, REVERSAL_PROBABILITY};
pub use problem::{Problem, ProblemError};
pub use selector::{SelectionError, Selector, TOURNAMENT_SIZE};
pub use similarity::{
    DEPOT_NODE, Edge, SIGNATURE_DELIMITER, canonical_signature, edge_set, edges, similarity,
};

#[cfg(test)]
pub(crate) use genome::test_utilities;
