use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Absolute tolerance when comparing a found distance against the known
/// optimum, absorbing float-vs-integer ground truth.
pub const OPTIMUM_TOLERANCE: f64 = 1.0;

/// Known-optimal reference values for one problem instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundTruth {
    /// Length of an optimal tour.
    pub opt_length: f64,
    /// Number of distinct optimal tours known for the instance.
    pub opt_count: usize,
}

/// Ground truth keyed by problem identifier.
pub type GroundTruthTable = HashMap<String, GroundTruth>;

impl GroundTruth {
    pub fn new(opt_length: f64, opt_count: usize) -> Self {
        Self {
            opt_length,
            opt_count,
        }
    }

    /// Whether a tour of the given length counts as optimal.
    pub fn is_optimal(&self, distance: f64) -> bool {
        (distance - self.opt_length).abs() < OPTIMUM_TOLERANCE
    }
}
