use crate::models::{Gene, GenomeLayout, GroundTruth, canonical_signature, similarity};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Weight of precision against recall in the F-beta score.
pub const BETA_SQUARED: f64 = 0.3;

/// Precision is fixed; false positives are not tracked.
pub const PRECISION: f64 = 1.0;

/// Weighted harmonic mean of precision and recall.
pub fn f_beta(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        return 0.0;
    }
    ((1.0 + BETA_SQUARED) * precision * recall) / (BETA_SQUARED * precision + recall)
}

/// One minus the mean pairwise similarity of the given tours. Zero when fewer
/// than two tours are given.
pub fn diversity(layout: &GenomeLayout, tours: &[&[Gene]]) -> f64 {
    if tours.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, lhs) in tours.iter().enumerate() {
        for rhs in &tours[i + 1..] {
            total += similarity(layout, lhs, rhs);
            pairs += 1;
        }
    }

    1.0 - total / pairs as f64
}

/// Canonical signatures of the optimal tours found during one run.
///
/// Append-only: signatures are never removed, a new run starts a new set.
#[derive(Debug, Default, Clone)]
pub struct FoundOptima {
    signatures: HashSet<String>,
}

impl FoundOptima {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a signature, returning whether it was new.
    pub fn insert(&mut self, signature: String) -> bool {
        self.signatures.insert(signature)
    }

    pub fn contains(&self, signature: &str) -> bool {
        self.signatures.contains(signature)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Quality and diversity snapshot after one generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub f_beta: f64,
    pub recall: f64,
    pub precision: f64,
    pub diversity: f64,
    pub found_optima: usize,
}

/// Tracks found optima for one run and scores leaf solutions against ground truth.
#[derive(Debug, Default, Clone)]
pub struct MetricsEngine {
    found: FoundOptima,
}

impl MetricsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn found_optima(&self) -> &FoundOptima {
        &self.found
    }

    /// Scores the leaves' best solutions, given as `(best_genes, best_distance)`.
    ///
    /// Without ground truth every metric stays 0 and nothing is recorded.
    #[instrument(level = "debug", skip(self, layout, leaf_bests), fields(leaves = leaf_bests.len(), has_ground_truth = ground_truth.is_some()))]
    pub fn observe(
        &mut self,
        ground_truth: Option<&GroundTruth>,
        layout: &GenomeLayout,
        leaf_bests: &[(&[Gene], f64)],
    ) -> QualityMetrics {
        let Some(truth) = ground_truth else {
            return QualityMetrics::default();
        };

        for (genes, distance) in leaf_bests {
            if truth.is_optimal(*distance)
                && self.found.insert(canonical_signature(layout, genes))
            {
                tracing::info!(
                    distance = distance,
                    found = self.found.len(),
                    "New optimal tour found"
                );
            }
        }

        let recall = if truth.opt_count == 0 {
            0.0
        } else {
            self.found.len() as f64 / truth.opt_count as f64
        };

        let tours: Vec<&[Gene]> = leaf_bests.iter().map(|(genes, _)| *genes).collect();

        QualityMetrics {
            f_beta: f_beta(PRECISION, recall),
            recall,
            precision: PRECISION,
            diversity: diversity(layout, &tours),
            found_optima: self.found.len(),
        }
    }
}
