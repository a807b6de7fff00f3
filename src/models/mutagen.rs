use crate::models::{Gene, Genome};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Probability that a freshly bred child is mutated at all.
pub const MUTATION_RATE: f64 = 0.5;

/// Probability that a mutation also reverses a segment after its swap.
pub const REVERSAL_PROBABILITY: f64 = 0.5;

fn swap_mutation(genes: &mut [Gene], i: usize, j: usize) {
    genes.swap(i, j);
}

/// Reverses the inclusive range between two positions, in either order.
fn reverse_segment(genes: &mut [Gene], a: usize, b: usize) {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    genes[start..=end].reverse();
}

// ============================================================
// MutationRate
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MutationRate(f64);

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("mutation probability must be between 0.0 and 1.0, got: {0}")]
pub struct ProbabilityOutOfRange(f64);

impl MutationRate {
    pub fn new(value: f64) -> Result<Self, ProbabilityOutOfRange> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ProbabilityOutOfRange(value));
        }

        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

// ============================================================
// Mutagen
// ============================================================
/// Swap and segment-reversal mutation for permutation genomes.
///
/// Every mutation swaps two random positions; with `reversal_probability` it
/// additionally reverses the segment between two further random positions.
/// Both operators keep the token multiset, so valid genomes stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mutagen {
    mutation_rate: MutationRate,
    reversal_probability: MutationRate,
}

impl Default for Mutagen {
    fn default() -> Self {
        Self {
            mutation_rate: MutationRate(MUTATION_RATE),
            reversal_probability: MutationRate(REVERSAL_PROBABILITY),
        }
    }
}

impl Mutagen {
    pub fn new(mutation_rate: MutationRate, reversal_probability: MutationRate) -> Self {
        Self {
            mutation_rate,
            reversal_probability,
        }
    }

    pub fn constant(
        mutation_rate: f64,
        reversal_probability: f64,
    ) -> Result<Self, ProbabilityOutOfRange> {
        Ok(Self {
            mutation_rate: MutationRate::new(mutation_rate)?,
            reversal_probability: MutationRate::new(reversal_probability)?,
        })
    }

    pub fn mutation_rate(&self) -> f64 {
        self.mutation_rate.get()
    }

    /// Mutates a freshly bred child with the configured mutation rate.
    pub(crate) fn maybe_mutate<R: Rng + ?Sized>(&self, rng: &mut R, genome: &mut Genome) -> bool {
        if rng.random_bool(self.mutation_rate.get()) {
            self.mutate(rng, genome);
            return true;
        }
        false
    }

    /// Unconditionally mutates the genome and drops its cached evaluation.
    #[instrument(level = "trace", skip(self, rng, genome), fields(genome_length = genome.len()))]
    pub(crate) fn mutate<R: Rng + ?Sized>(&self, rng: &mut R, genome: &mut Genome) {
        let len = genome.len();
        if len == 0 {
            return;
        }
        let genes = genome.genes_mut();

        let i = rng.random_range(0..len);
        let j = rng.random_range(0..len);
        swap_mutation(genes, i, j);

        if rng.random_bool(self.reversal_probability.get()) {
            let a = rng.random_range(0..len);
            let b = rng.random_range(0..len);
            reverse_segment(genes, a, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenomeLayout;
    use crate::models::genome::test_utilities::{evaluated, is_valid_permutation};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn it_reverses_inclusive_segments_in_either_order() {
        let mut genes = vec![0, 1, 2, 3, 4, 5];
        reverse_segment(&mut genes, 1, 4);
        assert_eq!(genes, vec![0, 4, 3, 2, 1, 5]);

        let mut genes = vec![0, 1, 2, 3, 4, 5];
        reverse_segment(&mut genes, 4, 1);
        assert_eq!(genes, vec![0, 4, 3, 2, 1, 5]);

        let mut genes = vec![0, 1, 2];
        reverse_segment(&mut genes, 2, 2);
        assert_eq!(genes, vec![0, 1, 2]);
    }

    #[test]
    fn it_swaps_two_positions() {
        let mut genes = vec![0, 1, 2, 3];
        swap_mutation(&mut genes, 0, 3);
        assert_eq!(genes, vec![3, 1, 2, 0]);
    }

    #[test]
    fn it_keeps_genomes_valid() {
        let layout = GenomeLayout::new(15, 3);
        let mut rng = StdRng::seed_from_u64(23);
        let mutagen = Mutagen::default();

        for _ in 0..200 {
            let mut genome = Genome::random(&layout, &mut rng);
            mutagen.mutate(&mut rng, &mut genome);
            assert!(is_valid_permutation(&layout, genome.genes()));
        }
    }

    #[test]
    fn it_invalidates_the_cached_evaluation() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut genome = evaluated(vec![0, 1, 2, 3], 4.0);

        Mutagen::default().mutate(&mut rng, &mut genome);
        assert!(genome.evaluation().is_none());
    }

    #[test]
    fn it_respects_the_mutation_rate_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut genome = evaluated(vec![0, 1, 2, 3], 4.0);

        let never = Mutagen::constant(0.0, 0.5).unwrap();
        assert!(!never.maybe_mutate(&mut rng, &mut genome));
        assert!(genome.evaluation().is_some());

        let always = Mutagen::constant(1.0, 0.5).unwrap();
        assert!(always.maybe_mutate(&mut rng, &mut genome));
        assert!(genome.evaluation().is_none());
    }

    #[test]
    fn it_validates_probabilities() {
        assert!(Mutagen::constant(-0.1, 0.5).is_err());
        assert!(Mutagen::constant(0.5, 1.5).is_err());
        assert!(Mutagen::constant(0.0, 1.0).is_ok());
    }
}
