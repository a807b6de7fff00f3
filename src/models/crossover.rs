use crate::models::{Gene, Genome};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Performs order crossover over the inclusive cut range `start..=end`.
///
/// The child keeps `lhs[start..=end]` in place and fills the remaining
/// positions, left to right, with the tokens of `rhs` in `rhs` order that are
/// not yet placed. Separators are ordinary tokens here. Should `rhs` not carry
/// the same token set, the leftovers of `lhs` fill the gaps so the child is
/// never shorter than a valid parent.
#[instrument(level = "trace", skip(lhs, rhs), fields(genome_length = lhs.len(), start = start, end = end))]
fn crossover_order(lhs: &[Gene], rhs: &[Gene], start: usize, end: usize) -> Vec<Gene> {
    let segment = &lhs[start..=end];
    let mut placed: HashSet<Gene> = segment.iter().copied().collect();
    let mut donors = rhs
        .iter()
        .chain(lhs.iter())
        .copied()
        .filter(move |gene| placed.insert(*gene));

    let mut child = Vec::with_capacity(lhs.len());
    child.extend(donors.by_ref().take(start));
    child.extend_from_slice(segment);
    child.extend(donors.take(lhs.len() - end - 1));
    child
}

/// Crossover strategy for permutation genomes.
///
/// Order crossover (OX) preserves a contiguous block of the first parent and
/// the relative visiting order of the second parent, which keeps both tour
/// segments and the permutation property intact.
///
/// ```rust
/// use fx_hga::models::Crossover;
///
/// let crossover = Crossover::order();
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    #[default]
    Order,
}

impl Crossover {
    pub fn order() -> Self {
        Self::Order
    }

    /// Produces one child from two parents. The child is unevaluated.
    #[instrument(level = "trace", skip(self, rng, lhs, rhs), fields(crossover_type = ?self, genome_length = lhs.len()))]
    pub(crate) fn apply<R: Rng + ?Sized>(&self, rng: &mut R, lhs: &Genome, rhs: &Genome) -> Genome {
        if lhs.is_empty() {
            return Genome::new(Vec::new());
        }

        match self {
            Self::Order => {
                let start = rng.random_range(0..lhs.len());
                let end = rng.random_range(start..lhs.len());
                Genome::new(crossover_order(lhs.genes(), rhs.genes(), start, end))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenomeLayout;
    use crate::models::genome::test_utilities::is_valid_permutation;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn it_performs_order_crossover() {
        let lhs = [0, 1, 2, 3, 4, 5];
        let rhs = [5, 4, 3, 2, 1, 0];

        assert_eq!(crossover_order(&lhs, &rhs, 2, 3), vec![5, 4, 2, 3, 1, 0]);
        assert_eq!(crossover_order(&lhs, &rhs, 0, 0), vec![0, 5, 4, 3, 2, 1]);
        assert_eq!(crossover_order(&lhs, &rhs, 5, 5), vec![4, 3, 2, 1, 0, 5]);
        assert_eq!(crossover_order(&lhs, &rhs, 0, 5), lhs.to_vec());
    }

    #[test]
    fn it_produces_valid_permutations_for_every_cut_range() {
        let layout = GenomeLayout::new(6, 3);
        let mut rng = StdRng::seed_from_u64(17);

        for _ in 0..20 {
            let lhs = Genome::random(&layout, &mut rng);
            let rhs = Genome::random(&layout, &mut rng);

            for start in 0..lhs.len() {
                for end in start..lhs.len() {
                    let child = crossover_order(lhs.genes(), rhs.genes(), start, end);
                    assert!(is_valid_permutation(&layout, &child), "{child:?}");
                    assert_eq!(&child[start..=end], &lhs.genes()[start..=end]);
                }
            }
        }
    }

    #[test]
    fn it_handles_order_crossover_via_enum() {
        let layout = GenomeLayout::new(20, 1);
        let mut rng = StdRng::seed_from_u64(42);
        let crossover = Crossover::order();

        for _ in 0..100 {
            let lhs = Genome::random(&layout, &mut rng);
            let rhs = Genome::random(&layout, &mut rng);
            let child = crossover.apply(&mut rng, &lhs, &rhs);

            assert_eq!(child.len(), 20);
            assert!(is_valid_permutation(&layout, child.genes()));
            assert!(child.evaluation().is_none());
        }
    }

    #[test]
    fn it_fills_from_the_first_parent_when_token_sets_differ() {
        let child = crossover_order(&[0, 1, 2, 3], &[7, 8], 1, 1);
        assert_eq!(child.len(), 4);
        assert_eq!(child[1], 1);
    }
}
