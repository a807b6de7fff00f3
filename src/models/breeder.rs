use crate::models::{Crossover, Genome, Mutagen, Selector};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One elite per this many genomes (5%), rounded up.
pub const ELITE_DIVISOR: usize = 20;

/// Number of elites kept for a population of the given size.
pub fn elite_count(population_size: usize) -> usize {
    population_size.div_ceil(ELITE_DIVISOR)
}

/// Bundles the operators one generation step needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breeder {
    pub selector: Selector,
    pub crossover: Crossover,
    pub mutagen: Mutagen,
}

impl Breeder {
    pub fn new(selector: Selector, crossover: Crossover, mutagen: Mutagen) -> Self {
        Self {
            selector,
            crossover,
            mutagen,
        }
    }

    /// Selects two parents, crosses them and maybe mutates the child.
    fn breed_child<R: Rng + ?Sized>(&self, population: &[Genome], rng: &mut R) -> Option<Genome> {
        let parent1 = self.selector.select(population, rng)?;
        let parent2 = self.selector.select(population, rng)?;

        let mut child = self.crossover.apply(rng, parent1, parent2);
        self.mutagen.maybe_mutate(rng, &mut child);

        Some(child)
    }

    /// Builds the next generation from a population sorted best-first.
    ///
    /// The top [`elite_count`] genomes are copied unchanged, keeping their
    /// cached evaluation; the rest are bred children.
    #[instrument(level = "trace", skip(self, sorted, rng), fields(population = sorted.len(), target_size = target_size))]
    pub(crate) fn next_generation<R: Rng + ?Sized>(
        &self,
        sorted: &[Genome],
        target_size: usize,
        rng: &mut R,
    ) -> Vec<Genome> {
        let mut next = Vec::with_capacity(target_size);
        let elites = elite_count(target_size).min(sorted.len());
        next.extend_from_slice(&sorted[..elites]);

        while next.len() < target_size {
            match self.breed_child(sorted, rng) {
                Some(child) => next.push(child),
                None => break,
            }
        }

        next
    }
}
