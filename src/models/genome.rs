use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A single genome token. Values below the city count are city indices, any
/// other value is a separator between two salesmen's legs.
pub type Gene = usize;

/// Interpretation of a raw [`Gene`] under a given [`GenomeLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    City(usize),
    Separator,
}

/// Describes how genomes for one problem are shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeLayout {
    pub city_count: usize,
    pub salesmen: usize,
}

impl GenomeLayout {
    pub fn new(city_count: usize, salesmen: usize) -> Self {
        Self {
            city_count,
            salesmen,
        }
    }

    /// Number of tokens in every genome of this layout.
    pub fn genome_len(&self) -> usize {
        self.city_count + self.salesmen.saturating_sub(1)
    }

    pub fn classify(&self, gene: Gene) -> Token {
        if gene < self.city_count {
            Token::City(gene)
        } else {
            Token::Separator
        }
    }

    /// True when there are more salesmen than cities, so some leg must be empty.
    pub fn is_degenerate(&self) -> bool {
        self.salesmen > self.city_count
    }

    /// True when `genes` is a permutation of this layout's token set.
    pub fn admits(&self, genes: &[Gene]) -> bool {
        let len = self.genome_len();
        if genes.len() != len {
            return false;
        }
        let mut seen = vec![false; len];
        genes
            .iter()
            .all(|&gene| gene < len && !std::mem::replace(&mut seen[gene], true))
    }
}

/// Cached result of evaluating a genome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub distance: f64,
    pub fitness: f64,
}

impl Evaluation {
    pub fn from_distance(distance: f64) -> Self {
        Self {
            distance,
            fitness: 1.0 / (distance + 1.0),
        }
    }
}

/// Permutation encoding of a candidate tour.
///
/// The evaluation is cached on the genome and dropped whenever the genes are
/// handed out mutably, so a stale distance can never outlive a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    genes: Vec<Gene>,
    evaluation: Option<Evaluation>,
}

impl Genome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            evaluation: None,
        }
    }

    /// Creates a uniformly random valid genome for the layout.
    ///
    /// With several salesmen the cities are split at `salesmen - 1` distinct
    /// points so that every leg visits at least one city. If there are more
    /// salesmen than cities no such split exists and a shuffled permutation
    /// of all tokens is returned instead; evaluation penalises it.
    #[instrument(level = "trace", skip(rng), fields(city_count = layout.city_count, salesmen = layout.salesmen))]
    pub fn random<R: Rng + ?Sized>(layout: &GenomeLayout, rng: &mut R) -> Self {
        let mut cities: Vec<Gene> = (0..layout.city_count).collect();
        cities.shuffle(rng);

        if layout.salesmen <= 1 {
            return Self::new(cities);
        }

        if layout.is_degenerate() {
            let mut genes: Vec<Gene> = (0..layout.genome_len()).collect();
            genes.shuffle(rng);
            return Self::new(genes);
        }

        let mut splits: Vec<usize> =
            rand::seq::index::sample(rng, layout.city_count - 1, layout.salesmen - 1)
                .into_iter()
                .map(|index| index + 1)
                .collect();
        splits.sort_unstable();

        let mut genes = Vec::with_capacity(layout.genome_len());
        let mut cursor = 0;
        for (offset, split) in splits.into_iter().enumerate() {
            genes.extend_from_slice(&cities[cursor..split]);
            genes.push(layout.city_count + offset);
            cursor = split;
        }
        genes.extend_from_slice(&cities[cursor..]);

        Self::new(genes)
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Mutable access to the genes. Clears any cached evaluation.
    pub fn genes_mut(&mut self) -> &mut [Gene] {
        self.evaluation = None;
        &mut self.genes
    }

    pub fn into_genes(self) -> Vec<Gene> {
        self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn evaluation(&self) -> Option<Evaluation> {
        self.evaluation
    }

    pub(crate) fn set_evaluation(&mut self, evaluation: Evaluation) {
        self.evaluation = Some(evaluation);
    }

    pub(crate) fn clear_evaluation(&mut self) {
        self.evaluation = None;
    }

    /// Fitness of the genome, 0.0 while it has not been evaluated.
    pub fn fitness(&self) -> f64 {
        self.evaluation.map_or(0.0, |e| e.fitness)
    }

    pub fn distance(&self) -> Option<f64> {
        self.evaluation.map(|e| e.distance)
    }
}

impl From<Vec<Gene>> for Genome {
    fn from(genes: Vec<Gene>) -> Self {
        Self::new(genes)
    }
}
