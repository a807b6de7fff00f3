use crate::models::{Breeder, Evaluator, Genome, GenomeLayout, Mutagen};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub type IslandId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Aggregation island receiving the leaves' migrants.
    Root,
    Leaf,
}

/// One independently evolving population.
///
/// Each island owns its random number generator, so islands can be stepped
/// on different threads while a seeded run stays reproducible.
#[derive(Debug, Clone)]
pub struct Island {
    pub(crate) id: IslandId,
    pub(crate) role: Role,
    pub(crate) population: Vec<Genome>,
    pub(crate) best: Option<Genome>,
    pub(crate) color: Option<String>,
    pub(crate) visible: bool,
    rng: StdRng,
}

fn sort_best_first(population: &mut [Genome]) {
    population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
}

impl Island {
    pub fn new(id: IslandId, role: Role, population: Vec<Genome>, rng: StdRng) -> Self {
        Self {
            id,
            role,
            population,
            best: None,
            color: None,
            visible: true,
            rng,
        }
    }

    /// Creates an island with `population_size` random genomes. Its own
    /// generator is derived from `rng`.
    #[instrument(level = "debug", skip(layout, rng), fields(island_id = id, role = ?role, population_size = population_size))]
    pub fn seeded<R: Rng>(
        id: IslandId,
        role: Role,
        population_size: usize,
        layout: &GenomeLayout,
        rng: &mut R,
    ) -> Self {
        let mut rng = StdRng::from_rng(rng);
        let population = (0..population_size)
            .map(|_| Genome::random(layout, &mut rng))
            .collect();

        Self::new(id, role, population, rng)
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> IslandId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_leaf(&self) -> bool {
        self.role == Role::Leaf
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn best_genome(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    /// Best distance seen so far, infinity before the first evaluation.
    pub fn best_distance(&self) -> f64 {
        self.best
            .as_ref()
            .and_then(Genome::distance)
            .unwrap_or(f64::INFINITY)
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Replaces the population with the next generation.
    ///
    /// An empty population carries no signal and is left as is.
    #[instrument(level = "trace", skip(self, breeder), fields(island_id = self.id, population_size = population_size))]
    pub(crate) fn evolve(&mut self, breeder: &Breeder, population_size: usize) {
        if self.population.is_empty() {
            tracing::debug!(island_id = self.id, "Skipping evolution of empty population");
            return;
        }

        sort_best_first(&mut self.population);
        self.population = breeder.next_generation(&self.population, population_size, &mut self.rng);
    }

    /// Evaluates every genome without a cached evaluation and ratchets the
    /// best genome on strict improvement. Returns the best distance.
    pub(crate) fn evaluate<E: Evaluator + ?Sized>(&mut self, evaluator: &E) -> f64 {
        let mut best_index = None;
        let mut best_distance = self.best_distance();

        for (index, genome) in self.population.iter_mut().enumerate() {
            let evaluation = evaluator.evaluate(genome);
            if evaluation.distance < best_distance {
                best_distance = evaluation.distance;
                best_index = Some(index);
            }
        }

        if let Some(index) = best_index {
            tracing::trace!(island_id = self.id, best_distance = best_distance, "Island improved");
            self.best = Some(self.population[index].clone());
        }

        best_distance
    }

    /// One generation step: evolve, then evaluate.
    pub(crate) fn step<E: Evaluator + ?Sized>(
        &mut self,
        breeder: &Breeder,
        evaluator: &E,
        population_size: usize,
    ) -> f64 {
        self.evolve(breeder, population_size);
        self.evaluate(evaluator)
    }

    /// Overwrites the worst individuals with the given migrants, best-first
    /// order preserved for the rest. Returns how many were placed.
    #[instrument(level = "debug", skip(self, migrants), fields(island_id = self.id, migrants = migrants.len()))]
    pub(crate) fn accept_migrants(&mut self, migrants: Vec<Genome>) -> usize {
        sort_best_first(&mut self.population);

        let mut placed = 0;
        for (slot, migrant) in self.population.iter_mut().rev().zip(migrants) {
            *slot = migrant;
            placed += 1;
        }

        placed
    }

    /// Mutates every genome once, forcing the population to diverge.
    #[instrument(level = "debug", skip(self, mutagen), fields(island_id = self.id))]
    pub(crate) fn mutate_all(&mut self, mutagen: &Mutagen) {
        for genome in self.population.iter_mut() {
            mutagen.mutate(&mut self.rng, genome);
        }
    }

    /// Drops every cached evaluation and the best genome, for when the
    /// evaluation coordinates change.
    pub(crate) fn invalidate(&mut self) {
        for genome in self.population.iter_mut() {
            genome.clear_evaluation();
        }
        self.best = None;
    }
}
