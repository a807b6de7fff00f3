//! Root-and-leaves island topology.
//!
//! The root aggregates the leaves' best genomes at every migration. Leaves
//! that converge onto the same tour are forced apart (niching) or removed
//! (duplicate pruning), and new leaves are spawned while the search can still
//! find optima it has not reported yet.

use crate::models::{
    Breeder, Configuration, Evaluator, Genome, GenomeLayout, Island, IslandId, Mutagen, Role,
    similarity,
};
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Identifier of the root island. The root is never pruned.
pub const ROOT_ID: IslandId = 0;

/// Similarity above which the worse of two leaves is forced to diverge.
pub const NICHING_THRESHOLD: f64 = 0.8;

/// Similarity above which the worse of two leaves is removed.
pub const PRUNING_THRESHOLD: f64 = 0.95;

/// What one migration pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationOutcome {
    /// Leaf bests written into the root population.
    pub migrants: usize,
    /// Leaves whose populations were mutated by the niching pass, once per
    /// offending pair.
    pub niched: Vec<IslandId>,
}

/// What one management pass did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Management {
    pub pruned: Vec<IslandId>,
    pub spawned: Option<IslandId>,
}

#[derive(Debug, Clone)]
pub struct Topology {
    layout: GenomeLayout,
    islands: Vec<Island>,
}

impl Topology {
    /// Creates the root and `configuration.initial_leaves` leaves, each with a
    /// random population.
    #[instrument(level = "info", skip(configuration, rng), fields(city_count = layout.city_count, salesmen = layout.salesmen, initial_leaves = configuration.initial_leaves))]
    pub fn initialize<R: Rng>(
        layout: GenomeLayout,
        configuration: &Configuration,
        rng: &mut R,
    ) -> Self {
        let mut topology = Self::from_islands(layout, Vec::new());

        let root = Island::seeded(
            ROOT_ID,
            Role::Root,
            configuration.population_size,
            &layout,
            rng,
        )
        .with_color(configuration.color_for(ROOT_ID));
        topology.islands.push(root);

        for _ in 0..configuration.initial_leaves {
            topology.spawn_leaf(configuration, rng);
        }

        topology
    }

    pub fn from_islands(layout: GenomeLayout, islands: Vec<Island>) -> Self {
        Self { layout, islands }
    }

    pub fn layout(&self) -> &GenomeLayout {
        &self.layout
    }

    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.iter().find(|island| island.id() == id)
    }

    pub fn island_mut(&mut self, id: IslandId) -> Option<&mut Island> {
        self.islands.iter_mut().find(|island| island.id() == id)
    }

    pub fn root(&self) -> Option<&Island> {
        self.islands.iter().find(|island| island.role() == Role::Root)
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Island> {
        self.islands.iter().filter(|island| island.is_leaf())
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().count()
    }

    pub fn root_count(&self) -> usize {
        self.islands.len() - self.leaf_count()
    }

    /// Smallest best distance over all islands.
    pub fn best_distance(&self) -> f64 {
        self.islands
            .iter()
            .map(Island::best_distance)
            .fold(f64::INFINITY, f64::min)
    }

    /// The island holding the best genome, root included.
    pub fn best_island(&self) -> Option<&Island> {
        self.islands
            .iter()
            .filter(|island| island.best_genome().is_some())
            .min_by(|a, b| a.best_distance().total_cmp(&b.best_distance()))
    }

    /// Runs one generation step on every island in parallel.
    #[instrument(level = "debug", skip(self, breeder, evaluator), fields(islands = self.islands.len()))]
    pub(crate) fn evolve_all<E: Evaluator + ?Sized>(
        &mut self,
        breeder: &Breeder,
        evaluator: &E,
        population_size: usize,
    ) {
        self.islands.par_iter_mut().for_each(|island| {
            island.step(breeder, evaluator, population_size);
        });
    }

    /// Evaluates every island, returning the best distance over all of them.
    pub(crate) fn evaluate_all<E: Evaluator + ?Sized>(&mut self, evaluator: &E) -> f64 {
        self.islands
            .par_iter_mut()
            .map(|island| island.evaluate(evaluator))
            .reduce(|| f64::INFINITY, f64::min)
    }

    pub(crate) fn invalidate_all(&mut self) {
        for island in self.islands.iter_mut() {
            island.invalidate();
        }
    }

    /// Copies every leaf's best genome into the root, then forces similar
    /// leaves apart.
    #[instrument(level = "info", skip(self, mutagen), fields(leaves = self.leaf_count()))]
    pub fn migrate(&mut self, mutagen: &Mutagen) -> MigrationOutcome {
        let migrants: Vec<Genome> = self
            .leaves()
            .filter_map(|leaf| leaf.best_genome().cloned())
            .collect();

        let placed = match self.islands.iter_mut().find(|i| i.role() == Role::Root) {
            Some(root) => root.accept_migrants(migrants),
            None => 0,
        };

        let niched = self.niche(mutagen);

        tracing::info!(
            migrants = placed,
            niched = niched.len(),
            "Migration completed"
        );

        MigrationOutcome {
            migrants: placed,
            niched,
        }
    }

    /// Mutates the population of the worse leaf of every pair above
    /// [`NICHING_THRESHOLD`]. A leaf in several such pairs is mutated once
    /// per pair.
    fn niche(&mut self, mutagen: &Mutagen) -> Vec<IslandId> {
        let bests = self.leaf_bests();
        let mut worse = Vec::new();

        for (i, (lhs_id, lhs)) in bests.iter().enumerate() {
            for (rhs_id, rhs) in &bests[i + 1..] {
                if similarity(&self.layout, lhs.genes(), rhs.genes()) <= NICHING_THRESHOLD {
                    continue;
                }
                let target = if lhs.distance() > rhs.distance() {
                    *lhs_id
                } else {
                    *rhs_id
                };
                worse.push(target);
            }
        }

        for id in &worse {
            if let Some(island) = self.island_mut(*id) {
                tracing::debug!(island_id = id, "Niching leaf");
                island.mutate_all(mutagen);
            }
        }

        worse
    }

    /// Removes leaves whose best genome nearly duplicates a better leaf's.
    ///
    /// A leaf marked for removal is skipped in every later comparison, so a
    /// chain of near-duplicates collapses onto one survivor in a single pass.
    #[instrument(level = "debug", skip(self), fields(leaves = self.leaf_count()))]
    pub fn prune_duplicates(&mut self) -> Vec<IslandId> {
        let bests = self.leaf_bests();
        let mut marked: HashSet<IslandId> = HashSet::new();

        for (i, (lhs_id, lhs)) in bests.iter().enumerate() {
            for (rhs_id, rhs) in &bests[i + 1..] {
                if marked.contains(lhs_id) || marked.contains(rhs_id) {
                    continue;
                }
                if similarity(&self.layout, lhs.genes(), rhs.genes()) > PRUNING_THRESHOLD {
                    if lhs.distance() < rhs.distance() {
                        marked.insert(*rhs_id);
                    } else {
                        marked.insert(*lhs_id);
                    }
                }
            }
        }

        if marked.is_empty() {
            return Vec::new();
        }

        let mut pruned: Vec<IslandId> = marked.into_iter().collect();
        pruned.sort_unstable();
        self.islands
            .retain(|island| !(island.is_leaf() && pruned.contains(&island.id())));

        tracing::info!(pruned = ?pruned, leaves = self.leaf_count(), "Pruned duplicate leaves");
        pruned
    }

    /// Adds a leaf with a random population. Its id is one above the largest
    /// id in use.
    #[instrument(level = "info", skip(self, configuration, rng), fields(leaves = self.leaf_count()))]
    pub fn spawn_leaf<R: Rng>(&mut self, configuration: &Configuration, rng: &mut R) -> IslandId {
        let id = self
            .islands
            .iter()
            .map(Island::id)
            .max()
            .map_or(ROOT_ID + 1, |max| max + 1);

        let leaf = Island::seeded(
            id,
            Role::Leaf,
            configuration.population_size,
            &self.layout,
            rng,
        )
        .with_color(configuration.color_for(id));
        self.islands.push(leaf);

        tracing::info!(island_id = id, "Spawned leaf");
        id
    }

    /// Prunes duplicates, then spawns a leaf when the generation is due, ground
    /// truth is known and the leaf cap is not reached.
    #[instrument(level = "debug", skip(self, configuration, rng), fields(generation = generation, has_ground_truth = has_ground_truth))]
    pub fn manage<R: Rng>(
        &mut self,
        generation: u64,
        has_ground_truth: bool,
        configuration: &Configuration,
        rng: &mut R,
    ) -> Management {
        let pruned = self.prune_duplicates();

        let due = generation > 0 && generation % configuration.spawn_interval == 0;
        let spawned = if has_ground_truth && due && self.leaf_count() < configuration.max_leaves {
            Some(self.spawn_leaf(configuration, rng))
        } else {
            None
        };

        Management { pruned, spawned }
    }

    fn leaf_bests(&self) -> Vec<(IslandId, Genome)> {
        self.leaves()
            .filter_map(|leaf| leaf.best_genome().map(|best| (leaf.id(), best.clone())))
            .collect()
    }
}
