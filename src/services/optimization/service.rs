use super::{Error, GenerationReport, IslandSummary, OrchestratorBuilder};
use crate::models::{
    Breeder, City, Configuration, DistanceEvaluator, Gene, Genome, MetricsEngine, Problem,
    QualityMetrics,
};
use crate::services::topology::{Management, MigrationOutcome, Topology};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::instrument;
use uuid::Uuid;

/// Owns one optimization run: the island topology, the evaluator and the
/// per-run metrics state.
pub struct Orchestrator {
    pub(super) run_id: Uuid,
    pub(super) problem: Problem,
    pub(super) configuration: Configuration,
    pub(super) canonical: DistanceEvaluator,
    pub(super) evaluator: DistanceEvaluator,
    pub(super) breeder: Breeder,
    pub(super) topology: Topology,
    pub(super) metrics: MetricsEngine,
    pub(super) generation: u64,
    pub(super) global_best: Option<Genome>,
    pub(super) rng: StdRng,
}

impl Orchestrator {
    pub fn builder(problem: Problem) -> OrchestratorBuilder {
        OrchestratorBuilder::new(problem)
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn metrics(&self) -> &MetricsEngine {
        &self.metrics
    }

    pub fn global_best(&self) -> Option<&Genome> {
        self.global_best.as_ref()
    }

    pub fn global_best_distance(&self) -> Option<f64> {
        self.global_best.as_ref().and_then(Genome::distance)
    }

    /// Runs one generation: evolve every island, migrate when due, prune and
    /// spawn leaves, re-evaluate, then score the leaves.
    #[instrument(level = "debug", skip(self), fields(run_id = %self.run_id, generation = self.generation + 1))]
    pub fn step(&mut self) -> GenerationReport {
        self.generation += 1;
        let generation = self.generation;

        self.topology.evolve_all(
            &self.breeder,
            &self.evaluator,
            self.configuration.population_size,
        );

        let migration = if generation % self.configuration.migration_interval == 0 {
            Some(self.topology.migrate(&self.breeder.mutagen))
        } else {
            None
        };

        let management = self.topology.manage(
            generation,
            self.problem.ground_truth().is_some(),
            &self.configuration,
            &mut self.rng,
        );

        self.evaluate();
        let metrics = self.observe();

        self.report(metrics, migration, management)
    }

    /// Steps until `max_generations` more generations have run or `stop` is
    /// set. The flag is only checked between generations. Returns the last
    /// report, if any generation ran.
    #[instrument(level = "info", skip(self, stop, on_report), fields(run_id = %self.run_id, max_generations = max_generations))]
    pub fn run<F>(
        &mut self,
        max_generations: u64,
        stop: &AtomicBool,
        mut on_report: F,
    ) -> Option<GenerationReport>
    where
        F: FnMut(&GenerationReport),
    {
        let mut last = None;

        for _ in 0..max_generations {
            if stop.load(Ordering::Relaxed) {
                tracing::info!(generation = self.generation, "Run stopped");
                break;
            }
            let report = self.step();
            on_report(&report);
            last = Some(report);
        }

        tracing::info!(
            generation = self.generation,
            best_distance = ?self.global_best_distance(),
            found_optima = self.metrics.found_optima().len(),
            "Run finished"
        );
        last
    }

    /// Starts a new run on the same problem: new run id, fresh islands, no
    /// found optima, generation 0.
    #[instrument(level = "info", skip(self), fields(previous_run_id = %self.run_id))]
    pub fn reset(&mut self) {
        self.run_id = Uuid::now_v7();
        self.topology = Topology::initialize(
            self.problem.layout(),
            &self.configuration,
            &mut self.rng,
        );
        self.metrics = MetricsEngine::new();
        self.generation = 0;
        self.global_best = None;
        self.evaluate();

        tracing::info!(run_id = %self.run_id, "Run reset");
    }

    /// Evaluates against an alternate coordinate set, e.g. projected screen
    /// coordinates. Every cached evaluation and best genome is dropped since
    /// distances are no longer comparable.
    #[instrument(level = "info", skip(self, cities), fields(run_id = %self.run_id, cities = cities.len()))]
    pub fn retarget(&mut self, cities: Vec<City>, depot: City) -> Result<(), Error> {
        self.evaluator = self.canonical.with_coordinates(cities, depot)?;
        self.reevaluate();
        Ok(())
    }

    /// Returns to the problem's own coordinates after [`Orchestrator::retarget`].
    pub fn restore_coordinates(&mut self) {
        self.evaluator = self.canonical.clone();
        self.reevaluate();
    }

    fn reevaluate(&mut self) {
        self.topology.invalidate_all();
        self.global_best = None;
        self.evaluate();
    }

    /// Evaluates every island and ratchets the global best.
    pub(super) fn evaluate(&mut self) {
        self.topology.evaluate_all(&self.evaluator);

        let Some(best) = self.topology.best_island().and_then(|i| i.best_genome()) else {
            return;
        };
        let improved = match (best.distance(), self.global_best_distance()) {
            (Some(candidate), Some(current)) => candidate < current,
            (Some(_), None) => true,
            _ => false,
        };
        if improved {
            tracing::debug!(best_distance = ?best.distance(), generation = self.generation, "Global best improved");
            self.global_best = Some(best.clone());
        }
    }

    fn observe(&mut self) -> QualityMetrics {
        let leaf_bests: Vec<(&[Gene], f64)> = self
            .topology
            .leaves()
            .filter_map(|leaf| {
                leaf.best_genome()
                    .map(|best| (best.genes(), leaf.best_distance()))
            })
            .collect();

        self.metrics.observe(
            self.problem.ground_truth(),
            self.topology.layout(),
            &leaf_bests,
        )
    }

    fn report(
        &self,
        metrics: QualityMetrics,
        migration: Option<MigrationOutcome>,
        management: Management,
    ) -> GenerationReport {
        GenerationReport {
            run_id: self.run_id,
            generation: self.generation,
            timestamp: chrono::Utc::now(),
            best_distance: self.global_best_distance(),
            best_genome: self.global_best.as_ref().map(|g| g.genes().to_vec()),
            islands: self
                .topology
                .islands()
                .iter()
                .map(IslandSummary::from)
                .collect(),
            leaf_count: self.topology.leaf_count(),
            root_count: self.topology.root_count(),
            metrics,
            migration,
            pruned: management.pruned,
            spawned: management.spawned,
        }
    }
}
