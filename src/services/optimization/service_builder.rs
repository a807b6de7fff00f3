use crate::models::{Breeder, Configuration, MetricsEngine, Problem};
use crate::services::optimization::{Error, Orchestrator};
use crate::services::topology::Topology;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::instrument;
use uuid::Uuid;

pub struct OrchestratorBuilder {
    pub(super) problem: Problem,
    pub(super) configuration: Configuration,
    pub(super) breeder: Breeder,
}

impl OrchestratorBuilder {
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            configuration: Configuration::default(),
            breeder: Breeder::default(),
        }
    }

    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_breeder(mut self, breeder: Breeder) -> Self {
        self.breeder = breeder;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.configuration.seed = Some(seed);
        self
    }

    /// Validates the problem and configuration, then creates and evaluates the
    /// initial islands.
    #[instrument(level = "debug", skip(self), fields(problem_id = %self.problem.problem_id, population_size = self.configuration.population_size, seed = ?self.configuration.seed))]
    pub fn build(self) -> Result<Orchestrator, Error> {
        self.configuration.validate()?;
        let evaluator = self.problem.evaluator()?;

        let mut rng = match self.configuration.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let topology = Topology::initialize(self.problem.layout(), &self.configuration, &mut rng);

        let mut orchestrator = Orchestrator {
            run_id: Uuid::now_v7(),
            problem: self.problem,
            configuration: self.configuration,
            canonical: evaluator.clone(),
            evaluator,
            breeder: self.breeder,
            topology,
            metrics: MetricsEngine::new(),
            generation: 0,
            global_best: None,
            rng,
        };
        orchestrator.evaluate();

        Ok(orchestrator)
    }
}
