use super::{Command, Error, Event, InitMessage};
use crate::models::{
    Breeder, Configuration, ConfigurationError, DistanceEvaluator, Genome, GenomeLayout, Island,
    Metric, Role,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::{
    self, Receiver, Sender, UnboundedReceiver, UnboundedSender,
    error::{TryRecvError, TrySendError},
};
use tokio::task::JoinHandle;
use tracing::instrument;

/// Generations a running worker completes before it reports and yields.
pub const DEFAULT_BATCH_SIZE: u32 = 5;

/// Events a spawned worker buffers for a slow consumer. Updates that do not
/// fit are skipped.
pub const EVENT_CAPACITY: usize = 16;

struct IslandState {
    island: Island,
    evaluator: DistanceEvaluator,
    population_size: usize,
}

/// Drives one leaf island through the worker message contract.
///
/// The worker itself is synchronous; [`spawn_worker`] runs it as a tokio task.
pub struct Worker {
    batch_size: u32,
    breeder: Breeder,
    rng: StdRng,
    state: Option<IslandState>,
    running: bool,
}

impl Default for Worker {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            breeder: Breeder::default(),
            rng: StdRng::from_os_rng(),
            state: None,
            running: false,
        }
    }
}

impl Worker {
    pub fn new(batch_size: u32) -> Result<Self, ConfigurationError> {
        if batch_size == 0 {
            return Err(ConfigurationError::InvalidBatchSize);
        }
        Ok(Self {
            batch_size,
            ..Self::default()
        })
    }

    /// Worker using the configured batch size, seeded when the configuration
    /// carries a seed.
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigurationError> {
        configuration.validate()?;
        let worker = Self::new(configuration.worker_batch_size)?;
        Ok(match configuration.seed {
            Some(seed) => worker.with_seed(seed),
            None => worker,
        })
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn with_breeder(mut self, breeder: Breeder) -> Self {
        self.breeder = breeder;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn island(&self) -> Option<&Island> {
        self.state.as_ref().map(|state| &state.island)
    }

    /// Applies one command, returning the event it produces, if any.
    #[instrument(level = "debug", skip(self, command), fields(command = command.name(), running = self.running))]
    pub fn handle(&mut self, command: Command) -> Result<Option<Event>, Error> {
        match command {
            Command::Init(init) => self.init(init).map(Some),
            Command::Start => {
                if self.state.is_none() {
                    return Err(Error::NotInitialized { command: "start" });
                }
                self.running = true;
                Ok(None)
            }
            Command::Stop => {
                self.running = false;
                Ok(None)
            }
            Command::MigrateIn { migrants } => {
                self.migrate_in(migrants)?;
                Ok(None)
            }
        }
    }

    /// Creates the island and evaluates its random population. A second init
    /// replaces the island and stops the run loop.
    #[instrument(level = "info", skip(self, init), fields(node_id = init.node_id, problem_id = %init.problem_id, city_count = init.city_count, pop_size = init.pop_size))]
    fn init(&mut self, init: InitMessage) -> Result<Event, Error> {
        if init.pop_size == 0 {
            return Err(ConfigurationError::EmptyPopulation.into());
        }

        let layout = GenomeLayout::new(init.city_count, init.salesmen_count);
        let evaluator = DistanceEvaluator::new(
            init.coordinates,
            init.depot,
            Metric::for_problem(&init.problem_id),
            layout,
        )?;

        let mut island = Island::seeded(
            init.node_id,
            Role::Leaf,
            init.pop_size,
            &layout,
            &mut self.rng,
        );
        island.evaluate(&evaluator);

        let event = Event::InitDone {
            best_distance: island.best_genome().and_then(Genome::distance),
            best_genome: island.best_genome().map(|g| g.genes().to_vec()),
        };

        self.running = false;
        self.state = Some(IslandState {
            island,
            evaluator,
            population_size: init.pop_size,
        });

        tracing::info!("Worker initialized");
        Ok(event)
    }

    /// Replaces the worst individuals with the admissible migrants and
    /// evaluates them right away.
    fn migrate_in(&mut self, migrants: Vec<Vec<usize>>) -> Result<(), Error> {
        let state = self
            .state
            .as_mut()
            .ok_or(Error::NotInitialized { command: "migrate_in" })?;
        let layout = *state.evaluator.layout();

        let offered = migrants.len();
        let admitted: Vec<Genome> = migrants
            .into_iter()
            .filter(|genes| layout.admits(genes))
            .map(Genome::new)
            .collect();
        if admitted.len() < offered {
            tracing::warn!(
                island_id = state.island.id(),
                rejected = offered - admitted.len(),
                "Dropped migrants that do not fit the genome layout"
            );
        }

        let placed = state.island.accept_migrants(admitted);
        state.island.evaluate(&state.evaluator);

        tracing::debug!(island_id = state.island.id(), placed = placed, "Migrants applied");
        Ok(())
    }

    /// Runs one batch of generations and reports the island's best. Returns
    /// `None` when the worker is not initialized.
    #[instrument(level = "debug", skip(self), fields(batch_size = self.batch_size))]
    pub fn run_batch(&mut self) -> Option<Event> {
        let state = self.state.as_mut()?;

        for _ in 0..self.batch_size {
            state
                .island
                .step(&self.breeder, &state.evaluator, state.population_size);
        }

        let best = state.island.best_genome();
        Some(Event::Update {
            best_genome: best.map(|g| g.genes().to_vec()),
            best_distance: best.and_then(Genome::distance),
            generations: self.batch_size,
        })
    }
}

/// Typed endpoints of a spawned worker task.
pub struct WorkerHandle {
    commands: UnboundedSender<Command>,
    events: Receiver<Event>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Queues a command. Never waits for the worker.
    pub fn send(&self, command: Command) -> Result<(), Error> {
        self.commands.send(command).map_err(|_| Error::Disconnected)
    }

    /// Next event from the worker, or `None` once the worker is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        self.events.recv().await
    }

    /// Closes the command channel and waits for the worker task to finish.
    pub async fn shutdown(self) -> Result<(), Error> {
        drop(self.commands);
        self.task.await?;
        Ok(())
    }
}

/// Runs the worker as a tokio task.
///
/// While running, pending commands are drained without waiting between
/// batches, so migrants and stop requests take effect at the next batch
/// boundary. While stopped, the task waits for the next command. Batches run
/// on the blocking pool. An update that finds the event queue full is
/// skipped; the next one carries the same or a better best.
pub fn spawn_worker(worker: Worker) -> WorkerHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(EVENT_CAPACITY);

    let task = tokio::spawn(drive(worker, command_rx, event_tx));

    WorkerHandle {
        commands: command_tx,
        events: event_rx,
        task,
    }
}

async fn drive(
    mut worker: Worker,
    mut commands: UnboundedReceiver<Command>,
    events: Sender<Event>,
) {
    loop {
        let command = if worker.is_running() {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv().await {
                Some(command) => Some(command),
                None => break,
            }
        };

        let Some(command) = command else {
            let batch = tokio::task::spawn_blocking(move || {
                let update = worker.run_batch();
                (worker, update)
            })
            .await;

            let update = match batch {
                Ok((returned, update)) => {
                    worker = returned;
                    update
                }
                Err(err) => {
                    let err = Error::from(err);
                    tracing::error!(error = %err, "Worker batch failed");
                    let _ = events
                        .send(Event::Failed {
                            reason: err.to_string(),
                        })
                        .await;
                    break;
                }
            };

            match update.map(|update| events.try_send(update)) {
                Some(Err(TrySendError::Full(_))) => {
                    tracing::trace!("Event queue full, update skipped");
                }
                Some(Err(TrySendError::Closed(_))) => break,
                _ => {}
            }
            continue;
        };

        let event = worker.handle(command).unwrap_or_else(|err| {
            tracing::error!(error = %err, "Worker command failed");
            Some(Event::Failed {
                reason: err.to_string(),
            })
        });

        if let Some(event) = event {
            if events.send(event).await.is_err() {
                break;
            }
        }
    }

    tracing::debug!("Worker task finished");
}
