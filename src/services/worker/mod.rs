//! Single-island worker speaking a message contract, for running islands as
//! isolated concurrent units.

mod errors;
mod messages;
mod service;

pub use errors::Error;
pub use messages::{Command, Event, InitMessage};
pub use service::{DEFAULT_BATCH_SIZE, EVENT_CAPACITY, Worker, WorkerHandle, spawn_worker};
