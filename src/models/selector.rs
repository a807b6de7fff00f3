//! Parent selection for island evolution.
//!
//! Selection uses k-way tournaments sampled with replacement: `k` individuals
//! are drawn uniformly from the population and the fittest of them wins. The
//! tournament size tunes the selection pressure:
//!
//! - **Size 2-3**: weak pressure, more exploration
//! - **Size 4-5**: moderate pressure, the default for tour evolution
//! - **Size 6+**: strong pressure, risk of premature convergence
//!
//! ```rust
//! use fx_hga::models::Selector;
//!
//! let default = Selector::default();
//! assert_eq!(default.tournament_size(), 5);
//!
//! let exploratory = Selector::tournament(2)?;
//! # Ok::<(), fx_hga::models::SelectionError>(())
//! ```

use crate::models::Genome;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Tournament size used unless configured otherwise.
pub const TOURNAMENT_SIZE: usize = 5;

/// Runs one tournament and returns the index of the winner.
///
/// Ties keep the earlier sample.
fn tournament<R: Rng + ?Sized>(
    population: &[Genome],
    tournament_size: usize,
    rng: &mut R,
) -> Option<usize> {
    if population.is_empty() {
        return None;
    }

    let mut winner = rng.random_range(0..population.len());
    for _ in 1..tournament_size {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].fitness() > population[winner].fitness() {
            winner = challenger;
        }
    }

    Some(winner)
}

/// Tournament selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selector {
    tournament_size: usize,
}

/// Errors raised when configuring a selector.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("tournament size must be at least 1, got {0}")]
    InvalidTournamentSize(usize),
}

impl Default for Selector {
    fn default() -> Self {
        Self {
            tournament_size: TOURNAMENT_SIZE,
        }
    }
}

impl Selector {
    pub fn tournament(tournament_size: usize) -> Result<Self, SelectionError> {
        if tournament_size == 0 {
            return Err(SelectionError::InvalidTournamentSize(tournament_size));
        }

        Ok(Self { tournament_size })
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Selects one parent. Returns `None` for an empty population.
    #[instrument(level = "trace", skip(self, population, rng), fields(tournament_size = self.tournament_size, population = population.len()))]
    pub(crate) fn select<'a, R: Rng + ?Sized>(
        &self,
        population: &'a [Genome],
        rng: &mut R,
    ) -> Option<&'a Genome> {
        tournament(population, self.tournament_size, rng).map(|index| &population[index])
    }
}
