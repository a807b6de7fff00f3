use super::{City, Evaluation, Gene, Genome, GenomeLayout, Metric, ProblemError, Token};
use tracing::instrument;

/// Distance added for every salesman leg that closes without visiting a city.
pub const EMPTY_LEG_PENALTY: f64 = 100_000.0;

/// Objective function mapping a genome to its tour length.
///
/// Implementations never fail: malformed genomes are penalised instead of
/// rejected so that selection pressure removes them.
pub trait Evaluator: Sync {
    fn distance(&self, genes: &[Gene]) -> f64;

    /// Evaluates the genome unless it already carries a cached evaluation.
    fn evaluate(&self, genome: &mut Genome) -> Evaluation {
        if let Some(evaluation) = genome.evaluation() {
            return evaluation;
        }
        let evaluation = Evaluation::from_distance(self.distance(genome.genes()));
        genome.set_evaluation(evaluation);
        evaluation
    }
}

/// Tour-length evaluator over one coordinate set.
#[derive(Debug, Clone)]
pub struct DistanceEvaluator {
    cities: Vec<City>,
    depot: City,
    metric: Metric,
    layout: GenomeLayout,
}

impl DistanceEvaluator {
    /// Fails when the coordinate set cannot back every city index of the layout.
    #[instrument(level = "debug", skip(cities), fields(provided = cities.len(), city_count = layout.city_count, metric = ?metric))]
    pub fn new(
        cities: Vec<City>,
        depot: City,
        metric: Metric,
        layout: GenomeLayout,
    ) -> Result<Self, ProblemError> {
        if layout.city_count == 0 {
            return Err(ProblemError::NoCities);
        }
        if layout.salesmen == 0 {
            return Err(ProblemError::NoSalesmen);
        }
        if cities.len() < layout.city_count {
            return Err(ProblemError::MissingCoordinates {
                expected: layout.city_count,
                provided: cities.len(),
            });
        }

        Ok(Self {
            cities,
            depot,
            metric,
            layout,
        })
    }

    /// Same metric and layout over an alternate coordinate set, e.g. projected
    /// screen coordinates. The canonical evaluator is left untouched.
    pub fn with_coordinates(&self, cities: Vec<City>, depot: City) -> Result<Self, ProblemError> {
        Self::new(cities, depot, self.metric, self.layout)
    }

    pub fn layout(&self) -> &GenomeLayout {
        &self.layout
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn depot(&self) -> &City {
        &self.depot
    }
}

impl Evaluator for DistanceEvaluator {
    /// Walks the genome from the depot. A separator closes the current leg at
    /// the depot and the next leg starts from there; the final leg returns to
    /// the depot as well.
    fn distance(&self, genes: &[Gene]) -> f64 {
        let mut total = 0.0;
        let mut penalty = 0.0;
        let mut position = &self.depot;
        let mut cities_in_leg = 0usize;

        for &gene in genes {
            let next = match self.layout.classify(gene) {
                Token::City(index) => {
                    cities_in_leg += 1;
                    &self.cities[index]
                }
                Token::Separator => {
                    if cities_in_leg == 0 {
                        penalty += EMPTY_LEG_PENALTY;
                    }
                    cities_in_leg = 0;
                    &self.depot
                }
            };
            total += self.metric.between(position, next);
            position = next;
        }

        if cities_in_leg == 0 && self.layout.salesmen > 1 {
            penalty += EMPTY_LEG_PENALTY;
        }
        total += self.metric.between(position, &self.depot);

        total + penalty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Vec<City> {
        vec![
            City::new(0, 0.0, 0.0),
            City::new(1, 1.0, 0.0),
            City::new(2, 1.0, 1.0),
            City::new(3, 0.0, 1.0),
        ]
    }

    fn planar(salesmen: usize) -> DistanceEvaluator {
        DistanceEvaluator::new(
            unit_square(),
            City::new(0, 0.0, 0.0),
            Metric::PlanarRounded,
            GenomeLayout::new(4, salesmen),
        )
        .unwrap()
    }

    #[test]
    fn it_measures_the_unit_square_tour() {
        assert_eq!(planar(1).distance(&[0, 1, 2, 3]), 4.0);
    }

    #[test]
    fn it_is_direction_independent() {
        let evaluator = planar(1);
        assert_eq!(
            evaluator.distance(&[0, 1, 2, 3]),
            evaluator.distance(&[3, 2, 1, 0])
        );
    }

    #[test]
    fn it_returns_to_the_depot_between_legs() {
        let evaluator = planar(2);
        // depot -> 1 -> depot, then depot -> 2 -> 3 -> 0 -> depot
        // 1 + 1, then round(sqrt(2)) + 1 + 1 + 0
        assert_eq!(evaluator.distance(&[1, 4, 2, 3, 0]), 5.0);
    }

    #[test]
    fn it_penalises_empty_legs() {
        let evaluator = planar(2);
        let leading = evaluator.distance(&[4, 0, 1, 2, 3]);
        assert_eq!(leading, 4.0 + EMPTY_LEG_PENALTY);

        let trailing = evaluator.distance(&[0, 1, 2, 3, 4]);
        assert_eq!(trailing, 4.0 + EMPTY_LEG_PENALTY);
    }

    #[test]
    fn it_penalises_every_empty_leg_of_a_degenerate_genome() {
        let evaluator = DistanceEvaluator::new(
            unit_square()[..2].to_vec(),
            City::new(0, 0.0, 0.0),
            Metric::PlanarRounded,
            GenomeLayout::new(2, 4),
        )
        .unwrap();

        // legs: [1] [] [] [0] -> two empty legs
        let distance = evaluator.distance(&[1, 2, 3, 4, 0]);
        assert_eq!(distance, 2.0 + 2.0 * EMPTY_LEG_PENALTY);
    }

    #[test]
    fn it_caches_the_evaluation_on_the_genome() {
        let evaluator = planar(1);
        let mut genome = Genome::new(vec![0, 1, 2, 3]);

        let evaluation = evaluator.evaluate(&mut genome);
        assert_eq!(evaluation.distance, 4.0);
        assert_eq!(evaluation.fitness, 0.2);
        assert_eq!(genome.evaluation(), Some(evaluation));
    }

    #[test]
    fn it_rejects_coordinate_sets_that_do_not_back_every_city() {
        let result = DistanceEvaluator::new(
            unit_square()[..3].to_vec(),
            City::new(0, 0.0, 0.0),
            Metric::PlanarRounded,
            GenomeLayout::new(4, 1),
        );
        assert_eq!(
            result.unwrap_err(),
            ProblemError::MissingCoordinates {
                expected: 4,
                provided: 3
            }
        );
    }

    #[test]
    fn it_evaluates_against_alternate_coordinates() {
        let canonical = planar(1);
        let doubled: Vec<City> = unit_square()
            .into_iter()
            .map(|c| City::new(c.id, c.x * 2.0, c.y * 2.0))
            .collect();

        let projected = canonical
            .with_coordinates(doubled, City::new(0, 0.0, 0.0))
            .unwrap();

        assert_eq!(projected.distance(&[0, 1, 2, 3]), 8.0);
        assert_eq!(canonical.distance(&[0, 1, 2, 3]), 4.0);
    }
}
