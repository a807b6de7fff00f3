use crate::models::{City, Gene, GroundTruth, GroundTruthTable, IslandId};
use serde::{Deserialize, Serialize};

fn one() -> usize {
    1
}

/// Everything a worker needs to set up its island.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitMessage {
    pub city_count: usize,
    #[serde(default = "one")]
    pub salesmen_count: usize,
    #[serde(alias = "evalCities")]
    pub coordinates: Vec<City>,
    #[serde(alias = "evalDepot")]
    pub depot: City,
    pub problem_id: String,
    pub pop_size: usize,
    #[serde(default)]
    pub ground_truth: Option<GroundTruthTable>,
    pub node_id: IslandId,
}

impl InitMessage {
    pub fn ground_truth(&self) -> Option<&GroundTruth> {
        self.ground_truth.as_ref()?.get(&self.problem_id)
    }
}

/// Messages sent to a worker. Genomes cross the boundary as raw token vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Init(InitMessage),
    Start,
    Stop,
    MigrateIn { migrants: Vec<Vec<Gene>> },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init(_) => "init",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::MigrateIn { .. } => "migrate_in",
        }
    }
}

/// Messages emitted by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Event {
    InitDone {
        best_distance: Option<f64>,
        best_genome: Option<Vec<Gene>>,
    },
    Update {
        best_genome: Option<Vec<Gene>>,
        best_distance: Option<f64>,
        /// Generations run in this batch.
        generations: u32,
    },
    Failed {
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_an_init_command() {
        let command: Command = serde_json::from_str(
            r#"{
                "type": "init",
                "cityCount": 2,
                "salesmenCount": 1,
                "evalCities": [{"x": 0, "y": 0}, {"x": 3, "y": 4}],
                "evalDepot": {"x": 0, "y": 0},
                "problemId": "MSTSP-two",
                "popSize": 10,
                "groundTruth": {"MSTSP-two": {"optLength": 10, "optCount": 1}},
                "nodeId": 3
            }"#,
        )
        .unwrap();

        let Command::Init(init) = command else {
            panic!("expected init, got {command:?}");
        };
        assert_eq!(init.coordinates.len(), 2);
        assert_eq!(init.node_id, 3);
        assert_eq!(init.ground_truth(), Some(&GroundTruth::new(10.0, 1)));
    }

    #[test]
    fn test_parses_unit_and_migrant_commands() {
        let start: Command = serde_json::from_str(r#"{"type": "start"}"#).unwrap();
        let migrate: Command =
            serde_json::from_str(r#"{"type": "migrate_in", "migrants": [[1, 0]]}"#).unwrap();

        assert_eq!(start, Command::Start);
        assert_eq!(
            migrate,
            Command::MigrateIn {
                migrants: vec![vec![1, 0]]
            }
        );
        assert_eq!(migrate.name(), "migrate_in");
    }

    #[test]
    fn test_serializes_events_with_camel_case_fields() {
        let event = Event::Update {
            best_genome: Some(vec![0, 1]),
            best_distance: Some(10.0),
            generations: 5,
        };

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "type": "update",
                "bestGenome": [0, 1],
                "bestDistance": 10.0,
                "generations": 5
            })
        );
    }
}
