use chrono::{DateTime, Utc};
use evotris_evaluator::{placement_search::SearchParams, weights::HeuristicWeights};
use serde::{Deserialize, Serialize};

/// Trained heuristic weights as written by `train-heuristic`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HeuristicModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub generations: usize,
    /// Summed score of the agent's best generation.
    pub fitness: f64,
    /// `fitness` divided by the games played per generation.
    pub average_score: f64,
    /// Search settings the weights were trained with; replays use the same ones.
    #[serde(default)]
    pub search: SearchParams,
    pub weights: HeuristicWeights,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model() {
        let json = r#"{
            "name": "heuristic",
            "trained_at": "2024-05-01T12:00:00Z",
            "generations": 30,
            "fitness": 1200.0,
            "average_score": 400.0,
            "weights": {
                "height": -0.5,
                "holes": -0.7,
                "bumpiness": -0.2,
                "lines_cleared": 0.8
            }
        }"#;
        let model: HeuristicModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.generations, 30);
        assert_eq!(model.weights.holes, -0.7);
        assert_eq!(model.weights.lines_cleared, 0.8);
        assert_eq!(model.search, SearchParams::default());
    }

    #[test]
    fn test_parse_model_with_search_params() {
        let json = r#"{
            "name": "heuristic",
            "trained_at": "2024-05-01T12:00:00Z",
            "generations": 1,
            "fitness": 10.0,
            "average_score": 10.0,
            "search": { "drop_cap": 40 },
            "weights": {
                "height": -0.5,
                "holes": -0.7,
                "bumpiness": -0.2,
                "lines_cleared": 0.8
            }
        }"#;
        let model: HeuristicModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.search.drop_cap, 40);
        assert_eq!(model.search.column_margin, 2);
    }
}
