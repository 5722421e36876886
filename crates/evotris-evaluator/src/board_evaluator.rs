//! Linear scoring of a board state.
//!
//! A board is reduced to four [`BoardFeatures`] and scored as the weighted sum
//! `Σ weight[f] · feature[f]` under a [`HeuristicWeights`]. Scoring is pure: the same
//! snapshot and weights always give the same value.

use evotris_engine::EngineSnapshot;

use crate::{
    board_analysis::BoardAnalysis,
    weights::{HeuristicWeights, WeightKey},
};

/// Feature values of one board state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardFeatures {
    /// Sum of column heights.
    pub aggregate_height: f64,
    /// Empty cells covered by a block in the same column.
    pub holes: f64,
    /// Sum of absolute height differences between adjacent columns.
    pub bumpiness: f64,
    /// Lines cleared so far, derived from the score (10 points per line).
    pub lines_cleared: f64,
}

impl BoardFeatures {
    #[must_use]
    pub fn from_snapshot(snapshot: &EngineSnapshot) -> Self {
        Self::from_analysis(&BoardAnalysis::from_grid(&snapshot.grid), snapshot.score)
    }

    #[must_use]
    pub fn from_analysis(analysis: &BoardAnalysis, score: u32) -> Self {
        Self {
            aggregate_height: f64::from(analysis.total_height()),
            holes: f64::from(analysis.num_holes()),
            bumpiness: f64::from(analysis.bumpiness()),
            lines_cleared: f64::from(score) / 10.0,
        }
    }

    #[must_use]
    pub fn get(&self, key: WeightKey) -> f64 {
        match key {
            WeightKey::Height => self.aggregate_height,
            WeightKey::Holes => self.holes,
            WeightKey::Bumpiness => self.bumpiness,
            WeightKey::LinesCleared => self.lines_cleared,
        }
    }

    #[must_use]
    pub fn weighted_sum(&self, weights: &HeuristicWeights) -> f64 {
        weights.iter().map(|(key, w)| w * self.get(key)).sum()
    }
}

/// Scores `snapshot` under `weights`; higher is better.
#[must_use]
pub fn score(snapshot: &EngineSnapshot, weights: &HeuristicWeights) -> f64 {
    BoardFeatures::from_snapshot(snapshot).weighted_sum(weights)
}

#[cfg(test)]
mod tests {
    use evotris_engine::{Grid, Piece, PieceKind};

    use super::*;

    fn snapshot(art: &str, score: u32) -> EngineSnapshot {
        EngineSnapshot {
            grid: Grid::from_ascii(art),
            piece: Piece::new(PieceKind::T),
            score,
            game_over: false,
        }
    }

    const WEIGHTS: HeuristicWeights = HeuristicWeights {
        height: -0.5,
        holes: -0.5,
        bumpiness: -0.1,
        lines_cleared: 0.5,
    };

    #[test]
    fn test_empty_grid_scores_zero() {
        let features = BoardFeatures::from_snapshot(&snapshot("", 0));
        assert_eq!(features.aggregate_height, 0.0);
        assert_eq!(features.holes, 0.0);
        assert_eq!(features.bumpiness, 0.0);
        assert_eq!(score(&snapshot("", 0), &WEIGHTS), 0.0);
    }

    #[test]
    fn test_lines_cleared_proxy_uses_score() {
        let features = BoardFeatures::from_snapshot(&snapshot("", 40));
        assert_eq!(features.lines_cleared, 4.0);
        assert!((score(&snapshot("", 40), &WEIGHTS) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_sum() {
        let snap = snapshot(
            "
            ##........
            #.........
            ",
            10,
        );
        // heights [2,2,0,...]: aggregate 4, holes 1, bumpiness 2, lines 1
        let features = BoardFeatures::from_snapshot(&snap);
        assert_eq!(
            features,
            BoardFeatures {
                aggregate_height: 4.0,
                holes: 1.0,
                bumpiness: 2.0,
                lines_cleared: 1.0,
            }
        );
        let expected = -0.5 * 4.0 - 0.5 * 1.0 - 0.1 * 2.0 + 0.5 * 1.0;
        assert!((score(&snap, &WEIGHTS) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_ignores_active_piece() {
        let a = snapshot("#.........", 0);
        let mut b = a.clone();
        b.piece = Piece::new(PieceKind::I);
        assert_eq!(score(&a, &WEIGHTS), score(&b, &WEIGHTS));
    }
}
