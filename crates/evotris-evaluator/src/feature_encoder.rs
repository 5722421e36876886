//! Bounded feature vectors for neural controllers.
//!
//! Both encodings are pure functions of an [`EngineSnapshot`] and clamp every element to
//! `[-1, 1]` before returning it.
//!
//! | Encoding | Layout | Length |
//! |---|---|---|
//! | [`FeatureEncoding::Occupancy`] | top 4 rows × 10 columns occupancy, piece one-hot, rotation / row / column | 50 |
//! | [`FeatureEncoding::Surface`] | column heights, adjacent height deltas, hole ratio, piece one-hot, rotation / row / column | 30 |

use evotris_engine::{EngineSnapshot, Grid, Piece, PieceKind};
use serde::{Deserialize, Serialize};

use crate::board_analysis::BoardAnalysis;

/// Rows of the grid visible to the occupancy encoding, counted from the top.
pub const OCCUPANCY_ROWS: usize = 4;

#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureEncoding {
    /// Binary occupancy of the top rows plus the active piece.
    #[default]
    #[display("occupancy")]
    Occupancy,
    /// Column-height profile and hole ratio plus the active piece.
    #[display("surface")]
    Surface,
}

impl FeatureEncoding {
    /// Length of the vectors produced by [`Self::encode`].
    #[must_use]
    pub const fn input_len(self) -> usize {
        const PIECE_LEN: usize = PieceKind::LEN + 3;
        match self {
            FeatureEncoding::Occupancy => OCCUPANCY_ROWS * Grid::NUM_COLS + PIECE_LEN,
            FeatureEncoding::Surface => Grid::NUM_COLS + (Grid::NUM_COLS - 1) + 1 + PIECE_LEN,
        }
    }

    #[must_use]
    pub fn encode(self, snapshot: &EngineSnapshot) -> Vec<f32> {
        let mut features = Vec::with_capacity(self.input_len());
        match self {
            FeatureEncoding::Occupancy => push_occupancy(&mut features, &snapshot.grid),
            FeatureEncoding::Surface => push_surface(&mut features, &snapshot.grid),
        }
        push_piece(&mut features, snapshot.piece);
        for f in &mut features {
            *f = f.clamp(-1.0, 1.0);
        }
        debug_assert_eq!(features.len(), self.input_len());
        features
    }
}

fn push_occupancy(features: &mut Vec<f32>, grid: &Grid) {
    for row in grid.rows().take(OCCUPANCY_ROWS) {
        features.extend(row.iter().map(|b| if b.is_occupied() { 1.0 } else { 0.0 }));
    }
}

#[expect(clippy::cast_precision_loss)]
fn push_surface(features: &mut Vec<f32>, grid: &Grid) {
    let analysis = BoardAnalysis::from_grid(grid);
    let num_rows = Grid::NUM_ROWS as f32;
    let heights = analysis.column_heights().map(|h| f32::from(h) / num_rows);

    features.extend(heights);
    features.extend(heights.windows(2).map(|w| w[1] - w[0]));

    let total_cells = (Grid::NUM_ROWS * Grid::NUM_COLS) as f32;
    features.push(analysis.num_holes() as f32 / total_cells);
}

#[expect(clippy::cast_precision_loss)]
fn push_piece(features: &mut Vec<f32>, piece: Piece) {
    let mut one_hot = [0.0; PieceKind::LEN];
    one_hot[piece.kind().index()] = 1.0;
    features.extend(one_hot);

    features.push(f32::from(piece.rotation()) / 4.0);
    features.push(piece.row_offset() as f32 / 20.0);
    features.push(piece.column_offset() as f32 / 10.0);
}

#[cfg(test)]
mod tests {
    use evotris_engine::Block;
    use proptest::prelude::*;

    use super::*;

    fn snapshot(grid: Grid, piece: Piece) -> EngineSnapshot {
        EngineSnapshot {
            grid,
            piece,
            score: 0,
            game_over: false,
        }
    }

    #[test]
    fn test_input_len() {
        assert_eq!(FeatureEncoding::Occupancy.input_len(), 50);
        assert_eq!(FeatureEncoding::Surface.input_len(), 30);
    }

    #[test]
    fn test_encoding_names_round_trip() {
        for encoding in [FeatureEncoding::Occupancy, FeatureEncoding::Surface] {
            assert_eq!(encoding.to_string().parse::<FeatureEncoding>().unwrap(), encoding);
        }
        assert_eq!(
            serde_json::to_string(&FeatureEncoding::Surface).unwrap(),
            "\"surface\""
        );
    }

    #[test]
    fn test_occupancy_layout() {
        let mut grid = Grid::EMPTY;
        grid.set_block(0, 0, Block::Filled);
        grid.set_block(3, 9, Block::Filled);
        grid.set_block(4, 5, Block::Filled);
        let piece = Piece::with_position(PieceKind::T, 2, 10, 5);

        let features = FeatureEncoding::Occupancy.encode(&snapshot(grid, piece));
        assert_eq!(features.len(), 50);
        assert_eq!(features[0], 1.0);
        assert_eq!(features[39], 1.0);
        // row 4 is not visible
        assert_eq!(features[..40].iter().sum::<f32>(), 2.0);

        let one_hot = &features[40..47];
        assert_eq!(one_hot[PieceKind::T.index()], 1.0);
        assert_eq!(one_hot.iter().sum::<f32>(), 1.0);
        assert_eq!(&features[47..], &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_surface_layout() {
        let grid = Grid::from_ascii(
            "
            #.........
            #.........
            ..#.......
            ##.#......
            ",
        );
        let piece = Piece::new(PieceKind::O);
        let features = FeatureEncoding::Surface.encode(&snapshot(grid, piece));
        assert_eq!(features.len(), 30);

        let heights = &features[..10];
        assert_eq!(&heights[..4], &[0.2, 0.05, 0.1, 0.05]);
        let deltas = &features[10..19];
        assert!((deltas[0] - (0.05 - 0.2)).abs() < 1e-6);
        assert!((deltas[1] - 0.05).abs() < 1e-6);
        // column 0 has one hole, column 2 has one hole
        assert!((features[19] - 2.0 / 200.0).abs() < 1e-6);
        assert_eq!(features[20 + PieceKind::O.index()], 1.0);
        assert_eq!(&features[27..], &[0.0, 0.0, 0.4]);
    }

    #[test]
    fn test_offsets_outside_the_grid_are_clamped() {
        let piece = Piece::with_position(PieceKind::I, 3, -1, 12);
        let features = FeatureEncoding::Surface.encode(&snapshot(Grid::EMPTY, piece));
        assert_eq!(&features[27..], &[0.75, -0.05, 1.0]);
    }

    fn arb_snapshot() -> impl Strategy<Value = EngineSnapshot> {
        (
            proptest::collection::vec(any::<bool>(), Grid::NUM_ROWS * Grid::NUM_COLS),
            0..PieceKind::LEN,
            0u8..4,
            -40i32..40,
            -40i32..40,
        )
            .prop_map(|(cells, kind, rotation, row, col)| {
                let mut grid = Grid::EMPTY;
                for (i, filled) in cells.into_iter().enumerate() {
                    if filled {
                        grid.set_block(i / Grid::NUM_COLS, i % Grid::NUM_COLS, Block::Filled);
                    }
                }
                let piece = Piece::with_position(PieceKind::ALL[kind], rotation, row, col);
                snapshot(grid, piece)
            })
    }

    proptest! {
        #[test]
        fn every_feature_is_bounded(snapshot in arb_snapshot()) {
            for encoding in [FeatureEncoding::Occupancy, FeatureEncoding::Surface] {
                let features = encoding.encode(&snapshot);
                prop_assert_eq!(features.len(), encoding.input_len());
                for f in features {
                    prop_assert!((-1.0..=1.0).contains(&f), "{encoding}: {f}");
                }
            }
        }
    }
}
