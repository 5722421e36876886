use crate::core::{grid::Grid, piece::Piece};

/// Value copy of the observable engine state.
///
/// Snapshots never alias the engine they were taken from. Two snapshots compare equal when
/// grid, active piece, score and game-over flag all match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub grid: Grid,
    pub piece: Piece,
    pub score: u32,
    pub game_over: bool,
}

impl EngineSnapshot {
    /// Number of lines cleared so far, derived from the score.
    #[must_use]
    pub fn cleared_lines(&self) -> u32 {
        self.score / super::Game::POINTS_PER_LINE
    }
}
