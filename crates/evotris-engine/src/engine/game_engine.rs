use crate::core::{grid::Grid, piece::Piece};

use super::snapshot::EngineSnapshot;

/// Result of a single [`GameEngine::move_down`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum DropOutcome {
    /// The piece moved one row down.
    Moved,
    /// The piece could not move and was locked; the next piece spawned.
    Locked { cleared_lines: usize },
    /// The piece was locked but the next piece could not spawn.
    GameOver,
    /// The game was already over; nothing changed.
    Ignored,
}

/// The operations the training core needs from a falling-block game.
///
/// Engines are plain values: `clone()` yields an independent copy that can be advanced
/// without touching the original, which is how candidate placements are simulated.
///
/// Illegal moves (out of bounds, colliding, or after game over) are silently ignored.
pub trait GameEngine: Clone {
    /// Starts a fresh game: empty grid, new active piece, score 0.
    fn reset(&mut self);

    fn move_left(&mut self);

    fn move_right(&mut self);

    /// Rotates the active piece one step clockwise if the result fits.
    fn rotate(&mut self);

    /// Moves the active piece down, or locks it when it cannot move.
    ///
    /// Locking clears full rows, adds 10 points per row, and spawns the next piece. If the
    /// spawned piece does not fit, the game is over.
    fn move_down(&mut self) -> DropOutcome;

    /// Returns `true` if every cell of the active piece lies inside the grid.
    fn block_inside(&self) -> bool;

    fn grid(&self) -> &Grid;

    fn active_piece(&self) -> Piece;

    fn score(&self) -> u32;

    fn is_game_over(&self) -> bool;

    /// Overwrites the observable state with `snapshot`.
    fn restore(&mut self, snapshot: &EngineSnapshot);

    fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            grid: self.grid().clone(),
            piece: self.active_piece(),
            score: self.score(),
            game_over: self.is_game_over(),
        }
    }
}
