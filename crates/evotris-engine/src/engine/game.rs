use crate::core::{grid::Grid, piece::Piece};

use super::{
    game_engine::{DropOutcome, GameEngine},
    piece_buffer::{PieceBuffer, PieceSeed},
    snapshot::EngineSnapshot,
};

/// The concrete falling-block engine.
///
/// Rotation uses the fixed tables of [`PieceKind`](crate::PieceKind) with no wall kicks: a rotation that
/// would leave the grid or overlap a block is dropped.
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    piece: Piece,
    buffer: PieceBuffer,
    score: u32,
    game_over: bool,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub const POINTS_PER_LINE: u32 = 10;

    #[must_use]
    pub fn new() -> Self {
        Self::from_buffer(PieceBuffer::new())
    }

    /// Like [`Self::new`], but with a deterministic piece sequence.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::from_buffer(PieceBuffer::with_seed(seed))
    }

    fn from_buffer(mut buffer: PieceBuffer) -> Self {
        let piece = Piece::new(buffer.pop_next());
        Self {
            grid: Grid::EMPTY,
            piece,
            buffer,
            score: 0,
            game_over: false,
        }
    }

    /// Creates a game positioned at `snapshot`; later pieces come from `seed`.
    #[must_use]
    pub fn from_snapshot(snapshot: &EngineSnapshot, seed: PieceSeed) -> Self {
        let mut game = Self::with_seed(seed);
        game.restore(snapshot);
        game
    }

    /// Replaces the active piece without any bounds or collision check.
    pub fn set_active_piece_unchecked(&mut self, piece: Piece) {
        self.piece = piece;
    }

    fn try_set_piece(&mut self, piece: Piece) {
        if !self.game_over && self.grid.fits(&piece) {
            self.piece = piece;
        }
    }

    fn lock_piece(&mut self) -> DropOutcome {
        self.grid.fill_piece(&self.piece);
        let cleared_lines = self.grid.clear_full_rows();
        self.score += Self::POINTS_PER_LINE * u32::try_from(cleared_lines).unwrap_or(0);

        self.piece = Piece::new(self.buffer.pop_next());
        if !self.grid.fits(&self.piece) {
            self.game_over = true;
            return DropOutcome::GameOver;
        }
        DropOutcome::Locked { cleared_lines }
    }
}

impl GameEngine for Game {
    fn reset(&mut self) {
        self.grid = Grid::EMPTY;
        self.piece = Piece::new(self.buffer.pop_next());
        self.score = 0;
        self.game_over = false;
    }

    fn move_left(&mut self) {
        self.try_set_piece(self.piece.left());
    }

    fn move_right(&mut self) {
        self.try_set_piece(self.piece.right());
    }

    fn rotate(&mut self) {
        self.try_set_piece(self.piece.rotated());
    }

    fn move_down(&mut self) -> DropOutcome {
        if self.game_over {
            return DropOutcome::Ignored;
        }
        let below = self.piece.down();
        if self.grid.fits(&below) {
            self.piece = below;
            return DropOutcome::Moved;
        }
        self.lock_piece()
    }

    fn block_inside(&self) -> bool {
        self.grid.contains(&self.piece)
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn active_piece(&self) -> Piece {
        self.piece
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn restore(&mut self, snapshot: &EngineSnapshot) {
        self.grid = snapshot.grid.clone();
        self.piece = snapshot.piece;
        self.score = snapshot.score;
        self.game_over = snapshot.game_over;
    }
}
