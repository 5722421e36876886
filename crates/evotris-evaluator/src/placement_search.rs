//! Exhaustive one-piece lookahead for the heuristic path.
//!
//! For every rotation count in `0..4` and every target column in
//! `-column_margin .. NUM_COLS + column_margin`, the search:
//!
//! 1. clones the engine,
//! 2. rotates the clone's active piece that many times,
//! 3. shifts it toward the target column (shifts stop at walls and blocks),
//! 4. skips the candidate if the piece is not fully inside the grid,
//! 5. steps it down at most `drop_cap` times until it locks,
//! 6. skips the candidate if the game ended or the piece never locked,
//! 7. scores the clone's board with [`board_evaluator::score`](crate::board_evaluator::score).
//!
//! The first strictly better candidate wins, so ties keep the earliest placement in
//! rotation-major, column-ascending order.
//!
//! # Design: Greedy One-Step Lookahead
//!
//! Only the active piece is simulated. The next piece is not considered, which keeps a
//! search at a few dozen engine clones per move.
//!
//! # Usage
//!
//! ```
//! use evotris_engine::{Game, GameEngine as _, PieceSeed};
//! use evotris_evaluator::{
//!     placement_search::{PlacementSearch, apply_placement},
//!     weights::HeuristicWeights,
//! };
//!
//! let weights = HeuristicWeights { height: -0.5, holes: -0.5, bumpiness: -0.1, lines_cleared: 0.5 };
//! let search = PlacementSearch::default();
//! let mut game = Game::with_seed(PieceSeed::from(1));
//!
//! let placement = search.best_move(&game, &weights);
//! assert!(apply_placement(&mut game, placement));
//! ```

use evotris_engine::{DropOutcome, GameEngine, Grid};
use serde::{Deserialize, Serialize};

use crate::{board_evaluator, weights::HeuristicWeights};

/// Number of rotation counts tried per search.
pub const ROTATIONS: u8 = 4;

/// A target for the active piece: rotate `rotation` times, then shift to `column`.
///
/// `column` is compared with the piece's column offset, not its leftmost cell, so it may be
/// negative or beyond the right wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub rotation: u8,
    pub column: i32,
}

/// Tuning knobs of [`PlacementSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    /// Maximum `move_down` calls per simulated drop.
    pub drop_cap: usize,
    /// Columns tried beyond each wall.
    pub column_margin: i32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            drop_cap: 25,
            column_margin: 2,
        }
    }
}

/// Result of a full search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Best placement, or `Placement::default()` when no candidate survived.
    pub placement: Placement,
    /// Score of the best placement; `None` when no candidate survived.
    pub score: Option<f64>,
    /// Number of candidates that reached scoring.
    pub candidates: usize,
}

#[derive(Debug, Clone, Default)]
pub struct PlacementSearch {
    params: SearchParams,
}

impl PlacementSearch {
    #[must_use]
    pub fn new(params: SearchParams) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Returns the best placement for the active piece of `engine`.
    #[must_use]
    pub fn best_move<E>(&self, engine: &E, weights: &HeuristicWeights) -> Placement
    where
        E: GameEngine,
    {
        self.search(engine, weights).placement
    }

    #[must_use]
    pub fn search<E>(&self, engine: &E, weights: &HeuristicWeights) -> SearchOutcome
    where
        E: GameEngine,
    {
        let mut best: Option<(Placement, f64)> = None;
        let mut candidates = 0;

        for placement in self.placements() {
            let Some(landed) = self.simulate(engine, placement) else {
                continue;
            };
            candidates += 1;
            let score = board_evaluator::score(&landed.snapshot(), weights);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((placement, score));
            }
        }

        tracing::trace!(candidates, best = ?best, "placement search finished");
        SearchOutcome {
            placement: best.map(|(p, _)| p).unwrap_or_default(),
            score: best.map(|(_, s)| s),
            candidates,
        }
    }

    /// Every candidate placement in search order.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + use<> {
        let margin = self.params.column_margin;
        let num_cols = i32::try_from(Grid::NUM_COLS).unwrap_or(i32::MAX);
        (0..ROTATIONS).flat_map(move |rotation| {
            (-margin..num_cols + margin).map(move |column| Placement { rotation, column })
        })
    }

    /// Drops the active piece of a clone of `engine` at `placement`.
    ///
    /// Returns the clone once the piece has locked, or `None` if the piece ended up outside
    /// the grid, the game ended, or the drop cap ran out first.
    #[must_use]
    pub fn simulate<E>(&self, engine: &E, placement: Placement) -> Option<E>
    where
        E: GameEngine,
    {
        let mut sim = engine.clone();
        position_piece(&mut sim, placement);
        if !sim.block_inside() {
            return None;
        }
        for _ in 0..self.params.drop_cap {
            match sim.move_down() {
                DropOutcome::Moved => {}
                DropOutcome::Locked { .. } => return Some(sim),
                DropOutcome::GameOver | DropOutcome::Ignored => return None,
            }
        }
        None
    }
}

/// Rotates the active piece `placement.rotation` times, then shifts it toward
/// `placement.column`.
pub fn position_piece<E>(engine: &mut E, placement: Placement)
where
    E: GameEngine,
{
    for _ in 0..placement.rotation {
        engine.rotate();
    }
    let shift = placement.column - engine.active_piece().column_offset();
    for _ in 0..shift.unsigned_abs() {
        if shift < 0 {
            engine.move_left();
        } else {
            engine.move_right();
        }
    }
}

/// Commits `placement` to a live engine the way the search simulated it, then steps the
/// piece down once.
///
/// Returns whether the piece was inside the grid after positioning.
pub fn apply_placement<E>(engine: &mut E, placement: Placement) -> bool
where
    E: GameEngine,
{
    position_piece(engine, placement);
    let inside = engine.block_inside();
    engine.move_down();
    inside
}
