//! Falling-block game engine used by the evotris training core.
//!
//! The training crates only talk to the game through the [`GameEngine`] trait: they move and
//! rotate the active piece, step it down, query [`GameEngine::block_inside`], and take value
//! [`EngineSnapshot`]s of the state. [`Game`] is the concrete engine shipped with the
//! workspace:
//!
//! - 20 × 10 [`Grid`] of [`Block`]s, rows indexed from the top
//! - seven [`PieceKind`]s with fixed rotation tables (no wall kicks)
//! - 7-bag piece order drawn from a seedable [`PieceBuffer`]
//! - 10 points per cleared line
//!
//! # Example
//!
//! ```
//! use evotris_engine::{Game, GameEngine as _, PieceSeed};
//!
//! let mut game = Game::with_seed(PieceSeed::from(7));
//! game.move_left();
//! game.rotate();
//! while !game.move_down().is_locked() {}
//! assert!(!game.is_game_over());
//! ```

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;
