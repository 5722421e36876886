//! Game rules built on top of the core data structures.
//!
//! - [`GameEngine`] - The contract the training core drives (move, rotate, step down,
//!   snapshot, restore)
//! - [`Game`] - The concrete engine: grid, active piece, piece buffer, score
//! - [`EngineSnapshot`] - Value copy of the observable engine state
//! - [`PieceBuffer`] - 7-bag piece generation system
//! - [`PieceSeed`] - Seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. Create a [`Game`] (optionally with a [`PieceSeed`])
//! 2. Shift and rotate the active piece; illegal attempts are ignored
//! 3. Step the piece down with [`GameEngine::move_down`] until it locks
//! 4. Full rows are cleared (10 points each) and the next piece spawns
//! 5. Repeat until the spawned piece does not fit

pub use self::{game::*, game_engine::*, piece_buffer::*, snapshot::*};

mod game;
mod game_engine;
mod piece_buffer;
mod snapshot;
