//! Board scoring, placement search and feature encoding for evotris agents.
//!
//! The two training paths share this crate:
//!
//! - **Heuristic path** - [`placement_search`] enumerates every rotation × column
//!   placement of the active piece, simulates the drop on a cloned engine, and scores the
//!   resulting board with [`board_evaluator`] under a set of [`weights::HeuristicWeights`].
//! - **Neuro path** - [`feature_encoder`] turns an engine snapshot into a bounded feature
//!   vector for a neural controller.
//!
//! # Architecture
//!
//! ```text
//! PlacementSearch (pick rotation + column)
//!     ↓ uses
//! BoardEvaluator (weighted sum of board features)
//!     ↓ uses
//! BoardAnalysis (lazy column metrics)
//! ```
//!
//! Everything here is generic over [`evotris_engine::GameEngine`]; nothing depends on the
//! concrete engine.

pub mod board_analysis;
pub mod board_evaluator;
pub mod feature_encoder;
pub mod placement_search;
pub mod weights;
