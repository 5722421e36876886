use std::path::PathBuf;

use evotris_engine::{Game, GameEngine as _, PieceSeed};
use evotris_evaluator::placement_search::{PlacementSearch, apply_placement};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Path to the heuristic model file (JSON format)
    #[arg(long)]
    model: PathBuf,
    /// Piece order seed
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after this many moves even if the game is not over
    #[arg(long, default_value_t = 1_000_000)]
    max_moves: usize,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        model,
        seed,
        max_moves,
    } = arg;

    let model = util::read_heuristic_model_file(model)?;
    let seed = util::resolve_seed(*seed);
    let mut game = Game::with_seed(PieceSeed::from(seed));
    let search = PlacementSearch::new(model.search);

    let mut moves = 0;
    while moves < *max_moves && !game.is_game_over() {
        let placement = search.best_move(&game, &model.weights);
        apply_placement(&mut game, placement);
        moves += 1;
    }

    let snapshot = game.snapshot();
    tracing::info!(
        model = %model.name,
        seed,
        moves,
        game_over = snapshot.game_over,
        "game finished"
    );
    println!("score: {}", snapshot.score);
    println!("lines: {}", snapshot.cleared_lines());
    Ok(())
}
