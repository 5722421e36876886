use std::path::PathBuf;

use anyhow::Context as _;
use evotris_engine::{Game, PieceSeed};
use evotris_training::{genome_archive::GenomeArchive, neuro_trainer::play_genome};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TestGenomeArg {
    /// Path to the genome archive (JSON format)
    #[arg(long)]
    genome: PathBuf,
    /// Piece order seed
    #[arg(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &TestGenomeArg) -> anyhow::Result<()> {
    let TestGenomeArg { genome, seed } = arg;

    let archive = GenomeArchive::load(genome)
        .with_context(|| format!("Failed to load genome archive: {}", genome.display()))?;
    let seed = util::resolve_seed(*seed);
    let mut game = Game::with_seed(PieceSeed::from(seed));

    let report = play_genome(&mut game, &archive.genome, &archive.neuro_params());
    tracing::info!(
        name = %archive.name,
        encoding = %archive.encoding,
        seed,
        moves = report.moves,
        "game finished"
    );
    println!("score: {}", report.score);
    println!("moves: {}", report.moves);
    Ok(())
}
