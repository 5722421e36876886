use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use self::{
    auto_play::AutoPlayArg, test_genome::TestGenomeArg, train_heuristic::TrainHeuristicArg,
    train_neuro::TrainNeuroArg,
};

mod auto_play;
mod test_genome;
mod train_heuristic;
mod train_neuro;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log per-episode details (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Train heuristic weights using the genetic algorithm
    TrainHeuristic(#[clap(flatten)] TrainHeuristicArg),
    /// Play one game with saved heuristic weights
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Train a neural controller with neuroevolution
    TrainNeuro(#[clap(flatten)] TrainNeuroArg),
    /// Play one game with a saved genome archive
    TestGenome(#[clap(flatten)] TestGenomeArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose);
    match args.mode {
        Mode::TrainHeuristic(arg) => train_heuristic::run(&arg)?,
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::TrainNeuro(arg) => train_neuro::run(&arg)?,
        Mode::TestGenome(arg) => test_genome::run(&arg)?,
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
