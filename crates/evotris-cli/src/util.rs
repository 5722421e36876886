use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use evotris_training::config::TrainingConfig;

use crate::model::heuristic_model::HeuristicModel;

/// Writes `value` as pretty-printed JSON to `path`, or to stdout when no path is given.
pub fn save_json<T>(value: &T, path: Option<&Path>) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let target = path.map_or_else(|| "stdout".to_owned(), |path| path.display().to_string());
    let mut writer: Box<dyn Write> = match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {target}"))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("Failed to write JSON to {target}"))?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Failed to flush output to {target}"))?;
    Ok(())
}

pub fn read_heuristic_model_file(path: &Path) -> anyhow::Result<HeuristicModel> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open heuristic model file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse heuristic model file: {}", path.display()))
}

/// Loads the training configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<TrainingConfig> {
    match path {
        Some(path) => TrainingConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display())),
        None => Ok(TrainingConfig::default()),
    }
}

/// Returns `seed`, or a fresh random seed that is logged so the run can be repeated.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        let seed = rand::random();
        tracing::info!(seed, "no seed given, using a random one");
        seed
    })
}
