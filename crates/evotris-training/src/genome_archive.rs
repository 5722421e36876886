//! Versioned JSON file holding a trained controller genome.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use evotris_evaluator::feature_encoder::FeatureEncoding;
use serde::{Deserialize, Serialize};

use crate::{
    neat::{Genome, GenomeError},
    neuro_trainer::NeuroParams,
};

/// Archive layout version written by this crate.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GenomeArchiveError {
    #[display("failed to read genome archive {}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[display("failed to write genome archive {}", path.display())]
    Write { path: PathBuf, source: io::Error },
    #[display("malformed genome archive {}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[display("unsupported genome archive version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[display("genome has {found} inputs but the {encoding} encoding produces {expected}")]
    InputShape {
        encoding: FeatureEncoding,
        found: usize,
        expected: usize,
    },
    #[display("genome has {found} outputs, expected {expected}")]
    OutputShape { found: usize, expected: usize },
    #[display("invalid genome")]
    InvalidGenome(GenomeError),
    #[display("no genome has been evaluated yet")]
    NoChampion,
}

/// A trained genome plus everything needed to run it again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeArchive {
    pub format_version: u32,
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub fitness: f64,
    pub encoding: FeatureEncoding,
    #[serde(default)]
    pub drop_burst: bool,
    pub genome: Genome,
}

#[derive(Deserialize)]
struct ArchiveHeader {
    format_version: u32,
}

impl GenomeArchive {
    #[must_use]
    pub fn new(name: &str, genome: Genome, encoding: FeatureEncoding, drop_burst: bool) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            name: name.to_owned(),
            trained_at: Utc::now(),
            fitness: genome.fitness().unwrap_or(0.0),
            encoding,
            drop_burst,
            genome,
        }
    }

    /// Replay parameters matching the archived controller.
    #[must_use]
    pub fn neuro_params(&self) -> NeuroParams {
        NeuroParams {
            encoding: self.encoding,
            drop_burst: self.drop_burst,
            ..NeuroParams::default()
        }
    }

    /// Checks the genome against the encoding and action layout it was saved with.
    pub fn validate(&self) -> Result<(), GenomeArchiveError> {
        if self.format_version != FORMAT_VERSION {
            return Err(GenomeArchiveError::Version {
                found: self.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let expected_inputs = self.encoding.input_len();
        if self.genome.num_inputs() != expected_inputs {
            return Err(GenomeArchiveError::InputShape {
                encoding: self.encoding,
                found: self.genome.num_inputs(),
                expected: expected_inputs,
            });
        }
        let expected_outputs = self.neuro_params().num_outputs();
        if self.genome.num_outputs() != expected_outputs {
            return Err(GenomeArchiveError::OutputShape {
                found: self.genome.num_outputs(),
                expected: expected_outputs,
            });
        }
        self.genome
            .validate()
            .map_err(GenomeArchiveError::InvalidGenome)
    }

    pub fn save<P>(&self, path: P) -> Result<(), GenomeArchiveError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let write_error = |source| GenomeArchiveError::Write {
            path: path.to_owned(),
            source,
        };
        let file = File::create(path).map_err(write_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| write_error(e.into()))?;
        writeln!(writer).map_err(write_error)?;
        writer.flush().map_err(write_error)?;
        Ok(())
    }

    /// Reads and validates an archive.
    ///
    /// The version is checked before the genome is parsed, so archives from a newer layout
    /// fail with [`GenomeArchiveError::Version`] rather than a parse error.
    pub fn load<P>(path: P) -> Result<Self, GenomeArchiveError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| GenomeArchiveError::Read {
            path: path.to_owned(),
            source,
        })?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| GenomeArchiveError::Parse {
                path: path.to_owned(),
                source,
            })?;

        let parse_error = |source| GenomeArchiveError::Parse {
            path: path.to_owned(),
            source,
        };
        let header = ArchiveHeader::deserialize(&value).map_err(parse_error)?;
        if header.format_version != FORMAT_VERSION {
            return Err(GenomeArchiveError::Version {
                found: header.format_version,
                expected: FORMAT_VERSION,
            });
        }
        let archive = Self::deserialize(value).map_err(parse_error)?;
        archive.validate()?;
        Ok(archive)
    }
}
