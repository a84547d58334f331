use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    compression::{compress_writer, Compression},
    record::{EventRecord, EventScalars, JetColumns, View},
    traits::WriteRecord,
};

/// Supported output layouts
#[derive(
    Deserialize,
    Serialize,
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// One YAML document per record with nested jets and constituents
    #[default]
    Records,
    /// One YAML document per record with flat per-jet columns and
    /// per-jet constituent columns
    Columns,
}

/// Settings for a record output file
#[derive(Debug, Clone, TypedBuilder)]
pub struct FileWriter {
    filename: PathBuf,
    #[builder(default)]
    format: OutputFormat,
    #[builder(default)]
    compression: Option<Compression>,
}

impl FileWriter {
    /// Create the output file
    pub fn open(&self) -> Result<RecordWriter<Box<dyn Write>>, WriteError> {
        let file = File::create(&self.filename).map_err(|source| {
            WriteError::Create {
                path: self.filename.clone(),
                source,
            }
        })?;
        debug!("Writing {} to {:?}", self.format, self.filename);
        if let Some(compression) = self.compression {
            if !has_extension(&self.filename, compression) {
                warn!(
                    "Output file {:?} is {compression:?}-compressed but does not end in .{}",
                    self.filename,
                    compression.extension()
                );
            }
        }
        let out = compress_writer(BufWriter::new(file), self.compression)
            .map_err(|source| WriteError::Create {
                path: self.filename.clone(),
                source,
            })?;
        Ok(RecordWriter::new(out, self.format))
    }
}

fn has_extension(path: &Path, compression: Compression) -> bool {
    path.extension()
        .map_or(false, |ext| ext == compression.extension())
}

/// Writes records as a stream of YAML documents
#[derive(Debug)]
pub struct RecordWriter<W> {
    out: W,
    format: OutputFormat,
    nwritten: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            nwritten: 0,
        }
    }

    pub fn nwritten(&self) -> usize {
        self.nwritten
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Serialize)]
struct ColumnRecord {
    event: usize,
    view: View,
    vertex: [f64; 3],
    #[serde(flatten)]
    scalars: ColumnScalars,
    num_jets: usize,
    jets: JetColumns,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ColumnScalars {
    Truth {
        sum_energy: f64,
        num_charged: usize,
        parton_id: [i32; 2],
        parton_momentum: [[f64; 3]; 2],
    },
    Detector {
        sum_ecal: f64,
        sum_hcal: f64,
        num_tracks: usize,
    },
}

impl From<&EventRecord> for ColumnRecord {
    fn from(record: &EventRecord) -> Self {
        let scalars = match &record.scalars {
            EventScalars::Truth(truth) => {
                let (parton_id, parton_momentum) = record.parton_columns();
                ColumnScalars::Truth {
                    sum_energy: truth.sum_energy,
                    num_charged: truth.num_charged,
                    parton_id,
                    parton_momentum,
                }
            }
            EventScalars::Detector(det) => ColumnScalars::Detector {
                sum_ecal: det.sum_ecal,
                sum_hcal: det.sum_hcal,
                num_tracks: det.num_tracks,
            },
        };
        Self {
            event: record.event,
            view: record.view(),
            vertex: record.scalars.vertex(),
            scalars,
            num_jets: record.num_jets(),
            jets: record.to_columns(),
        }
    }
}

impl<W: Write> WriteRecord for RecordWriter<W> {
    type Error = WriteError;

    fn write_record(&mut self, record: &EventRecord) -> Result<(), Self::Error> {
        self.out.write_all(b"---\n")?;
        match self.format {
            OutputFormat::Records => serde_yaml::to_writer(&mut self.out, record)?,
            OutputFormat::Columns => {
                serde_yaml::to_writer(&mut self.out, &ColumnRecord::from(record))?
            }
        }
        self.nwritten += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.out.flush()?;
        debug!("Wrote {} records", self.nwritten);
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create {path:?}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write record")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialise record")]
    Serialise(#[from] serde_yaml::Error),
}
