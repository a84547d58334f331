use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use audec::auto_decompress;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::source::RawEvent;

/// Reader for a single (potentially compressed) YAML event file
///
/// Each non-empty YAML document in the file is one event.
pub struct FileReader {
    path: PathBuf,
    documents: serde_yaml::Deserializer<'static>,
    nread: usize,
}

impl FileReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let path = path.as_ref().to_owned();
        let file = File::open(&path).map_err(|source| ReadError::Open {
            path: path.clone(),
            source,
        })?;
        debug!("Reading events from {path:?}");
        let reader = auto_decompress(BufReader::new(file));
        Ok(Self {
            path,
            documents: serde_yaml::Deserializer::from_reader(reader),
            nread: 0,
        })
    }
}

impl Iterator for FileReader {
    type Item = Result<RawEvent, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let document = self.documents.next()?;
            let idx = self.nread;
            self.nread += 1;
            let parse_error = |source| ReadError::Parse {
                path: self.path.clone(),
                event: idx,
                source,
            };
            let value = match serde_yaml::Value::deserialize(document) {
                Ok(value) => value,
                Err(err) => return Some(Err(parse_error(err))),
            };
            // blank files and trailing separators
            if value.is_null() {
                debug!("Skipping empty document {idx} in {:?}", self.path);
                continue;
            }
            return Some(RawEvent::deserialize(value).map_err(parse_error));
        }
    }
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to open {path:?}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read event {event} in {path:?}")]
    Parse {
        path: PathBuf,
        event: usize,
        source: serde_yaml::Error,
    },
}

/// Reads the events from several files one after the other
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CombinedReader<R> {
    readers: Vec<R>,
    current: usize,
}

impl<R> CombinedReader<R> {
    pub fn new(readers: Vec<R>) -> Self {
        Self {
            readers,
            current: 0,
        }
    }
}

impl<R: Iterator> Iterator for CombinedReader<R> {
    type Item = <R as Iterator>::Item;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(reader) = self.readers.get_mut(self.current) {
            if let Some(next) = reader.next() {
                return Some(next);
            }
            self.current += 1;
        }
        None
    }
}

impl CombinedReader<FileReader> {
    /// Construct a new reader reading from the files with the given names
    pub fn from_files<I, P>(files: I) -> Result<Self, ReadError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let readers: Result<_, _> =
            files.into_iter().map(FileReader::open).collect();
        Ok(Self::new(readers?))
    }
}
