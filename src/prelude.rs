pub use crate::{
    cluster::{JetAlgorithm, JetDefinition, RecombinationScheme},
    config::{Config, JetType},
    driver::{EventDriver, Pipeline, Stage},
    progress_bar::{Progress, ProgressBar, NO_PROGRESS},
    qa::{ObjectKind, QaAggregator},
    reader::CombinedReader,
    record::{EventRecord, View},
    source::{EventData, RawEvent},
    traits::WriteRecord,
    writer::{FileWriter, OutputFormat},
};
