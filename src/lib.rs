//! `corrjet` builds jets with full constituent provenance for collider
//! events, both from stable generator-level particles ("truth") and from
//! reconstructed detector objects (tracks, particle-flow elements, and
//! calorimeter clusters).
//!
//! # How to use
//!
//! Implement [source::EventData] for your event store, or use the plain
//! [source::RawEvent], and run the events through an
//! [driver::EventDriver]:
//!
//! ```no_run
//! use corrjet::prelude::*;
//!
//! let events: Vec<RawEvent> = Vec::new();
//! let pipeline = Pipeline::new(Config::default()).unwrap();
//! let mut driver = EventDriver::new(pipeline);
//! let mut records: Vec<EventRecord> = Vec::new();
//! driver.run(events, &mut records, &NO_PROGRESS).unwrap();
//! let qa = driver.finish();
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [driver] runs events through collection, clustering, and feature building
//! - [config] for the run configuration
//! - [collector] converts detector and generator objects into jet inputs
//! - [cluster] for sequential recombination jet clustering
//! - [record] for the output format
//! - [qa] for the quality assurance aggregates
//!

/// Kinematic and quality acceptance
pub mod acceptance;
/// Sequential recombination jet clustering
pub mod cluster;
/// Conversion of source objects into jet inputs
pub mod collector;
/// Output compression
pub mod compression;
/// Run configuration
pub mod config;
/// Event processing
pub mod driver;
/// Jet and constituent quantities
pub mod features;
/// Four-vector class
pub mod four_vector;
/// Most important exports
pub mod prelude;
/// Progress bar
pub mod progress_bar;
/// Jet inputs and their origin
pub mod provenance;
/// Quality assurance
pub mod qa;
/// Event readers
pub mod reader;
/// Output records
pub mod record;
/// Per-event input objects and external collaborators
pub mod source;
/// Particle species information
pub mod species;
/// Common traits
pub mod traits;
/// Record writer
pub mod writer;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
