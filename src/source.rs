use std::ops::Range;

use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::acceptance::{Subsystem, TrackQuality};

/// Reconstructed charged-particle track
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub id: i32,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    /// Fit quality, e.g. χ²/ndf
    #[serde(default)]
    pub quality: f64,
    /// Detector layers with a hit assigned to this track
    #[serde(default)]
    pub layers: Vec<u8>,
}

/// Particle-flow element
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct FlowElement {
    pub id: i32,
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

/// Calorimeter cluster with its energy and position
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct CaloCluster {
    pub id: i32,
    pub energy: f64,
    pub position: [f64; 3],
}

/// Calorimeter subsystems
#[derive(
    Deserialize,
    Serialize,
    Display,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub enum CaloKind {
    #[strum(to_string = "EM calorimeter")]
    Em,
    #[strum(to_string = "inner hadronic calorimeter")]
    InnerHcal,
    #[strum(to_string = "outer hadronic calorimeter")]
    OuterHcal,
}

/// Reconstructed primary vertex
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vertex {
    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Generator-level particle
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct GenParticle {
    pub barcode: i32,
    pub status: i32,
    pub pid: ParticleID,
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    /// Flagged by the generator as an outgoing parton of the hard scattering
    #[serde(default)]
    pub outgoing_parton: bool,
}

/// Generator status of stable final-state particles
pub const FINAL_STATE_STATUS: i32 = 1;

impl GenParticle {
    pub fn is_final_state(&self) -> bool {
        self.status == FINAL_STATE_STATUS
    }
}

/// Generator-level event record
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct GenEvent {
    #[serde(default)]
    pub vertex: Option<[f64; 3]>,
    pub particles: Vec<Option<GenParticle>>,
}

/// Access to the per-event objects provided by the host framework
///
/// `None` means the corresponding container is absent from the event.
/// Individual entries are `None` if the object is invalid.
pub trait EventData {
    fn tracks(&self) -> Option<&[Option<Track>]>;
    fn flow(&self) -> Option<&[Option<FlowElement>]>;
    fn vertices(&self) -> Option<&[Vertex]>;
    fn clusters(&self, kind: CaloKind) -> Option<&[Option<CaloCluster>]>;
    fn generator_event(&self) -> Option<&GenEvent>;

    /// The primary vertex
    ///
    /// This is the first entry of the vertex container.
    fn primary_vertex(&self) -> Result<Vertex, SourceError> {
        self.vertices()
            .ok_or(SourceError::MissingVertices)?
            .first()
            .copied()
            .ok_or(SourceError::EmptyVertices)
    }
}

impl<T: EventData + ?Sized> EventData for &T {
    fn tracks(&self) -> Option<&[Option<Track>]> {
        (**self).tracks()
    }

    fn flow(&self) -> Option<&[Option<FlowElement>]> {
        (**self).flow()
    }

    fn vertices(&self) -> Option<&[Vertex]> {
        (**self).vertices()
    }

    fn clusters(&self, kind: CaloKind) -> Option<&[Option<CaloCluster>]> {
        (**self).clusters(kind)
    }

    fn generator_event(&self) -> Option<&GenEvent> {
        (**self).generator_event()
    }
}

/// Plain in-memory event
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct RawEvent {
    pub tracks: Option<Vec<Option<Track>>>,
    pub flow: Option<Vec<Option<FlowElement>>>,
    pub vertices: Option<Vec<Vertex>>,
    pub em_clusters: Option<Vec<Option<CaloCluster>>>,
    pub inner_hcal_clusters: Option<Vec<Option<CaloCluster>>>,
    pub outer_hcal_clusters: Option<Vec<Option<CaloCluster>>>,
    pub generator: Option<GenEvent>,
}

impl EventData for RawEvent {
    fn tracks(&self) -> Option<&[Option<Track>]> {
        self.tracks.as_deref()
    }

    fn flow(&self) -> Option<&[Option<FlowElement>]> {
        self.flow.as_deref()
    }

    fn vertices(&self) -> Option<&[Vertex]> {
        self.vertices.as_deref()
    }

    fn clusters(&self, kind: CaloKind) -> Option<&[Option<CaloCluster>]> {
        match kind {
            CaloKind::Em => self.em_clusters.as_deref(),
            CaloKind::InnerHcal => self.inner_hcal_clusters.as_deref(),
            CaloKind::OuterHcal => self.outer_hcal_clusters.as_deref(),
        }
    }

    fn generator_event(&self) -> Option<&GenEvent> {
        self.generator.as_ref()
    }
}

/// A required per-event container is absent or unusable
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("Track container is missing, can't collect tracks")]
    MissingTracks,
    #[error("Particle-flow container is missing, can't collect particle-flow elements")]
    MissingFlow,
    #[error("Vertex container is missing")]
    MissingVertices,
    #[error("Vertex container is empty")]
    EmptyVertices,
    #[error("{0} cluster container is missing, can't collect clusters")]
    MissingClusters(CaloKind),
    #[error("Generator event is missing, can't collect particles")]
    MissingGeneratorEvent,
}

/// Computes track quality scores and hit counts
pub trait TrackEvaluator {
    fn evaluate(&self, track: &Track) -> TrackQuality;
}

/// Assignment of detector layers to tracking subsystems
///
/// The default evaluator counts the number of distinct layers with hits
/// in each subsystem and passes the fit quality through.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct LayerLayout {
    pub mvtx: Range<u8>,
    pub intt: Range<u8>,
    pub tpc: Range<u8>,
}

impl Default for LayerLayout {
    fn default() -> Self {
        Self {
            mvtx: 0..3,
            intt: 3..7,
            tpc: 7..55,
        }
    }
}

impl LayerLayout {
    fn layers(&self, subsystem: Subsystem) -> &Range<u8> {
        match subsystem {
            Subsystem::Mvtx => &self.mvtx,
            Subsystem::Intt => &self.intt,
            Subsystem::Tpc => &self.tpc,
        }
    }

    /// Number of distinct layers in `subsystem` with a hit
    pub fn count_layers(&self, layers: &[u8], subsystem: Subsystem) -> usize {
        let range = self.layers(subsystem);
        let mut hit = vec![false; range.len()];
        for &layer in layers {
            if range.contains(&layer) {
                hit[(layer - range.start) as usize] = true;
            }
        }
        hit.into_iter().filter(|h| *h).count()
    }
}

impl TrackEvaluator for LayerLayout {
    fn evaluate(&self, track: &Track) -> TrackQuality {
        let count = |s| self.count_layers(&track.layers, s);
        TrackQuality {
            quality: track.quality,
            nmvtx: count(Subsystem::Mvtx),
            nintt: count(Subsystem::Intt),
            ntpc: count(Subsystem::Tpc),
        }
    }
}

impl<F: Fn(&Track) -> TrackQuality> TrackEvaluator for F {
    fn evaluate(&self, track: &Track) -> TrackQuality {
        self(track)
    }
}

/// Vertex-corrected momentum of a calorimeter cluster
pub trait ClusterCorrection {
    fn corrected_momentum(&self, cluster: &CaloCluster, vertex: &Vertex) -> [f64; 3];
}

/// Points the cluster energy from the vertex to the cluster position
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct VertexDirection;

impl ClusterCorrection for VertexDirection {
    fn corrected_momentum(&self, cluster: &CaloCluster, vertex: &Vertex) -> [f64; 3] {
        let v = vertex.position();
        let dir: [f64; 3] = std::array::from_fn(|i| cluster.position[i] - v[i]);
        let norm = dir.iter().map(|d| d * d).sum::<f64>().sqrt();
        if norm == 0. {
            return [0.; 3];
        }
        dir.map(|d| cluster.energy * d / norm)
    }
}

impl<F: Fn(&CaloCluster, &Vertex) -> [f64; 3]> ClusterCorrection for F {
    fn corrected_momentum(&self, cluster: &CaloCluster, vertex: &Vertex) -> [f64; 3] {
        self(cluster, vertex)
    }
}
