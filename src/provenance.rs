use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::four_vector::FourVector;
use crate::source::CaloKind;

/// Origin of a jet input
#[derive(
    Deserialize,
    Serialize,
    Display,
    EnumIter,
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
)]
pub enum SourceKind {
    #[strum(to_string = "track")]
    Track,
    #[strum(to_string = "particle flow")]
    Flow,
    #[strum(to_string = "EM cluster")]
    EmCluster,
    #[strum(to_string = "inner hadronic cluster")]
    InnerHcalCluster,
    #[strum(to_string = "outer hadronic cluster")]
    OuterHcalCluster,
    #[strum(to_string = "generator particle")]
    Particle,
}

impl From<CaloKind> for SourceKind {
    fn from(kind: CaloKind) -> Self {
        match kind {
            CaloKind::Em => SourceKind::EmCluster,
            CaloKind::InnerHcal => SourceKind::InnerHcalCluster,
            CaloKind::OuterHcal => SourceKind::OuterHcalCluster,
        }
    }
}

/// Source object a pooled particle was built from
///
/// The payload is the identifier of the object in its source
/// container. For generator particles this is the barcode.
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(tag = "kind", content = "id")]
pub enum Provenance {
    Track(i32),
    Flow(i32),
    EmCluster(i32),
    InnerHcalCluster(i32),
    OuterHcalCluster(i32),
    Particle(i32),
}

impl Provenance {
    pub fn new(kind: SourceKind, id: i32) -> Self {
        match kind {
            SourceKind::Track => Self::Track(id),
            SourceKind::Flow => Self::Flow(id),
            SourceKind::EmCluster => Self::EmCluster(id),
            SourceKind::InnerHcalCluster => Self::InnerHcalCluster(id),
            SourceKind::OuterHcalCluster => Self::OuterHcalCluster(id),
            SourceKind::Particle => Self::Particle(id),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Track(_) => SourceKind::Track,
            Self::Flow(_) => SourceKind::Flow,
            Self::EmCluster(_) => SourceKind::EmCluster,
            Self::InnerHcalCluster(_) => SourceKind::InnerHcalCluster,
            Self::OuterHcalCluster(_) => SourceKind::OuterHcalCluster,
            Self::Particle(_) => SourceKind::Particle,
        }
    }

    pub fn id(&self) -> i32 {
        match *self {
            Self::Track(id)
            | Self::Flow(id)
            | Self::EmCluster(id)
            | Self::InnerHcalCluster(id)
            | Self::OuterHcalCluster(id)
            | Self::Particle(id) => id,
        }
    }
}

/// Jet clustering input for a single event
///
/// Momenta and their provenance are stored in parallel, so the position
/// in the pool is the key to both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticlePool {
    momenta: Vec<FourVector>,
    provenance: Vec<Provenance>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a particle and return its index
    pub fn push(&mut self, p: FourVector, provenance: Provenance) -> usize {
        debug_assert_eq!(self.momenta.len(), self.provenance.len());
        let idx = self.momenta.len();
        self.momenta.push(p);
        self.provenance.push(provenance);
        idx
    }

    pub fn len(&self) -> usize {
        self.momenta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.momenta.is_empty()
    }

    pub fn momenta(&self) -> &[FourVector] {
        &self.momenta
    }

    pub fn momentum(&self, idx: usize) -> Option<&FourVector> {
        self.momenta.get(idx)
    }

    pub fn provenance(&self, idx: usize) -> Option<Provenance> {
        self.provenance.get(idx).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FourVector, Provenance)> {
        self.momenta.iter().zip(self.provenance.iter().copied())
    }

    /// Number of pooled particles from the given source
    pub fn count(&self, kind: SourceKind) -> usize {
        self.provenance.iter().filter(|p| p.kind() == kind).count()
    }

    pub fn clear(&mut self) {
        self.momenta.clear();
        self.provenance.clear();
    }
}
