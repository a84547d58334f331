use particle_id::ParticleID;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::provenance::{Provenance, SourceKind};

/// Value of scalar fields that are not set
pub const UNSET: f64 = -9999.;

/// Identifier of partons that are not set
pub const UNSET_ID: i32 = -9999;

/// Generator-level or detector-level processing
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
pub enum View {
    #[strum(to_string = "truth")]
    Truth,
    #[strum(to_string = "detector")]
    Detector,
}

/// Jet constituent with its derived quantities
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct ConstituentRecord {
    /// Source object the constituent was built from
    pub provenance: Provenance,
    /// Squared constituent momentum over jet momentum
    pub z: f64,
    /// Distance to the jet axis in the η-φ plane
    pub dr: f64,
    pub e: f64,
    /// Constituent transverse momentum
    pub jt: f64,
    pub eta: f64,
    pub phi: f64,
}

/// Jet with its derived quantities and constituents
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct JetRecord {
    /// Position in the clustering output
    pub id: usize,
    pub e: f64,
    pub pt: f64,
    pub eta: f64,
    /// Azimuth in (-π, π]
    pub phi: f64,
    pub area: f64,
    pub constituents: Vec<ConstituentRecord>,
}

impl JetRecord {
    pub fn num_constituents(&self) -> usize {
        self.constituents.len()
    }
}

/// Outgoing parton of the hard scattering
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct Parton {
    pub id: ParticleID,
    pub momentum: [f64; 3],
}

/// Event-level quantities of the generator-level view
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct TruthScalars {
    pub vertex: [f64; 3],
    /// Summed energy of all final-state particles
    pub sum_energy: f64,
    /// Number of charged final-state particles
    pub num_charged: usize,
    pub partons: [Option<Parton>; 2],
}

/// Event-level quantities of the detector-level view
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct DetectorScalars {
    pub vertex: [f64; 3],
    /// Summed energy of all EM calorimeter clusters
    pub sum_ecal: f64,
    /// Summed energy of all hadronic calorimeter clusters
    pub sum_hcal: f64,
    pub num_tracks: usize,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "view")]
pub enum EventScalars {
    Truth(TruthScalars),
    Detector(DetectorScalars),
}

impl EventScalars {
    pub fn view(&self) -> View {
        match self {
            Self::Truth(_) => View::Truth,
            Self::Detector(_) => View::Detector,
        }
    }

    pub fn vertex(&self) -> [f64; 3] {
        match self {
            Self::Truth(s) => s.vertex,
            Self::Detector(s) => s.vertex,
        }
    }
}

/// All output for one view of one event
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EventRecord {
    /// Position of the event in the input
    pub event: usize,
    pub scalars: EventScalars,
    pub jets: Vec<JetRecord>,
}

impl EventRecord {
    pub fn view(&self) -> View {
        self.scalars.view()
    }

    pub fn num_jets(&self) -> usize {
        self.jets.len()
    }

    /// Flatten into parallel per-jet and nested per-constituent columns
    pub fn to_columns(&self) -> JetColumns {
        let mut cols = JetColumns::default();
        for jet in &self.jets {
            cols.num_cst.push(jet.num_constituents());
            cols.id.push(jet.id);
            cols.e.push(jet.e);
            cols.pt.push(jet.pt);
            cols.eta.push(jet.eta);
            cols.phi.push(jet.phi);
            cols.area.push(jet.area);
            let csts = &jet.constituents;
            cols.cst_kind.push(csts.iter().map(|c| c.provenance.kind()).collect());
            cols.cst_id.push(csts.iter().map(|c| c.provenance.id()).collect());
            cols.cst_z.push(csts.iter().map(|c| c.z).collect());
            cols.cst_dr.push(csts.iter().map(|c| c.dr).collect());
            cols.cst_e.push(csts.iter().map(|c| c.e).collect());
            cols.cst_jt.push(csts.iter().map(|c| c.jt).collect());
            cols.cst_eta.push(csts.iter().map(|c| c.eta).collect());
            cols.cst_phi.push(csts.iter().map(|c| c.phi).collect());
        }
        cols
    }

    /// Parton species and momenta, with unset partons filled with sentinels
    pub fn parton_columns(&self) -> ([i32; 2], [[f64; 3]; 2]) {
        let mut ids = [UNSET_ID; 2];
        let mut momenta = [[UNSET; 3]; 2];
        if let EventScalars::Truth(truth) = &self.scalars {
            for (i, parton) in truth.partons.iter().enumerate() {
                if let Some(parton) = parton {
                    ids[i] = parton.id.id();
                    momenta[i] = parton.momentum;
                }
            }
        }
        (ids, momenta)
    }
}

/// Columnar layout of the jets in an [EventRecord]
///
/// Jet-level columns are indexed by jet. Constituent-level columns are
/// indexed by jet first and constituent second.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct JetColumns {
    pub num_cst: Vec<usize>,
    pub id: Vec<usize>,
    pub e: Vec<f64>,
    pub pt: Vec<f64>,
    pub eta: Vec<f64>,
    pub phi: Vec<f64>,
    pub area: Vec<f64>,
    pub cst_kind: Vec<Vec<SourceKind>>,
    pub cst_id: Vec<Vec<i32>>,
    pub cst_z: Vec<Vec<f64>>,
    pub cst_dr: Vec<Vec<f64>>,
    pub cst_e: Vec<Vec<f64>>,
    pub cst_jt: Vec<Vec<f64>>,
    pub cst_eta: Vec<Vec<f64>>,
    pub cst_phi: Vec<Vec<f64>>,
}
