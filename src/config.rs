use std::{
    fmt,
    str::FromStr,
};

use log::warn;
use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::acceptance::{
    default_neutral_cuts, InvalidRange, KinematicCuts, ParticleCuts, TrackCuts,
    VertexCuts,
};
use crate::cluster::JetDefinition;
use crate::provenance::SourceKind;
use crate::source::LayerLayout;

/// Which particles enter the jets
#[derive(
    Deserialize, Serialize, Display, Debug, Copy, Clone, Default, Eq, PartialEq,
)]
pub enum JetType {
    /// Charged and neutral particles
    #[default]
    #[serde(alias = "all", alias = "full")]
    #[strum(to_string = "all")]
    All,
    /// Only charged particles
    #[serde(alias = "charged")]
    #[strum(to_string = "charged")]
    Charged,
}

/// Placeholder for an unknown jet type
#[derive(Debug, Clone, Error)]
pub struct UnknownJetType(String);

impl fmt::Display for UnknownJetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown jet type: {}", self.0)
    }
}

impl FromStr for JetType {
    type Err = UnknownJetType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" | "All" | "full" | "Full" => Ok(Self::All),
            "charged" | "Charged" => Ok(Self::Charged),
            _ => Err(UnknownJetType(s.to_string())),
        }
    }
}

/// Jet definition together with the jet type
#[derive(Deserialize, Serialize, Debug, Copy, Clone, Default, PartialEq)]
pub struct JetConfig {
    #[serde(flatten)]
    pub definition: JetDefinition,
    #[serde(default, rename = "type")]
    pub jet_type: JetType,
}

/// Detector-level inputs to collect
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSwitches {
    pub tracks: bool,
    pub flow: bool,
    pub em_clusters: bool,
    pub hcal_clusters: bool,
}

impl Default for SourceSwitches {
    fn default() -> Self {
        Self {
            tracks: true,
            flow: false,
            em_clusters: false,
            hcal_clusters: false,
        }
    }
}

impl SourceSwitches {
    pub fn is_enabled(&self, kind: SourceKind) -> bool {
        match kind {
            SourceKind::Track => self.tracks,
            SourceKind::Flow => self.flow,
            SourceKind::EmCluster => self.em_clusters,
            SourceKind::InnerHcalCluster | SourceKind::OuterHcalCluster => {
                self.hcal_clusters
            }
            SourceKind::Particle => false,
        }
    }

    pub fn any_calorimeter(&self) -> bool {
        self.em_clusters || self.hcal_clusters
    }
}

/// Acceptance for every kind of input
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Cuts {
    pub particle: ParticleCuts,
    pub track: TrackCuts,
    pub flow: KinematicCuts,
    pub em_cluster: KinematicCuts,
    pub hcal_cluster: KinematicCuts,
    pub vertex: VertexCuts,
}

impl Default for Cuts {
    fn default() -> Self {
        Self {
            particle: Default::default(),
            track: Default::default(),
            flow: default_neutral_cuts(),
            em_cluster: default_neutral_cuts(),
            hcal_cluster: default_neutral_cuts(),
            vertex: Default::default(),
        }
    }
}

/// Order in which detector-level inputs are collected
pub fn default_detector_order() -> Vec<SourceKind> {
    vec![
        SourceKind::Flow,
        SourceKind::Track,
        SourceKind::EmCluster,
        SourceKind::InnerHcalCluster,
        SourceKind::OuterHcalCluster,
    ]
}

/// Run configuration
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub jet: JetConfig,
    /// Whether generator-level information is available and truth jets
    /// should be built
    pub is_mc: bool,
    pub sources: SourceSwitches,
    /// Let calorimeter clusters behind the vertex keep a negative pz
    ///
    /// By default the longitudinal momentum of a cluster is always the
    /// positive root.
    pub signed_cluster_pz: bool,
    pub detector_order: Vec<SourceKind>,
    pub cuts: Cuts,
    pub layers: LayerLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jet: Default::default(),
            is_mc: true,
            sources: Default::default(),
            signed_cluster_pz: false,
            detector_order: default_detector_order(),
            cuts: Default::default(),
            layers: Default::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration")]
    Parse(#[from] serde_yaml::Error),
    #[error("Jet radius has to be positive, is {0}")]
    InvalidRadius(f64),
    #[error(transparent)]
    InvalidRange(#[from] InvalidRange),
    #[error("{0} is not a detector-level input")]
    NotDetectorInput(SourceKind),
    #[error("{0} appears more than once in the detector input order")]
    DuplicateInput(SourceKind),
}

impl Config {
    /// Parse and validate a YAML configuration
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    ///
    /// Suspicious but valid combinations only trigger warnings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let radius = self.jet.definition.radius;
        if !(radius > 0. && radius.is_finite()) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        self.cuts.particle.kinematics.validate("particle")?;
        self.cuts.track.validate()?;
        self.cuts.flow.validate("particle-flow")?;
        self.cuts.em_cluster.validate("EM cluster")?;
        self.cuts.hcal_cluster.validate("hadronic cluster")?;
        self.cuts.vertex.z.validate("vertex z")?;
        self.cuts.vertex.xy.validate("vertex xy")?;
        for (i, kind) in self.detector_order.iter().enumerate() {
            if *kind == SourceKind::Particle {
                return Err(ConfigError::NotDetectorInput(*kind));
            }
            if self.detector_order[..i].contains(kind) {
                return Err(ConfigError::DuplicateInput(*kind));
            }
        }
        if self.jet.jet_type == JetType::Charged {
            if self.sources.flow {
                warn!("Adding particle-flow elements to charged jets");
            }
            if self.sources.any_calorimeter() {
                warn!("Adding calorimeter clusters to charged jets");
            }
        }
        Ok(())
    }

    /// Acceptance for generator-level particles
    ///
    /// Charged jets only accept charged particles.
    pub fn particle_cuts(&self) -> ParticleCuts {
        let mut cuts = self.cuts.particle;
        if self.jet.jet_type == JetType::Charged {
            cuts.require_charge = true;
        }
        cuts
    }

    /// Enabled detector-level inputs in collection order
    pub fn detector_inputs(&self) -> impl Iterator<Item = SourceKind> + '_ {
        self.detector_order
            .iter()
            .copied()
            .filter(|kind| self.sources.is_enabled(*kind))
    }
}
