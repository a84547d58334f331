use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::four_vector::FourVector;

/// Closed interval `[min, max]`
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `x` lies inside the interval, including both boundaries
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Check that the interval is not empty
    pub fn validate(&self, name: &str) -> Result<(), InvalidRange> {
        if self.min <= self.max {
            Ok(())
        } else {
            Err(InvalidRange {
                name: name.to_owned(),
                min: self.min,
                max: self.max,
            })
        }
    }
}

impl From<(f64, f64)> for Range {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid {name} range: minimum {min} is larger than maximum {max}")]
pub struct InvalidRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

/// Transverse momentum and pseudorapidity acceptance
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct KinematicCuts {
    pub pt: Range,
    pub eta: Range,
}

impl KinematicCuts {
    pub fn accepts(&self, p: &FourVector) -> bool {
        self.accepts_pt_eta(p.pt().raw(), p.eta().raw())
    }

    pub fn accepts_pt_eta(&self, pt: f64, eta: f64) -> bool {
        self.pt.contains(pt) && self.eta.contains(eta)
    }

    pub fn validate(&self, name: &str) -> Result<(), InvalidRange> {
        self.pt.validate(&format!("{name} pt"))?;
        self.eta.validate(&format!("{name} eta"))
    }
}

/// Tracking subsystems contributing hits to a track
#[derive(
    Deserialize, Serialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub enum Subsystem {
    /// Innermost vertexing layers
    Mvtx,
    /// Intermediate silicon layers
    Intt,
    /// Outer gas-tracking layers
    Tpc,
}

impl Subsystem {
    pub const ALL: [Subsystem; 3] = [Subsystem::Mvtx, Subsystem::Intt, Subsystem::Tpc];
}

/// Quality summary of a track as provided by a track evaluator
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrackQuality {
    pub quality: f64,
    pub nmvtx: usize,
    pub nintt: usize,
    pub ntpc: usize,
}

impl TrackQuality {
    pub fn hits(&self, subsystem: Subsystem) -> usize {
        match subsystem {
            Subsystem::Mvtx => self.nmvtx,
            Subsystem::Intt => self.nintt,
            Subsystem::Tpc => self.ntpc,
        }
    }
}

/// Track acceptance
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct TrackCuts {
    #[serde(flatten)]
    pub kinematics: KinematicCuts,
    pub quality: Range,
    pub nmvtx: Range,
    pub nintt: Range,
    pub ntpc: Range,
}

impl TrackCuts {
    pub fn accepts(&self, p: &FourVector, q: &TrackQuality) -> bool {
        self.kinematics.accepts(p)
            && self.quality.contains(q.quality)
            && Subsystem::ALL
                .iter()
                .all(|&s| self.hits(s).contains(q.hits(s) as f64))
    }

    pub fn hits(&self, subsystem: Subsystem) -> &Range {
        match subsystem {
            Subsystem::Mvtx => &self.nmvtx,
            Subsystem::Intt => &self.nintt,
            Subsystem::Tpc => &self.ntpc,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidRange> {
        self.kinematics.validate("track")?;
        self.quality.validate("track quality")?;
        self.nmvtx.validate("track MVTX hit")?;
        self.nintt.validate("track INTT hit")?;
        self.ntpc.validate("track TPC hit")
    }
}

impl Default for TrackCuts {
    fn default() -> Self {
        Self {
            kinematics: KinematicCuts {
                pt: Range::new(0.1, 100.),
                eta: Range::new(-1.1, 1.1),
            },
            quality: Range::new(-1., 10.),
            nmvtx: Range::new(2., 100.),
            nintt: Range::new(1., 100.),
            ntpc: Range::new(35., 100.),
        }
    }
}

/// Generator-level particle acceptance
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct ParticleCuts {
    #[serde(flatten)]
    pub kinematics: KinematicCuts,
    /// Only accept particles with nonzero electric charge
    #[serde(default)]
    pub require_charge: bool,
    /// Reject particles flagged as outgoing hard-scattering partons
    #[serde(default = "default_true")]
    pub exclude_outgoing_partons: bool,
}

fn default_true() -> bool {
    true
}

impl ParticleCuts {
    /// `charge` is `None` if the species is unknown, which counts as neutral
    pub fn accepts(
        &self,
        p: &FourVector,
        charge: Option<f64>,
        is_outgoing_parton: bool,
    ) -> bool {
        if self.exclude_outgoing_partons && is_outgoing_parton {
            return false;
        }
        if self.require_charge && charge.unwrap_or(0.) == 0. {
            return false;
        }
        self.kinematics.accepts(p)
    }
}

impl Default for ParticleCuts {
    fn default() -> Self {
        Self {
            kinematics: KinematicCuts {
                pt: Range::new(0.1, 9999.),
                eta: Range::new(-1.1, 1.1),
            },
            require_charge: false,
            exclude_outgoing_partons: true,
        }
    }
}

/// Default acceptance for particle-flow elements and calorimeter clusters
pub fn default_neutral_cuts() -> KinematicCuts {
    KinematicCuts {
        pt: Range::new(0., 9999.),
        eta: Range::new(-1.1, 1.1),
    }
}

/// Event-level primary vertex acceptance
#[derive(Deserialize, Serialize, Copy, Clone, Debug, PartialEq)]
pub struct VertexCuts {
    pub z: Range,
    pub xy: Range,
}

impl VertexCuts {
    pub fn accepts(&self, [x, y, z]: [f64; 3]) -> bool {
        self.z.contains(z) && self.xy.contains(x) && self.xy.contains(y)
    }
}

impl Default for VertexCuts {
    fn default() -> Self {
        Self {
            z: Range::new(-10., 10.),
            xy: Range::new(-5., 5.),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn momentum_at(pt: f64, eta: f64) -> FourVector {
        FourVector::from_pt_rap_phi(pt, eta, 0.)
    }

    #[test]
    fn closed_intervals() {
        let r = Range::new(1., 2.);
        assert!(r.contains(1.));
        assert!(r.contains(2.));
        assert!(!r.contains(1. - f64::EPSILON));
        assert!(!r.contains(2. + 2. * f64::EPSILON));
        assert!(Range::new(2., 1.).validate("test").is_err());
        assert!(Range::new(1., 1.).validate("test").is_ok());
    }

    #[test]
    fn track_quality() {
        let cuts = TrackCuts::default();
        let p = momentum_at(1., 0.);
        let good = TrackQuality {
            quality: 1.,
            nmvtx: 3,
            nintt: 2,
            ntpc: 40,
        };
        assert!(cuts.accepts(&p, &good));

        let bad_quality = TrackQuality { quality: -1.5, ..good };
        assert!(!cuts.accepts(&p, &bad_quality));

        let edge_quality = TrackQuality { quality: -1., ..good };
        assert!(cuts.accepts(&p, &edge_quality));

        let few_tpc_hits = TrackQuality { ntpc: 34, ..good };
        assert!(!cuts.accepts(&p, &few_tpc_hits));

        let edge_tpc_hits = TrackQuality { ntpc: 35, ..good };
        assert!(cuts.accepts(&p, &edge_tpc_hits));

        assert!(!cuts.accepts(&momentum_at(0.05, 0.), &good));
        assert!(!cuts.accepts(&momentum_at(1., 1.5), &good));
    }

    #[test]
    fn particle_charge() {
        let p = momentum_at(1., 0.);
        let mut cuts = ParticleCuts::default();
        assert!(cuts.accepts(&p, None, false));
        assert!(!cuts.accepts(&p, Some(1.), true));

        cuts.require_charge = true;
        assert!(cuts.accepts(&p, Some(-1.), false));
        assert!(!cuts.accepts(&p, Some(0.), false));
        // unknown species are treated as neutral
        assert!(!cuts.accepts(&p, None, false));

        cuts.exclude_outgoing_partons = false;
        assert!(cuts.accepts(&p, Some(2. / 3.), true));
    }

    #[test]
    fn vertex() {
        let cuts = VertexCuts::default();
        assert!(cuts.accepts([0., 0., 10.]));
        assert!(!cuts.accepts([0., 0., 10.5]));
        assert!(!cuts.accepts([5.1, 0., 0.]));
    }
}
