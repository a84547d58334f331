use std::f64::consts::PI;

use jetty::PseudoJet;
use noisy_float::prelude::*;
use serde::{Deserialize, Serialize};

/// Rapidity assigned to objects moving exactly along the beam axis
pub const MAX_RAPIDITY: f64 = 1e5;

/// Charged pion mass in GeV, used as mass hypothesis for tracks
pub const PION_MASS: f64 = 0.13957;

/// A basic four-vector
///
/// The zero component is the energy/time component. The remainder are
/// the spatial components
#[derive(
    Deserialize,
    Serialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Debug,
    Clone,
    Copy,
    Default,
)]
pub struct FourVector {
    pt: N64,
    p: [N64; 4],
}

impl FourVector {
    /// Construct a new four-vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct from energy and momentum components
    ///
    /// Returns `None` if any component is not finite.
    pub fn try_from_components(
        e: f64,
        px: f64,
        py: f64,
        pz: f64,
    ) -> Option<Self> {
        if [e, px, py, pz].iter().all(|c| c.is_finite()) {
            Some([n64(e), n64(px), n64(py), n64(pz)].into())
        } else {
            None
        }
    }

    /// Four-vector of a particle with the given 3-momentum and mass
    pub fn with_mass(px: f64, py: f64, pz: f64, m: f64) -> Option<Self> {
        let e = (px * px + py * py + pz * pz + m * m).sqrt();
        Self::try_from_components(e, px, py, pz)
    }

    /// Massless four-vector from transverse momentum, rapidity, and azimuth
    pub fn from_pt_rap_phi(pt: f64, rap: f64, phi: f64) -> Self {
        let (px, py) = (pt * phi.cos(), pt * phi.sin());
        let (pz, e) = (pt * rap.sinh(), pt * rap.cosh());
        [n64(e), n64(px), n64(py), n64(pz)].into()
    }

    /// Energy
    pub fn e(&self) -> N64 {
        self.p[0]
    }

    pub fn px(&self) -> N64 {
        self.p[1]
    }

    pub fn py(&self) -> N64 {
        self.p[2]
    }

    pub fn pz(&self) -> N64 {
        self.p[3]
    }

    /// The euclidean norm \sqrt{\sum v_\mu^2} with \mu = 0,1,2,3
    pub fn euclid_norm(&self) -> N64 {
        self.euclid_norm_sq().sqrt()
    }
    /// The square \sum v_\mu^2 with \mu = 0,1,2,3 of the euclidean norm
    pub fn euclid_norm_sq(&self) -> N64 {
        self.p.iter().map(|e| *e * *e).sum()
    }

    /// The spatial norm \sqrt{\sum v_i^2} with i = 1,2,3
    pub fn spatial_norm(&self) -> N64 {
        self.spatial_norm_sq().sqrt()
    }

    /// The square \sum v_i^2 with i = 1,2,3 of the spatial norm
    pub fn spatial_norm_sq(&self) -> N64 {
        self.p.iter().skip(1).map(|e| *e * *e).sum()
    }

    /// The scalar transverse momentum
    pub fn pt(&self) -> N64 {
        self.pt
    }

    /// The square of the transverse momentum
    pub fn pt2(&self) -> N64 {
        self.p[1] * self.p[1] + self.p[2] * self.p[2]
    }

    const fn len() -> usize {
        4
    }

    fn update_pt(&mut self) {
        self.pt = self.pt2().sqrt();
    }

    /// The invariant mass \sqrt{v_0^2 - \sum v_i^2} with i = 1,2,3
    pub fn m(&self) -> N64 {
        self.m_sq().sqrt()
    }

    /// The invariant mass square v_0^2 - \sum v_i^2 with i = 1,2,3
    pub fn m_sq(&self) -> N64 {
        self.p[0] * self.p[0] - self.spatial_norm_sq()
    }

    /// Azimuthal angle in (-π, π]
    pub fn phi_std(&self) -> N64 {
        let phi = self.py().raw().atan2(self.px().raw());
        if phi <= -PI {
            n64(PI)
        } else {
            n64(phi)
        }
    }

    /// Azimuthal angle in [0, 2π)
    pub fn phi(&self) -> N64 {
        let phi = self.phi_std().raw();
        if phi < 0. {
            n64(phi + 2. * PI)
        } else {
            n64(phi)
        }
    }

    /// Pseudorapidity
    ///
    /// Momenta along the beam axis get pseudorapidity ±`MAX_RAPIDITY`
    pub fn eta(&self) -> N64 {
        let pt = self.pt().raw();
        let pz = self.pz().raw();
        if pt == 0. {
            return if pz >= 0. {
                n64(MAX_RAPIDITY + pz)
            } else {
                n64(-MAX_RAPIDITY + pz)
            };
        }
        n64((pz / pt).asinh())
    }

    /// Rapidity
    ///
    /// Massless momenta along the beam axis get rapidity ±(`MAX_RAPIDITY` + |p_z|)
    pub fn rap(&self) -> N64 {
        let e = self.e().raw();
        let pz = self.pz().raw();
        let pt2 = self.pt2().raw();
        if e == pz.abs() && pt2 == 0. {
            let max_rap = MAX_RAPIDITY + pz.abs();
            return if pz >= 0. { n64(max_rap) } else { n64(-max_rap) };
        }
        let m2 = f64::max(self.m_sq().raw(), 0.);
        let e_plus_pz = e + pz.abs();
        let rap = 0.5 * ((pt2 + m2) / (e_plus_pz * e_plus_pz)).ln();
        if pz > 0. {
            n64(-rap)
        } else {
            n64(rap)
        }
    }

    /// Transverse energy E p_t / |p|
    pub fn et(&self) -> N64 {
        let p = self.spatial_norm();
        if p == 0. {
            n64(0.)
        } else {
            self.e() * self.pt() / p
        }
    }
}

/// Azimuthal distance in [0, π]
pub fn delta_phi(phi1: f64, phi2: f64) -> f64 {
    let dphi = (phi1 - phi2).abs();
    if dphi > PI {
        2. * PI - dphi
    } else {
        dphi
    }
}

impl std::convert::From<[N64; 4]> for FourVector {
    fn from(p: [N64; 4]) -> FourVector {
        let mut res = FourVector {
            p,
            pt: std::default::Default::default(),
        };
        res.update_pt();
        res
    }
}

impl std::ops::Index<usize> for FourVector {
    type Output = N64;

    fn index(&self, i: usize) -> &Self::Output {
        &self.p[i]
    }
}

impl std::ops::AddAssign for FourVector {
    fn add_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] += rhs[i]
        }
        self.update_pt();
    }
}

impl std::ops::SubAssign for FourVector {
    fn sub_assign(&mut self, rhs: FourVector) {
        for i in 0..Self::len() {
            self.p[i] -= rhs[i]
        }
        self.update_pt();
    }
}

impl std::ops::Add for FourVector {
    type Output = Self;

    fn add(mut self, rhs: FourVector) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::ops::Sub for FourVector {
    type Output = Self;

    fn sub(mut self, rhs: FourVector) -> Self::Output {
        self -= rhs;
        self
    }
}

impl std::iter::Sum for FourVector {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(FourVector::new(), |acc, p| acc + p)
    }
}

impl From<PseudoJet> for FourVector {
    fn from(p: PseudoJet) -> Self {
        [p.e(), p.px(), p.py(), p.pz()].into()
    }
}

impl From<FourVector> for PseudoJet {
    fn from(p: FourVector) -> Self {
        (&p).into()
    }
}

impl From<&FourVector> for PseudoJet {
    fn from(p: &FourVector) -> Self {
        [p[0], p[1], p[2], p[3]].into()
    }
}
