use std::{
    f64::consts::PI,
    fmt,
    str::FromStr,
};

use log::{debug, trace, warn};
use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;
use thiserror::Error;

use crate::four_vector::{delta_phi, FourVector};

/// Jet clustering algorithms
#[derive(
    Deserialize, Serialize, Display, Debug, Copy, Clone, Default, Eq, PartialEq,
)]
pub enum JetAlgorithm {
    /// The [anti-kt](https://arxiv.org/abs/0802.1189) algorithm
    #[default]
    #[serde(alias = "anti-kt", alias = "antikt", alias = "anti_kt")]
    #[strum(to_string = "anti-kt")]
    AntiKt,
    /// The [Cambridge](https://arxiv.org/abs/hep-ph/9707323)/[Aachen](https://arxiv.org/abs/hep-ph/9907280) algorithm
    #[serde(
        alias = "Cambridge/Aachen",
        alias = "cambridge-aachen",
        alias = "cambridge_aachen",
        alias = "CA"
    )]
    #[strum(to_string = "Cambridge/Aachen")]
    CambridgeAachen,
    /// The [kt](https://arxiv.org/abs/hep-ph/9305266) algorithm
    #[serde(alias = "kt")]
    #[strum(to_string = "kt")]
    Kt,
}

impl JetAlgorithm {
    /// Exponent of the transverse momentum in the distance measure
    pub fn exponent(&self) -> i32 {
        match self {
            Self::AntiKt => -1,
            Self::CambridgeAachen => 0,
            Self::Kt => 1,
        }
    }

    /// Algorithm from its numeric code
    ///
    /// 0 is anti-kt, 1 is kt, 2 is Cambridge/Aachen. Unknown codes fall
    /// back to anti-kt.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::AntiKt,
            1 => Self::Kt,
            2 => Self::CambridgeAachen,
            _ => {
                warn!("Unknown jet algorithm code {code}, using anti-kt");
                Self::AntiKt
            }
        }
    }
}

/// Placeholder for an unknown jet algorithm
#[derive(Debug, Clone, Error)]
pub struct UnknownJetAlgorithm(String);

impl fmt::Display for UnknownJetAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown jet algorithm: {}", self.0)
    }
}

impl FromStr for JetAlgorithm {
    type Err = UnknownJetAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anti_kt" | "antikt" | "anti-kt" => Ok(Self::AntiKt),
            "kt" => Ok(Self::Kt),
            "Cambridge/Aachen" | "Cambridge-Aachen" | "Cambridge_Aachen"
            | "cambridge/aachen" | "cambridge-aachen" | "cambridge_aachen"
            | "CA" | "ca" => Ok(Self::CambridgeAachen),
            _ => Err(UnknownJetAlgorithm(s.to_string())),
        }
    }
}

/// How four-momenta are combined when two objects are merged
#[derive(
    Deserialize, Serialize, Display, Debug, Copy, Clone, Default, Eq, PartialEq,
)]
pub enum RecombinationScheme {
    /// Four-vector addition
    #[serde(alias = "e")]
    #[strum(to_string = "E")]
    E,
    /// Massless inputs, rapidity and azimuth weighted with pt
    #[default]
    #[serde(alias = "pt")]
    #[strum(to_string = "pt")]
    Pt,
    /// Massless inputs, rapidity and azimuth weighted with pt²
    #[serde(alias = "pt2")]
    #[strum(to_string = "pt2")]
    Pt2,
    /// Like `Pt`, but inputs are made massless by rescaling the momentum
    #[serde(alias = "et")]
    #[strum(to_string = "Et")]
    Et,
    /// Like `Pt2`, but inputs are made massless by rescaling the momentum
    #[serde(alias = "et2")]
    #[strum(to_string = "Et2")]
    Et2,
}

impl RecombinationScheme {
    /// Scheme from its numeric code
    ///
    /// The codes 0 to 4 stand for E, pt, pt², Et, Et². Unknown codes fall
    /// back to the E scheme.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => Self::E,
            1 => Self::Pt,
            2 => Self::Pt2,
            3 => Self::Et,
            4 => Self::Et2,
            _ => {
                warn!("Unknown recombination scheme code {code}, using E scheme");
                Self::E
            }
        }
    }

    /// Bring a clustering input into the form expected by the scheme
    fn preprocess(&self, p: FourVector) -> FourVector {
        match self {
            Self::E => p,
            Self::Pt | Self::Pt2 => {
                [p.spatial_norm(), p.px(), p.py(), p.pz()].into()
            }
            Self::Et | Self::Et2 => {
                let norm = p.spatial_norm();
                if p.e() == 0. || norm == 0. {
                    return p;
                }
                let rescale = p.e() / norm;
                [p.e(), rescale * p.px(), rescale * p.py(), rescale * p.pz()]
                    .into()
            }
        }
    }

    fn recombine(&self, pa: &FourVector, pb: &FourVector) -> FourVector {
        let (wa, wb) = match self {
            Self::E => return *pa + *pb,
            Self::Pt => (pa.pt().raw(), pb.pt().raw()),
            Self::Pt2 => (pa.pt2().raw(), pb.pt2().raw()),
            Self::Et => (pa.et().raw(), pb.et().raw()),
            Self::Et2 => (pa.et().raw().powi(2), pb.et().raw().powi(2)),
        };
        let pt = pa.pt().raw() + pb.pt().raw();
        if pt == 0. {
            return FourVector::new();
        }
        let phi_a = pa.phi().raw();
        let mut phi_b = pb.phi().raw();
        if phi_a - phi_b > PI {
            phi_b += 2. * PI;
        } else if phi_a - phi_b < -PI {
            phi_b -= 2. * PI;
        }
        let w = wa + wb;
        let rap = (wa * pa.rap().raw() + wb * pb.rap().raw()) / w;
        let phi = (wa * phi_a + wb * phi_b) / w;
        FourVector::from_pt_rap_phi(pt, rap, phi)
    }
}

/// Placeholder for an unknown recombination scheme
#[derive(Debug, Clone, Error)]
pub struct UnknownRecombinationScheme(String);

impl fmt::Display for UnknownRecombinationScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown recombination scheme: {}", self.0)
    }
}

impl FromStr for RecombinationScheme {
    type Err = UnknownRecombinationScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E" | "e" | "E_scheme" | "e_scheme" => Ok(Self::E),
            "pt" | "pt_scheme" => Ok(Self::Pt),
            "pt2" | "pt²" | "pt2_scheme" => Ok(Self::Pt2),
            "Et" | "et" | "Et_scheme" | "et_scheme" => Ok(Self::Et),
            "Et2" | "et2" | "Et²" | "Et2_scheme" | "et2_scheme" => Ok(Self::Et2),
            _ => Err(UnknownRecombinationScheme(s.to_string())),
        }
    }
}

// Settings may give the algorithm and scheme by name or by legacy code
#[derive(Deserialize)]
#[serde(untagged)]
enum NameOrCode<T> {
    Code(u32),
    Name(T),
}

fn algorithm_name_or_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<JetAlgorithm, D::Error> {
    Ok(match NameOrCode::deserialize(deserializer)? {
        NameOrCode::Code(code) => JetAlgorithm::from_code(code),
        NameOrCode::Name(algorithm) => algorithm,
    })
}

fn scheme_name_or_code<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<RecombinationScheme, D::Error> {
    Ok(match NameOrCode::deserialize(deserializer)? {
        NameOrCode::Code(code) => RecombinationScheme::from_code(code),
        NameOrCode::Name(scheme) => scheme,
    })
}

/// Definition of a jet
#[derive(Deserialize, Serialize, Debug, Copy, Clone, PartialEq)]
pub struct JetDefinition {
    /// Jet algorithm
    #[serde(deserialize_with = "algorithm_name_or_code")]
    pub algorithm: JetAlgorithm,
    /// Jet radius parameter
    pub radius: f64,
    /// Recombination scheme
    #[serde(default, deserialize_with = "scheme_name_or_code")]
    pub scheme: RecombinationScheme,
}

impl Default for JetDefinition {
    fn default() -> Self {
        Self {
            algorithm: JetAlgorithm::AntiKt,
            radius: 0.4,
            scheme: RecombinationScheme::Pt,
        }
    }
}

/// A clustered jet
#[derive(Clone, Debug, PartialEq)]
pub struct Jet {
    /// Combined four-momentum according to the recombination scheme
    pub momentum: FourVector,
    /// Indices of the clustering inputs, in ascending order
    pub constituents: Vec<usize>,
}

#[derive(Clone, Debug)]
struct Protojet {
    p: FourVector,
    rap: f64,
    phi: f64,
    // momentum factor kt^{2p} of the distance measure
    scale: f64,
    constituents: Vec<usize>,
    // geometric nearest neighbour within the jet radius
    nn: Option<usize>,
    nn_dist: f64,
}

impl Protojet {
    fn new(p: FourVector, exponent: i32, constituents: Vec<usize>) -> Self {
        let pt2 = p.pt2().raw();
        let scale = match exponent {
            0 => 1.,
            1 => pt2,
            _ => {
                if pt2 > 1e-300 {
                    1. / pt2
                } else {
                    1e300
                }
            }
        };
        Self {
            rap: p.rap().raw(),
            phi: p.phi().raw(),
            p,
            scale,
            constituents,
            nn: None,
            nn_dist: f64::MAX,
        }
    }

    fn geometric_distance(&self, other: &Protojet) -> f64 {
        self.distance_to(other.rap, other.phi)
    }

    fn distance_to(&self, rap: f64, phi: f64) -> f64 {
        let drap = self.rap - rap;
        let dphi = delta_phi(self.phi, phi);
        drap * drap + dphi * dphi
    }
}

/// Sequential recombination clustering with nearest-neighbour caching
struct ClusterSequence {
    jets: Vec<Option<Protojet>>,
    r2: f64,
}

impl ClusterSequence {
    fn new(jets: Vec<Protojet>, radius: f64) -> Self {
        let mut seq = Self {
            jets: jets.into_iter().map(Some).collect(),
            r2: radius * radius,
        };
        for i in 0..seq.jets.len() {
            seq.update_nn(i);
        }
        seq
    }

    fn update_nn(&mut self, i: usize) {
        let Some(jet) = &self.jets[i] else {
            return;
        };
        let mut nn = None;
        let mut nn_dist = self.r2;
        for (j, other) in self.jets.iter().enumerate() {
            let Some(other) = other else { continue };
            if j == i {
                continue;
            }
            let dist = jet.geometric_distance(other);
            if dist < nn_dist {
                nn_dist = dist;
                nn = Some(j);
            }
        }
        if let Some(jet) = &mut self.jets[i] {
            jet.nn = nn;
            jet.nn_dist = nn_dist;
        }
    }

    fn distance(&self, i: usize) -> f64 {
        let Some(jet) = &self.jets[i] else {
            return f64::MAX;
        };
        match jet.nn.and_then(|j| self.jets[j].as_ref()) {
            Some(nn) => jet.scale.min(nn.scale) * jet.nn_dist / self.r2,
            None => jet.scale,
        }
    }

    fn run(
        mut self,
        scheme: RecombinationScheme,
        exponent: i32,
    ) -> Vec<Jet> {
        let mut finished = Vec::new();
        loop {
            let mut best = None;
            let mut best_dist = f64::MAX;
            for i in 0..self.jets.len() {
                if self.jets[i].is_none() {
                    continue;
                }
                let dist = self.distance(i);
                if best.is_none() || dist < best_dist {
                    best = Some(i);
                    best_dist = dist;
                }
            }
            let Some(i) = best else {
                break;
            };
            let Some(jet) = self.jets[i].take() else {
                break;
            };
            match jet.nn {
                None => {
                    trace!("Jet {:?} finished with distance {best_dist}", jet.p);
                    let mut constituents = jet.constituents;
                    constituents.sort_unstable();
                    finished.push(Jet {
                        momentum: jet.p,
                        constituents,
                    });
                    self.refresh_neighbours(&[i]);
                }
                Some(j) => {
                    let Some(partner) = self.jets[j].take() else {
                        break;
                    };
                    trace!("Merging {i} and {j} with distance {best_dist}");
                    let p = scheme.recombine(&jet.p, &partner.p);
                    let mut constituents = jet.constituents;
                    constituents.extend(partner.constituents);
                    self.jets[i] = Some(Protojet::new(p, exponent, constituents));
                    self.update_nn(i);
                    self.refresh_neighbours(&[i, j]);
                }
            }
        }
        finished
    }

    // Recompute nearest neighbours after the objects at `changed` were
    // modified or removed
    fn refresh_neighbours(&mut self, changed: &[usize]) {
        let new = changed
            .first()
            .and_then(|&i| self.jets[i].as_ref().map(|jet| (i, jet.rap, jet.phi)));
        for k in 0..self.jets.len() {
            let Some(jet) = &self.jets[k] else { continue };
            if changed.contains(&k) {
                continue;
            }
            if jet.nn.map(|nn| changed.contains(&nn)).unwrap_or(false) {
                self.update_nn(k);
                continue;
            }
            if let Some((i, rap, phi)) = new {
                let dist = jet.distance_to(rap, phi);
                if dist < jet.nn_dist {
                    if let Some(jet) = &mut self.jets[k] {
                        jet.nn = Some(i);
                        jet.nn_dist = dist;
                    }
                }
            }
        }
    }
}

/// Cluster the given momenta into inclusive jets
///
/// Every input ends up in exactly one jet. Jets are returned in the
/// order in which the clustering finalises them.
pub fn cluster(momenta: &[FourVector], jet_def: &JetDefinition) -> Vec<Jet> {
    if momenta.is_empty() {
        return Vec::new();
    }
    let exponent = jet_def.algorithm.exponent();
    let inputs = momenta
        .iter()
        .enumerate()
        .map(|(i, p)| Protojet::new(jet_def.scheme.preprocess(*p), exponent, vec![i]))
        .collect();
    let jets = ClusterSequence::new(inputs, jet_def.radius).run(jet_def.scheme, exponent);
    debug!(
        "Clustered {} inputs into {} {} jets with R = {}",
        momenta.len(),
        jets.len(),
        jet_def.algorithm,
        jet_def.radius
    );
    jets
}

/// Sum of the unprocessed input momenta of a jet
pub fn constituent_sum(momenta: &[FourVector], jet: &Jet) -> FourVector {
    jet.constituents
        .iter()
        .map(|&i| momenta[i])
        .fold(FourVector::new(), |acc, p| acc + p)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jetty::{anti_kt_f, Cluster, PseudoJet};

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario() -> Vec<FourVector> {
        vec![
            FourVector::from_pt_rap_phi(10., 0., 0.),
            FourVector::from_pt_rap_phi(9., 0., 0.1),
            FourVector::from_pt_rap_phi(1., 2., 2.),
        ]
    }

    // deterministic pseudo-random momenta
    fn spray(n: usize, seed: u64) -> Vec<FourVector> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..n)
            .map(|_| {
                let pt = 0.5 + 20. * next();
                let eta = -2. + 4. * next();
                let phi = 2. * PI * next();
                let m = 0.2 * next();
                let [px, py, pz] = [
                    pt * phi.cos(),
                    pt * phi.sin(),
                    pt * eta.sinh(),
                ];
                FourVector::with_mass(px, py, pz, m).unwrap()
            })
            .collect()
    }

    fn close(a: &FourVector, b: &FourVector, tol: f64) -> bool {
        (0..4).all(|i| (a[i].raw() - b[i].raw()).abs() <= tol * (1. + a.e().raw()))
    }

    #[test]
    fn two_jets() {
        log_init();

        let jet_def = JetDefinition {
            algorithm: JetAlgorithm::AntiKt,
            radius: 0.4,
            scheme: RecombinationScheme::E,
        };
        let jets = cluster(&scenario(), &jet_def);
        assert_eq!(jets.len(), 2);
        let hard = jets.iter().find(|j| j.constituents.len() == 2).unwrap();
        assert_eq!(hard.constituents, vec![0, 1]);
        assert!((hard.momentum.pt().raw() - 19.).abs() < 0.05);
        let soft = jets.iter().find(|j| j.constituents.len() == 1).unwrap();
        assert_eq!(soft.constituents, vec![2]);
        assert!((soft.momentum.pt().raw() - 1.).abs() < 1e-12);
    }

    #[test]
    fn empty() {
        assert!(cluster(&[], &JetDefinition::default()).is_empty());
    }

    #[test]
    fn partition() {
        log_init();

        let momenta = spray(60, 3);
        for algorithm in [JetAlgorithm::AntiKt, JetAlgorithm::Kt, JetAlgorithm::CambridgeAachen] {
            for scheme in [
                RecombinationScheme::E,
                RecombinationScheme::Pt,
                RecombinationScheme::Pt2,
                RecombinationScheme::Et,
                RecombinationScheme::Et2,
            ] {
                let jet_def = JetDefinition {
                    algorithm,
                    radius: 0.7,
                    scheme,
                };
                let jets = cluster(&momenta, &jet_def);
                let mut all: Vec<_> = jets
                    .iter()
                    .flat_map(|j| j.constituents.iter().copied())
                    .collect();
                all.sort_unstable();
                assert_eq!(all, (0..momenta.len()).collect::<Vec<_>>());
                for jet in &jets {
                    assert!(jet.constituents.windows(2).all(|w| w[0] < w[1]));
                }
            }
        }
    }

    #[test]
    fn e_scheme_sum() {
        log_init();

        let momenta = spray(50, 7);
        let jet_def = JetDefinition {
            algorithm: JetAlgorithm::Kt,
            radius: 0.6,
            scheme: RecombinationScheme::E,
        };
        for jet in cluster(&momenta, &jet_def) {
            let sum = constituent_sum(&momenta, &jet);
            assert!(close(&sum, &jet.momentum, 1e-10));
        }
    }

    #[test]
    fn pt_scheme() {
        let jet_def = JetDefinition {
            algorithm: JetAlgorithm::AntiKt,
            radius: 0.4,
            scheme: RecombinationScheme::Pt,
        };
        let jets = cluster(&scenario(), &jet_def);
        let hard = jets.iter().find(|j| j.constituents.len() == 2).unwrap();
        assert!((hard.momentum.pt().raw() - 19.).abs() < 1e-10);
        assert!(hard.momentum.m_sq().raw().abs() < 1e-8);
        let expected_phi = 9. * 0.1 / 19.;
        assert!((hard.momentum.phi().raw() - expected_phi).abs() < 1e-10);
    }

    fn massive(pt: f64, eta: f64, phi: f64, m: f64) -> FourVector {
        FourVector::with_mass(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh(), m)
            .unwrap()
    }

    fn merged(momenta: &[FourVector], scheme: RecombinationScheme) -> Vec<Jet> {
        let jet_def = JetDefinition {
            algorithm: JetAlgorithm::AntiKt,
            radius: 1.,
            scheme,
        };
        let mut jets = cluster(momenta, &jet_def);
        jets.sort_by_key(|j| j.constituents[0]);
        jets
    }

    #[test]
    fn pt2_scheme() {
        let momenta = [
            FourVector::from_pt_rap_phi(3., 0.1, 0.2),
            FourVector::from_pt_rap_phi(1., -0.1, 0.4),
        ];
        let jets = merged(&momenta, RecombinationScheme::Pt2);
        assert_eq!(jets.len(), 1);
        let p = jets[0].momentum;
        assert!((p.pt().raw() - 4.).abs() < 1e-10);
        assert!((p.rap().raw() - 0.08).abs() < 1e-10);
        assert!((p.phi().raw() - 0.22).abs() < 1e-10);
        assert!(p.m_sq().raw().abs() < 1e-8);
    }

    #[test]
    fn et_schemes() {
        log_init();

        let momenta = [
            massive(4., 0.2, 0.1, 2.),
            massive(2., -0.1, 0.3, 1.),
            massive(3., 0., 3., 1.5),
        ];
        let (a, b) = (&momenta[0], &momenta[1]);
        for (scheme, power) in [(RecombinationScheme::Et, 1), (RecombinationScheme::Et2, 2)] {
            let jets = merged(&momenta, scheme);
            assert_eq!(jets.len(), 2);
            assert_eq!(jets[0].constituents, vec![0, 1]);

            // inputs keep their energy and become massless
            let single = jets[1].momentum;
            assert_eq!(single.e(), momenta[2].e());
            assert!(single.m_sq().raw().abs() < 1e-8);
            assert!((single.rap().raw() - momenta[2].eta().raw()).abs() < 1e-10);

            let (wa, wb) = (a.et().raw().powi(power), b.et().raw().powi(power));
            let expected_rap = (wa * a.eta().raw() + wb * b.eta().raw()) / (wa + wb);
            let expected_phi = (wa * 0.1 + wb * 0.3) / (wa + wb);
            let p = jets[0].momentum;
            assert!((p.pt().raw() - (a.et() + b.et()).raw()).abs() < 1e-10);
            assert!((p.rap().raw() - expected_rap).abs() < 1e-10);
            assert!((p.phi().raw() - expected_phi).abs() < 1e-10);
        }
        // pt weighting differs for massive inputs
        let pt_jet = merged(&momenta, RecombinationScheme::Pt)[0].momentum;
        let et_jet = merged(&momenta, RecombinationScheme::Et)[0].momentum;
        assert!((pt_jet.pt() - et_jet.pt()).raw().abs() > 1e-3);
    }

    #[test]
    fn azimuthal_wraparound() {
        let momenta = vec![
            FourVector::from_pt_rap_phi(5., 0., 0.05),
            FourVector::from_pt_rap_phi(5., 0., 2. * PI - 0.05),
        ];
        for scheme in [RecombinationScheme::E, RecombinationScheme::Pt] {
            let jet_def = JetDefinition {
                algorithm: JetAlgorithm::CambridgeAachen,
                radius: 0.4,
                scheme,
            };
            let jets = cluster(&momenta, &jet_def);
            assert_eq!(jets.len(), 1);
            let phi = jets[0].momentum.phi_std().raw();
            assert!(phi.abs() < 1e-10);
        }
    }

    // only anti-kt, jetty's kt jets differ from an exhaustive reference
    #[test]
    fn same_as_jetty() {
        log_init();

        let momenta = spray(40, 11);
        let pseudojets: Vec<PseudoJet> = momenta.iter().map(PseudoJet::from).collect();
        for r in [0.4, 0.7] {
            let jet_def = JetDefinition {
                algorithm: JetAlgorithm::AntiKt,
                radius: r,
                scheme: RecombinationScheme::E,
            };
            let mut ours: Vec<_> = cluster(&momenta, &jet_def)
                .into_iter()
                .map(|j| j.momentum)
                .collect();
            let theirs = pseudojets.clone().cluster_if(anti_kt_f(r), |_: PseudoJet| true);
            let mut theirs: Vec<FourVector> = theirs.into_iter().map(FourVector::from).collect();
            assert_eq!(ours.len(), theirs.len());
            ours.sort_by(|a, b| b.pt().cmp(&a.pt()));
            theirs.sort_by(|a, b| b.pt().cmp(&a.pt()));
            for (a, b) in ours.iter().zip(theirs.iter()) {
                assert!(close(a, b, 1e-9), "{a:?} != {b:?}");
            }
        }
    }

    #[test]
    fn parse() {
        assert_eq!("anti-kt".parse::<JetAlgorithm>().unwrap(), JetAlgorithm::AntiKt);
        assert_eq!(
            "cambridge_aachen".parse::<JetAlgorithm>().unwrap(),
            JetAlgorithm::CambridgeAachen
        );
        assert!("siscone".parse::<JetAlgorithm>().is_err());
        assert_eq!("Et2".parse::<RecombinationScheme>().unwrap(), RecombinationScheme::Et2);
        assert!("WTA".parse::<RecombinationScheme>().is_err());
        assert_eq!(JetAlgorithm::from_code(7), JetAlgorithm::AntiKt);
        assert_eq!(JetAlgorithm::from_code(1), JetAlgorithm::Kt);
        assert_eq!(RecombinationScheme::from_code(9), RecombinationScheme::E);
        assert_eq!(RecombinationScheme::from_code(2), RecombinationScheme::Pt2);
    }
}
