use std::collections::HashMap;

use lazy_static::lazy_static;
use particle_id::{
    sm_elementary_particles::{bottom, gluon},
    ParticleID,
};

/// Lookup of electric charges by particle species
pub trait ChargeLookup {
    /// Electric charge in units of the elementary charge
    ///
    /// `None` if the species is unknown.
    fn charge(&self, id: ParticleID) -> Option<f64>;
}

/// Charges following the PDG numbering scheme
///
/// Elementary particles are taken from a table, hadron charges are
/// derived from their quark content.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PdgCharges;

lazy_static! {
    // charges in units of e/3
    static ref ELEMENTARY_THREE_CHARGES: HashMap<i32, i32> = HashMap::from([
        (1, -1),
        (2, 2),
        (3, -1),
        (4, 2),
        (5, -1),
        (6, 2),
        (11, -3),
        (12, 0),
        (13, -3),
        (14, 0),
        (15, -3),
        (16, 0),
        (21, 0),
        (22, 0),
        (23, 0),
        (24, 3),
        (25, 0),
        // K_L and K_S don't follow the quark content scheme
        (130, 0),
        (310, 0),
    ]);
}

const QUARK_THREE_CHARGES: [i32; 7] = [0, -1, 2, -1, 2, -1, 2];

fn hadron_three_charge(abs_id: i32) -> Option<i32> {
    if !(100..10_000_000).contains(&abs_id) || abs_id % 10 == 0 {
        return None;
    }
    let nq1 = ((abs_id / 1000) % 10) as usize;
    let nq2 = ((abs_id / 100) % 10) as usize;
    let nq3 = ((abs_id / 10) % 10) as usize;
    if nq2 == 0 || nq3 == 0 || nq1 > 6 || nq2 > 6 || nq3 > 6 {
        return None;
    }
    let ch = |q: usize| QUARK_THREE_CHARGES[q];
    let charge = if nq1 == 0 {
        // mesons: the heavier quark fixes the sign convention
        if nq2 == 3 || nq2 == 5 {
            ch(nq3) - ch(nq2)
        } else {
            ch(nq2) - ch(nq3)
        }
    } else {
        ch(nq1) + ch(nq2) + ch(nq3)
    };
    Some(charge)
}

impl ChargeLookup for PdgCharges {
    fn charge(&self, id: ParticleID) -> Option<f64> {
        let abs_id = id.id().abs();
        let three_charge = ELEMENTARY_THREE_CHARGES
            .get(&abs_id)
            .copied()
            .or_else(|| hadron_three_charge(abs_id))?;
        let three_charge = if id.id() < 0 {
            -three_charge
        } else {
            three_charge
        };
        Some(three_charge as f64 / 3.)
    }
}

impl<F: Fn(ParticleID) -> Option<f64>> ChargeLookup for F {
    fn charge(&self, id: ParticleID) -> Option<f64> {
        self(id)
    }
}

/// Whether the particle is a quark (up to bottom) or a gluon
pub fn is_parton(id: ParticleID) -> bool {
    id.id().abs() <= bottom.id() || id == gluon
}
