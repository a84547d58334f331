use log::{debug, trace};

use crate::cluster::Jet;
use crate::four_vector::FourVector;
use crate::provenance::ParticlePool;
use crate::qa::{Kinematics, ObjectKind, QaAggregator};
use crate::record::{ConstituentRecord, JetRecord, View};

/// Jet area assigned to all jets, areas are not computed
pub const JET_AREA: f64 = 0.;

/// Compute the output quantities of the given jets and their constituents
///
/// `pool` has to be the particle pool the jets were clustered from.
/// Jets are kept in clustering order and numbered accordingly.
pub fn build_jets(
    jets: &[Jet],
    pool: &ParticlePool,
    view: View,
    qa: &mut QaAggregator,
) -> Vec<JetRecord> {
    let jet_kind = ObjectKind::jet(view);
    let cst_kind = ObjectKind::constituent(view);
    let mut records = Vec::with_capacity(jets.len());
    let mut ncst_total = 0;
    for (id, jet) in jets.iter().enumerate() {
        let record = build_jet(id, jet, pool);
        trace!(
            "{view} jet {id}: pt = {}, eta = {}, {} constituents",
            record.pt,
            record.eta,
            record.num_constituents()
        );
        for cst in &record.constituents {
            qa.seen(cst_kind);
            qa.accepted(
                cst_kind,
                Kinematics {
                    pt: cst.jt,
                    eta: cst.eta,
                    phi: cst.phi,
                    e: cst.e,
                },
            );
        }
        qa.seen(jet_kind);
        qa.accepted(
            jet_kind,
            Kinematics {
                pt: record.pt,
                eta: record.eta,
                phi: record.phi,
                e: record.e,
            },
        );
        qa.jet(view, record.num_constituents(), record.area);
        ncst_total += record.num_constituents();
        records.push(record);
    }
    qa.event_count(jet_kind, records.len());
    qa.event_count(cst_kind, ncst_total);
    debug!("Built {} {view} jets with {ncst_total} constituents", records.len());
    records
}

fn build_jet(id: usize, jet: &Jet, pool: &ParticlePool) -> JetRecord {
    let p = &jet.momentum;
    let eta = p.eta().raw();
    let phi = p.phi_std().raw();
    let jet_p = p.spatial_norm().raw();
    let constituents = jet
        .constituents
        .iter()
        .filter_map(|&idx| {
            debug_assert!(idx < pool.len());
            let cst = pool.momentum(idx)?;
            let provenance = pool.provenance(idx)?;
            let (z, dr) = z_and_dr(cst, jet_p, eta, phi);
            Some(ConstituentRecord {
                provenance,
                z,
                dr,
                e: cst.e().raw(),
                jt: cst.pt().raw(),
                eta: cst.eta().raw(),
                phi: cst.phi_std().raw(),
            })
        })
        .collect();
    JetRecord {
        id,
        e: p.e().raw(),
        pt: p.pt().raw(),
        eta,
        phi,
        area: JET_AREA,
        constituents,
    }
}

// NOTE: z is |p_cst|² / |p_jet|, not the momentum fraction along the jet
// axis. The value is dimensionful and can exceed 1.
//
// dr uses the plain azimuth difference without wrapping around 2π.
fn z_and_dr(cst: &FourVector, jet_p: f64, jet_eta: f64, jet_phi: f64) -> (f64, f64) {
    let z = if jet_p > 0. {
        cst.spatial_norm_sq().raw() / jet_p
    } else {
        0.
    };
    let dphi = cst.phi_std().raw() - jet_phi;
    let deta = cst.eta().raw() - jet_eta;
    (z, (dphi * dphi + deta * deta).sqrt())
}
