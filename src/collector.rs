use log::{debug, trace};

use crate::acceptance::{KinematicCuts, ParticleCuts, TrackCuts};
use crate::four_vector::{FourVector, PION_MASS};
use crate::provenance::{ParticlePool, Provenance, SourceKind};
use crate::qa::{Kinematics, ObjectKind, QaAggregator};
use crate::source::{
    CaloCluster, CaloKind, ClusterCorrection, EventData, FlowElement,
    GenParticle, SourceError, Track, TrackEvaluator, Vertex,
};
use crate::species::ChargeLookup;

/// A kind of jet input that can be collected into a [ParticlePool]
///
/// Implementors only describe how to find, convert, and judge their raw
/// objects. The bookkeeping is shared and done by [collect].
pub trait InputSource {
    type Raw;

    /// Source kind recorded in the provenance of collected particles
    fn kind(&self) -> SourceKind;

    /// All raw objects of this kind in the event
    ///
    /// `None` entries stand for invalid objects.
    fn objects<'a, E: EventData + ?Sized>(
        &self,
        event: &'a E,
    ) -> Result<&'a [Option<Self::Raw>], SourceError>;

    /// Whether the object is a jet input candidate at all
    ///
    /// Objects failing this test are neither counted nor collected.
    fn is_candidate(&self, _raw: &Self::Raw) -> bool {
        true
    }

    /// Identifier of the object in its source container
    fn id(&self, raw: &Self::Raw) -> i32;

    /// Four-momentum of the object, `None` if it cannot be computed
    fn momentum(&self, raw: &Self::Raw) -> Option<FourVector>;

    fn is_accepted(&self, raw: &Self::Raw, p: &FourVector) -> bool;
}

/// Collect all accepted objects from `source` into `pool`
///
/// Returns the number of collected objects. Every candidate is counted
/// as seen in the QA, accepted ones are counted again with their
/// kinematics.
pub fn collect<S, E>(
    source: &S,
    event: &E,
    pool: &mut ParticlePool,
    qa: &mut QaAggregator,
) -> Result<usize, SourceError>
where
    S: InputSource,
    E: EventData + ?Sized,
{
    let kind = source.kind();
    let qa_kind = ObjectKind::from(kind);
    let objects = source.objects(event)?;
    debug!("Collecting {} {kind} candidates", objects.len());
    let mut naccepted = 0;
    let mut energy = 0.;
    for raw in objects {
        let Some(raw) = raw else {
            trace!("Invalid {kind}");
            qa.seen(qa_kind);
            continue;
        };
        if !source.is_candidate(raw) {
            continue;
        }
        qa.seen(qa_kind);
        let id = source.id(raw);
        let Some(p) = source.momentum(raw) else {
            trace!("Skipping {kind} {id} with invalid momentum");
            continue;
        };
        if !source.is_accepted(raw, &p) {
            trace!("Rejected {kind} {id}: {p:?}");
            continue;
        }
        trace!("Accepted {kind} {id}: {p:?}");
        qa.accepted(qa_kind, Kinematics::from(&p));
        energy += p.e().raw();
        pool.push(p, Provenance::new(kind, id));
        naccepted += 1;
    }
    debug!("Collected {naccepted} {kind} objects with total energy {energy}");
    Ok(naccepted)
}

/// Reconstructed tracks under the charged pion mass hypothesis
#[derive(Copy, Clone, Debug)]
pub struct TrackSource<'a, T: ?Sized> {
    pub cuts: TrackCuts,
    pub evaluator: &'a T,
}

impl<T: TrackEvaluator + ?Sized> InputSource for TrackSource<'_, T> {
    type Raw = Track;

    fn kind(&self) -> SourceKind {
        SourceKind::Track
    }

    fn objects<'a, E: EventData + ?Sized>(
        &self,
        event: &'a E,
    ) -> Result<&'a [Option<Track>], SourceError> {
        event.tracks().ok_or(SourceError::MissingTracks)
    }

    fn id(&self, track: &Track) -> i32 {
        track.id
    }

    fn momentum(&self, track: &Track) -> Option<FourVector> {
        FourVector::with_mass(track.px, track.py, track.pz, PION_MASS)
    }

    fn is_accepted(&self, track: &Track, p: &FourVector) -> bool {
        let quality = self.evaluator.evaluate(track);
        self.cuts.accepts(p, &quality)
    }
}

/// Particle-flow elements
#[derive(Copy, Clone, Debug)]
pub struct FlowSource {
    pub cuts: KinematicCuts,
}

impl InputSource for FlowSource {
    type Raw = FlowElement;

    fn kind(&self) -> SourceKind {
        SourceKind::Flow
    }

    fn objects<'a, E: EventData + ?Sized>(
        &self,
        event: &'a E,
    ) -> Result<&'a [Option<FlowElement>], SourceError> {
        event.flow().ok_or(SourceError::MissingFlow)
    }

    fn id(&self, flow: &FlowElement) -> i32 {
        flow.id
    }

    fn momentum(&self, flow: &FlowElement) -> Option<FourVector> {
        FourVector::try_from_components(flow.e, flow.px, flow.py, flow.pz)
    }

    fn is_accepted(&self, _flow: &FlowElement, p: &FourVector) -> bool {
        self.cuts.accepts(p)
    }
}

/// Calorimeter clusters pointing back to the primary vertex
///
/// The cluster is treated as a massless deposit: the energy is the
/// magnitude of the corrected momentum and the longitudinal component is
/// recomputed from the energy and the transverse momentum.
#[derive(Copy, Clone, Debug)]
pub struct ClusterSource<'a, C: ?Sized> {
    pub calo: CaloKind,
    pub cuts: KinematicCuts,
    pub correction: &'a C,
    pub vertex: Vertex,
    /// Keep the sign of the corrected pz instead of taking the positive root
    pub signed_pz: bool,
}

impl<C: ClusterCorrection + ?Sized> InputSource for ClusterSource<'_, C> {
    type Raw = CaloCluster;

    fn kind(&self) -> SourceKind {
        SourceKind::from(self.calo)
    }

    fn objects<'a, E: EventData + ?Sized>(
        &self,
        event: &'a E,
    ) -> Result<&'a [Option<CaloCluster>], SourceError> {
        event
            .clusters(self.calo)
            .ok_or(SourceError::MissingClusters(self.calo))
    }

    fn id(&self, cluster: &CaloCluster) -> i32 {
        cluster.id
    }

    fn momentum(&self, cluster: &CaloCluster) -> Option<FourVector> {
        let [px, py, pz] =
            self.correction.corrected_momentum(cluster, &self.vertex);
        let e = (px * px + py * py + pz * pz).sqrt();
        let pt_sq = px * px + py * py;
        // rounding can push pt above e
        let abs_pz = (e * e - pt_sq).max(0.).sqrt();
        // NOTE: by default pz is the positive root, so backward clusters
        // end up at positive pseudorapidity
        let pz = if self.signed_pz { abs_pz.copysign(pz) } else { abs_pz };
        FourVector::try_from_components(e, px, py, pz)
    }

    fn is_accepted(&self, _cluster: &CaloCluster, p: &FourVector) -> bool {
        self.cuts.accepts(p)
    }
}

/// Stable final-state generator particles
#[derive(Copy, Clone, Debug)]
pub struct ParticleSource<'a, Q: ?Sized> {
    pub cuts: ParticleCuts,
    pub charges: &'a Q,
}

impl<Q: ChargeLookup + ?Sized> InputSource for ParticleSource<'_, Q> {
    type Raw = GenParticle;

    fn kind(&self) -> SourceKind {
        SourceKind::Particle
    }

    fn objects<'a, E: EventData + ?Sized>(
        &self,
        event: &'a E,
    ) -> Result<&'a [Option<GenParticle>], SourceError> {
        event
            .generator_event()
            .map(|ev| ev.particles.as_slice())
            .ok_or(SourceError::MissingGeneratorEvent)
    }

    fn is_candidate(&self, particle: &GenParticle) -> bool {
        particle.is_final_state()
    }

    fn id(&self, particle: &GenParticle) -> i32 {
        particle.barcode
    }

    fn momentum(&self, particle: &GenParticle) -> Option<FourVector> {
        FourVector::try_from_components(
            particle.e,
            particle.px,
            particle.py,
            particle.pz,
        )
    }

    fn is_accepted(&self, particle: &GenParticle, p: &FourVector) -> bool {
        let charge = self.charges.charge(particle.pid);
        self.cuts.accepts(p, charge, particle.outgoing_parton)
    }
}
