use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, error, trace};
use rayon::prelude::*;
use thiserror::Error;

use crate::cluster::cluster;
use crate::collector::{
    collect, ClusterSource, FlowSource, ParticleSource, TrackSource,
};
use crate::config::{Config, ConfigError};
use crate::features::build_jets;
use crate::provenance::{ParticlePool, SourceKind};
use crate::qa::{ObjectKind, QaAggregator};
use crate::record::{
    DetectorScalars, EventRecord, EventScalars, Parton, TruthScalars, View,
    UNSET,
};
use crate::source::{
    CaloKind, ClusterCorrection, EventData, LayerLayout, SourceError,
    TrackEvaluator, VertexDirection,
};
use crate::species::{is_parton, ChargeLookup, PdgCharges};
use crate::traits::{Progress, WriteRecord};

/// Processing stage of the [EventDriver]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Stage {
    #[default]
    Idle,
    CollectingTruth,
    ClusteringTruth,
    CollectingDetector,
    ClusteringDetector,
    Committed,
}

impl Stage {
    fn collecting(view: View) -> Self {
        match view {
            View::Truth => Self::CollectingTruth,
            View::Detector => Self::CollectingDetector,
        }
    }

    fn clustering(view: View) -> Self {
        match view {
            View::Truth => Self::ClusteringTruth,
            View::Detector => Self::ClusteringDetector,
        }
    }
}

/// Reason for not committing a record
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SkipReason {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Primary vertex at {0:?} is outside the acceptance")]
    VertexOutsideAcceptance([f64; 3]),
}

/// Stateless per-event processing
///
/// Turns one event into at most one record per view. All event-local
/// state lives in the particle pool passed to the methods, so a single
/// pipeline can be shared between threads.
#[derive(Clone, Debug)]
pub struct Pipeline<T = LayerLayout, C = VertexDirection, Q = PdgCharges> {
    config: Config,
    evaluator: T,
    correction: C,
    charges: Q,
}

impl Pipeline {
    /// Pipeline with the default track evaluator, cluster correction,
    /// and charge lookup
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            "Detector inputs: {}",
            config.detector_inputs().join(", ")
        );
        let evaluator = config.layers.clone();
        Ok(Self {
            config,
            evaluator,
            correction: VertexDirection,
            charges: PdgCharges,
        })
    }
}

impl<T, C, Q> Pipeline<T, C, Q> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn with_evaluator<U: TrackEvaluator>(self, evaluator: U) -> Pipeline<U, C, Q> {
        Pipeline {
            config: self.config,
            evaluator,
            correction: self.correction,
            charges: self.charges,
        }
    }

    pub fn with_correction<U: ClusterCorrection>(
        self,
        correction: U,
    ) -> Pipeline<T, U, Q> {
        Pipeline {
            config: self.config,
            evaluator: self.evaluator,
            correction,
            charges: self.charges,
        }
    }

    pub fn with_charges<U: ChargeLookup>(self, charges: U) -> Pipeline<T, C, U> {
        Pipeline {
            config: self.config,
            evaluator: self.evaluator,
            correction: self.correction,
            charges,
        }
    }

    /// Views processed for each event, in processing order
    pub fn views(&self) -> impl Iterator<Item = View> {
        let truth = self.config.is_mc.then_some(View::Truth);
        truth.into_iter().chain([View::Detector])
    }
}

impl<T, C, Q> Pipeline<T, C, Q>
where
    T: TrackEvaluator,
    C: ClusterCorrection,
    Q: ChargeLookup,
{
    /// Fill `pool` with the inputs for the given view
    ///
    /// `pool` is expected to be empty. Returns the event-level
    /// quantities of the view.
    pub fn collect<E: EventData + ?Sized>(
        &self,
        view: View,
        event: &E,
        pool: &mut ParticlePool,
        qa: &mut QaAggregator,
    ) -> Result<EventScalars, SkipReason> {
        match view {
            View::Truth => self.collect_truth(event, pool, qa),
            View::Detector => self.collect_detector(event, pool, qa),
        }
    }

    fn collect_truth<E: EventData + ?Sized>(
        &self,
        event: &E,
        pool: &mut ParticlePool,
        qa: &mut QaAggregator,
    ) -> Result<EventScalars, SkipReason> {
        let source = ParticleSource {
            cuts: self.config.particle_cuts(),
            charges: &self.charges,
        };
        let naccepted = collect(&source, event, pool, qa)?;
        qa.event_count(ObjectKind::Particle, naccepted);

        let gen = event
            .generator_event()
            .ok_or(SourceError::MissingGeneratorEvent)?;
        let mut scalars = TruthScalars {
            vertex: gen.vertex.unwrap_or([UNSET; 3]),
            ..Default::default()
        };
        let mut partons = Vec::with_capacity(2);
        for particle in gen.particles.iter().flatten() {
            if particle.is_final_state() {
                scalars.sum_energy += particle.e;
                let charge = self.charges.charge(particle.pid).unwrap_or(0.);
                if charge != 0. {
                    scalars.num_charged += 1;
                }
            }
            if particle.outgoing_parton
                && is_parton(particle.pid)
                && partons.len() < 2
            {
                partons.push(Parton {
                    id: particle.pid,
                    momentum: [particle.px, particle.py, particle.pz],
                });
            }
        }
        for (slot, parton) in scalars.partons.iter_mut().zip(partons) {
            *slot = Some(parton);
        }
        Ok(EventScalars::Truth(scalars))
    }

    fn collect_detector<E: EventData + ?Sized>(
        &self,
        event: &E,
        pool: &mut ParticlePool,
        qa: &mut QaAggregator,
    ) -> Result<EventScalars, SkipReason> {
        let vertex = event.primary_vertex();
        if let Ok(vertex) = &vertex {
            let pos = vertex.position();
            if !self.config.cuts.vertex.accepts(pos) {
                return Err(SkipReason::VertexOutsideAcceptance(pos));
            }
        }

        let cuts = &self.config.cuts;
        let mut counts = BTreeMap::new();
        for kind in self.config.detector_inputs() {
            let n = match kind {
                SourceKind::Track => {
                    let source = TrackSource {
                        cuts: cuts.track,
                        evaluator: &self.evaluator,
                    };
                    collect(&source, event, pool, qa)?
                }
                SourceKind::Flow => {
                    let source = FlowSource { cuts: cuts.flow };
                    collect(&source, event, pool, qa)?
                }
                SourceKind::EmCluster
                | SourceKind::InnerHcalCluster
                | SourceKind::OuterHcalCluster => {
                    let (calo, cuts) = match kind {
                        SourceKind::EmCluster => (CaloKind::Em, cuts.em_cluster),
                        SourceKind::InnerHcalCluster => {
                            (CaloKind::InnerHcal, cuts.hcal_cluster)
                        }
                        _ => (CaloKind::OuterHcal, cuts.hcal_cluster),
                    };
                    let source = ClusterSource {
                        calo,
                        cuts,
                        correction: &self.correction,
                        vertex: vertex.clone()?,
                        signed_pz: self.config.signed_cluster_pz,
                    };
                    collect(&source, event, pool, qa)?
                }
                SourceKind::Particle => continue,
            };
            *counts.entry(ObjectKind::from(kind)).or_insert(0) += n;
        }
        for (kind, n) in counts {
            qa.event_count(kind, n);
        }

        let cluster_energy = |calo| -> f64 {
            event
                .clusters(calo)
                .unwrap_or_default()
                .iter()
                .flatten()
                .map(|c| c.energy)
                .sum()
        };
        let scalars = DetectorScalars {
            vertex: vertex.map_or([UNSET; 3], |v| v.position()),
            sum_ecal: cluster_energy(CaloKind::Em),
            sum_hcal: cluster_energy(CaloKind::InnerHcal)
                + cluster_energy(CaloKind::OuterHcal),
            num_tracks: event
                .tracks()
                .map_or(0, |t| t.iter().flatten().count()),
        };
        Ok(EventScalars::Detector(scalars))
    }

    /// Cluster the pooled inputs and assemble the record
    pub fn build_record(
        &self,
        event: usize,
        scalars: EventScalars,
        pool: &ParticlePool,
        qa: &mut QaAggregator,
    ) -> EventRecord {
        let view = scalars.view();
        let jets = cluster(pool.momenta(), &self.config.jet.definition);
        let jets = build_jets(&jets, pool, view, qa);
        EventRecord {
            event,
            scalars,
            jets,
        }
    }

    /// Collect, cluster, and assemble the record for one view
    ///
    /// Returns `None` if the record has to be skipped. The reason is
    /// logged and counted in the QA.
    pub fn view_record<E: EventData + ?Sized>(
        &self,
        idx: usize,
        view: View,
        event: &E,
        pool: &mut ParticlePool,
        qa: &mut QaAggregator,
    ) -> Option<EventRecord> {
        pool.clear();
        match self.collect(view, event, pool, qa) {
            Ok(scalars) => {
                let record = self.build_record(idx, scalars, pool, qa);
                qa.committed(view);
                Some(record)
            }
            Err(err) => {
                report_skip(idx, view, &err, qa);
                None
            }
        }
    }

    /// Process all events in parallel
    ///
    /// Records are returned in input order, truth before detector within
    /// each event, exactly as the [EventDriver] would commit them.
    pub fn par_records<E, P>(
        &self,
        events: &[E],
        progress: &P,
    ) -> (Vec<EventRecord>, QaAggregator)
    where
        E: EventData + Sync,
        P: Progress + Sync + ?Sized,
        T: Sync,
        C: Sync,
        Q: Sync,
    {
        let (mut records, qa, _) = events
            .par_iter()
            .enumerate()
            .fold(
                || (Vec::new(), QaAggregator::new(), ParticlePool::new()),
                |(mut records, mut qa, mut pool), (idx, event)| {
                    for view in self.views() {
                        if let Some(record) =
                            self.view_record(idx, view, event, &mut pool, &mut qa)
                        {
                            records.push(record);
                        }
                    }
                    progress.inc(1);
                    (records, qa, pool)
                },
            )
            .reduce(
                || (Vec::new(), QaAggregator::new(), ParticlePool::new()),
                |(mut records, mut qa, pool), (more, other_qa, _)| {
                    records.extend(more);
                    qa.merge(&other_qa);
                    (records, qa, pool)
                },
            );
        records.sort_by_key(|r| (r.event, r.view()));
        progress.finish();
        (records, qa)
    }
}

fn report_skip(idx: usize, view: View, reason: &SkipReason, qa: &mut QaAggregator) {
    match reason {
        SkipReason::Source(err) => {
            error!("Event {idx}: skipping {view} record: {err}")
        }
        SkipReason::VertexOutsideAcceptance(_) => {
            debug!("Event {idx}: skipping {view} record: {reason}")
        }
    }
    qa.skipped(view);
}

/// Sequential event loop
///
/// Owns the QA aggregates of the run and the reusable particle pool.
/// Each event passes through the [Stage]s in order and its records
/// are handed to the sink as soon as they are complete.
#[derive(Debug)]
pub struct EventDriver<T = LayerLayout, C = VertexDirection, Q = PdgCharges> {
    pipeline: Pipeline<T, C, Q>,
    qa: QaAggregator,
    pool: ParticlePool,
    stage: Stage,
}

impl<T, C, Q> EventDriver<T, C, Q>
where
    T: TrackEvaluator,
    C: ClusterCorrection,
    Q: ChargeLookup,
{
    pub fn new(pipeline: Pipeline<T, C, Q>) -> Self {
        Self {
            pipeline,
            qa: QaAggregator::new(),
            pool: ParticlePool::new(),
            stage: Stage::Idle,
        }
    }

    pub fn pipeline(&self) -> &Pipeline<T, C, Q> {
        &self.pipeline
    }

    /// Current stage
    ///
    /// After an event has been processed this is [Stage::Committed]
    /// until the next event starts.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn qa(&self) -> &QaAggregator {
        &self.qa
    }

    /// Process one event and pass its records to `sink`
    ///
    /// A skipped view does not affect the other view. Only errors from
    /// the sink are returned.
    pub fn process<E, W>(
        &mut self,
        idx: usize,
        event: &E,
        sink: &mut W,
    ) -> Result<(), W::Error>
    where
        E: EventData + ?Sized,
        W: WriteRecord + ?Sized,
    {
        self.stage = Stage::Idle;
        for view in self.pipeline.views() {
            self.stage = Stage::collecting(view);
            self.pool.clear();
            let scalars =
                match self.pipeline.collect(view, event, &mut self.pool, &mut self.qa) {
                    Ok(scalars) => scalars,
                    Err(err) => {
                        report_skip(idx, view, &err, &mut self.qa);
                        continue;
                    }
                };
            self.stage = Stage::clustering(view);
            let record =
                self.pipeline
                    .build_record(idx, scalars, &self.pool, &mut self.qa);
            trace!(
                "Event {idx}: committing {view} record with {} jets",
                record.num_jets()
            );
            sink.write_record(&record)?;
            self.qa.committed(view);
        }
        self.stage = Stage::Committed;
        Ok(())
    }

    /// Process all events in order
    ///
    /// Returns the number of processed events.
    pub fn run<I, E, W, P>(
        &mut self,
        events: I,
        sink: &mut W,
        progress: &P,
    ) -> Result<usize, W::Error>
    where
        I: IntoIterator<Item = E>,
        E: EventData,
        W: WriteRecord + ?Sized,
        P: Progress + ?Sized,
    {
        let mut nevents = 0;
        for (idx, event) in events.into_iter().enumerate() {
            self.process(idx, &event, sink)?;
            progress.inc(1);
            nevents += 1;
        }
        progress.finish();
        sink.finish()?;
        debug!("Processed {nevents} events");
        Ok(nevents)
    }

    /// End the run and hand out the accumulated QA
    pub fn finish(self) -> QaAggregator {
        self.qa.dump_info();
        self.qa
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use particle_id::ParticleID;

    use crate::acceptance::TrackQuality;
    use crate::progress_bar::NO_PROGRESS;
    use crate::provenance::Provenance;
    use crate::source::{CaloCluster, GenEvent, GenParticle, RawEvent, Track, Vertex};

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn good_track(id: i32, px: f64, py: f64) -> Option<Track> {
        Some(Track {
            id,
            px,
            py,
            pz: 0.,
            quality: 1.,
            // two MVTX, one INTT, 40 TPC layers
            layers: [0, 1, 3].into_iter().chain(10..50).collect(),
        })
    }

    fn gen_particle(barcode: i32, pid: i32, px: f64, py: f64) -> Option<GenParticle> {
        Some(GenParticle {
            barcode,
            status: 1,
            pid: ParticleID::new(pid),
            e: (px * px + py * py).sqrt(),
            px,
            py,
            pz: 0.,
            outgoing_parton: false,
        })
    }

    fn event() -> RawEvent {
        let mut parton = gen_particle(1, 21, 20., 0.).unwrap();
        parton.status = 3;
        parton.outgoing_parton = true;
        RawEvent {
            tracks: Some(vec![
                good_track(0, 10., 0.),
                good_track(1, 9., 0.5),
                None,
                good_track(2, -5., 0.),
            ]),
            vertices: Some(vec![Vertex { x: 0., y: 0., z: 1. }]),
            em_clusters: Some(vec![Some(CaloCluster {
                id: 0,
                energy: 3.,
                position: [0., 100., 1.],
            })]),
            generator: Some(GenEvent {
                vertex: Some([0., 0., 1.]),
                particles: vec![
                    Some(parton),
                    gen_particle(2, 211, 10., 0.),
                    gen_particle(3, 22, 9., 0.5),
                    gen_particle(4, -211, -5., 0.),
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn both_views() {
        log_init();

        let pipeline = Pipeline::new(Config::default()).unwrap();
        let mut driver = EventDriver::new(pipeline);
        assert_eq!(driver.stage(), Stage::Idle);
        let mut records: Vec<EventRecord> = Vec::new();
        driver.process(0, &event(), &mut records).unwrap();
        assert_eq!(driver.stage(), Stage::Committed);

        assert_eq!(records.len(), 2);
        let truth = &records[0];
        assert_eq!(truth.view(), View::Truth);
        assert_eq!(truth.num_jets(), 2);
        let EventScalars::Truth(scalars) = &truth.scalars else {
            panic!("wrong scalars for truth record")
        };
        assert_eq!(scalars.num_charged, 2);
        assert!((scalars.sum_energy - (15. + 81.25f64.sqrt())).abs() < 1e-9);
        assert_eq!(scalars.partons[0].unwrap().id, ParticleID::new(21));
        assert!(scalars.partons[1].is_none());

        let detector = &records[1];
        assert_eq!(detector.view(), View::Detector);
        assert_eq!(detector.num_jets(), 2);
        let EventScalars::Detector(scalars) = &detector.scalars else {
            panic!("wrong scalars for detector record")
        };
        assert_eq!(scalars.num_tracks, 3);
        assert_eq!(scalars.vertex, [0., 0., 1.]);
        assert_eq!(scalars.sum_ecal, 3.);
        assert_eq!(scalars.sum_hcal, 0.);
        let provenance: Vec<_> = detector
            .jets
            .iter()
            .flat_map(|j| j.constituents.iter().map(|c| c.provenance))
            .collect();
        assert_eq!(provenance.len(), 3);
        assert!(provenance.contains(&Provenance::Track(2)));

        let qa = driver.finish();
        assert_eq!(qa.records(View::Truth).committed, 1);
        assert_eq!(qa.records(View::Detector).committed, 1);
        assert_eq!(qa.object(ObjectKind::Track).unwrap().seen, 4);
        assert_eq!(qa.object(ObjectKind::Track).unwrap().accepted, 3);
    }

    #[test]
    fn no_truth_without_mc() {
        log_init();

        let config = Config {
            is_mc: false,
            ..Default::default()
        };
        let mut driver = EventDriver::new(Pipeline::new(config).unwrap());
        let mut records: Vec<EventRecord> = Vec::new();
        driver.process(0, &event(), &mut records).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].view(), View::Detector);
        assert_eq!(driver.qa().records(View::Truth).committed, 0);
        assert_eq!(driver.qa().records(View::Truth).skipped, 0);
    }

    #[test]
    fn vertex_outside_acceptance() {
        log_init();

        let mut ev = event();
        ev.vertices = Some(vec![Vertex { x: 0., y: 0., z: 25. }]);
        let mut driver = EventDriver::new(Pipeline::new(Config::default()).unwrap());
        let mut records: Vec<EventRecord> = Vec::new();
        driver.process(0, &ev, &mut records).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].view(), View::Truth);
        assert_eq!(driver.qa().records(View::Detector).skipped, 1);
    }

    #[test]
    fn missing_vertex_with_calorimeters() {
        log_init();

        let mut config = Config::default();
        config.sources.em_clusters = true;
        let pipeline = Pipeline::new(config).unwrap();
        let mut ev = event();
        let mut pool = ParticlePool::new();
        let mut qa = QaAggregator::new();
        let scalars = pipeline.collect(View::Detector, &ev, &mut pool, &mut qa);
        assert!(scalars.is_ok());
        assert_eq!(pool.count(SourceKind::EmCluster), 1);

        ev.vertices = None;
        let record = pipeline.view_record(0, View::Detector, &ev, &mut pool, &mut qa);
        assert!(record.is_none());
        assert_eq!(qa.records(View::Detector).skipped, 1);
    }

    #[test]
    fn custom_collaborators() {
        log_init();

        let pipeline = Pipeline::new(Config::default())
            .unwrap()
            .with_evaluator(|_: &Track| TrackQuality::default())
            .with_charges(|_: ParticleID| -> Option<f64> { None });
        let mut driver = EventDriver::new(pipeline);
        let mut records: Vec<EventRecord> = Vec::new();
        driver.process(0, &event(), &mut records).unwrap();
        // no track passes the hit requirements
        assert_eq!(records[1].num_jets(), 0);
        let EventScalars::Truth(scalars) = &records[0].scalars else {
            panic!("wrong scalars for truth record")
        };
        assert_eq!(scalars.num_charged, 0);
    }

    #[test]
    fn parallel_matches_sequential() {
        log_init();

        let mut events = vec![event(); 7];
        events[3].tracks = None;
        events[5].generator = None;

        let pipeline = Pipeline::new(Config::default()).unwrap();
        let (par_records, par_qa) = pipeline.par_records(&events, &NO_PROGRESS);

        let mut driver = EventDriver::new(pipeline);
        let mut records: Vec<EventRecord> = Vec::new();
        let nevents = driver.run(events.iter().cloned(), &mut records, &NO_PROGRESS).unwrap();
        assert_eq!(nevents, 7);
        assert_eq!(records, par_records);
        assert_eq!(records.len(), 12);
        let qa = driver.finish();
        assert_eq!(qa.records(View::Detector), par_qa.records(View::Detector));
        assert_eq!(qa.records(View::Truth).skipped, 1);
        assert_eq!(
            qa.object(ObjectKind::Track).unwrap().accepted,
            par_qa.object(ObjectKind::Track).unwrap().accepted
        );
    }
}
