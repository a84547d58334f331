use std::collections::HashSet;

use corrjet::{
    cluster::{JetAlgorithm, JetDefinition, RecombinationScheme},
    config::{Config, JetConfig},
    prelude::*,
    provenance::{ParticlePool, Provenance},
    qa::ObjectKind,
    record::EventScalars,
    source::{
        CaloCluster, FlowElement, GenEvent, GenParticle, Track, Vertex,
    },
};
use particle_id::ParticleID;

fn log_init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// massless particle with transverse momentum `pt` at pseudorapidity `eta`
fn particle(barcode: i32, pid: i32, pt: f64, eta: f64, phi: f64) -> Option<GenParticle> {
    let pz = pt * eta.sinh();
    Some(GenParticle {
        barcode,
        status: 1,
        pid: ParticleID::new(pid),
        e: (pt * pt + pz * pz).sqrt(),
        px: pt * phi.cos(),
        py: pt * phi.sin(),
        pz,
        outgoing_parton: false,
    })
}

fn track(id: i32, pt: f64, phi: f64, quality: f64) -> Option<Track> {
    Some(Track {
        id,
        px: pt * phi.cos(),
        py: pt * phi.sin(),
        pz: 0.1 * pt,
        quality,
        layers: (0..3).chain(3..5).chain(7..50).collect(),
    })
}

fn event(n: usize) -> RawEvent {
    let shift = 0.3 * n as f64;
    let tracks = (0..6)
        .map(|i| track(i, 1. + i as f64, shift + 0.05 * i as f64 + (i % 2) as f64 * 3., 1.))
        .chain([track(99, 5., shift, 20.)])
        .collect();
    let flow = (0..3)
        .map(|i| {
            Some(FlowElement {
                id: 100 + i,
                e: 2.,
                px: 1.5 * (shift - i as f64).cos(),
                py: 1.5 * (shift - i as f64).sin(),
                pz: 0.5,
            })
        })
        .collect();
    let cluster = |id, x: f64, y: f64| {
        Some(CaloCluster {
            id,
            energy: 3.,
            position: [x, y, 10.],
        })
    };
    let particles = (0..8)
        .map(|i| {
            particle(
                1000 + i,
                if i % 3 == 0 { 22 } else { 211 },
                0.5 + i as f64,
                0.1 * i as f64 - 0.3,
                shift + 0.7 * i as f64,
            )
        })
        .collect();
    RawEvent {
        tracks: Some(tracks),
        flow: Some(flow),
        vertices: Some(vec![Vertex { x: 0.01, y: -0.02, z: 2. }]),
        em_clusters: Some(vec![cluster(1, 100., 10.), None, cluster(2, -50., 80.)]),
        inner_hcal_clusters: Some(vec![cluster(3, 0., 120.)]),
        outer_hcal_clusters: Some(vec![cluster(4, 150., -20.)]),
        generator: Some(GenEvent {
            vertex: Some([0.01, -0.02, 2.]),
            particles,
        }),
    }
}

fn all_inputs() -> Config {
    let mut config = Config::default();
    config.sources.flow = true;
    config.sources.em_clusters = true;
    config.sources.hcal_clusters = true;
    config
}

#[test]
fn missing_tracks_only_skip_detector_view() {
    log_init();

    let mut ev = event(0);
    ev.tracks = None;
    let mut driver = EventDriver::new(Pipeline::new(Config::default()).unwrap());
    let mut records: Vec<EventRecord> = Vec::new();
    driver.process(0, &ev, &mut records).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].view(), View::Truth);
    assert!(records[0].num_jets() > 0);

    driver.process(1, &event(1), &mut records).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2].view(), View::Detector);
    assert_eq!(records[2].event, 1);

    let qa = driver.finish();
    assert_eq!(qa.records(View::Detector).skipped, 1);
    assert_eq!(qa.records(View::Detector).committed, 1);
    assert_eq!(qa.records(View::Truth).committed, 2);
}

#[test]
fn repeated_runs_are_identical() {
    log_init();

    let events: Vec<_> = (0..5).map(event).collect();
    let run = || {
        let mut driver = EventDriver::new(Pipeline::new(all_inputs()).unwrap());
        let mut records: Vec<EventRecord> = Vec::new();
        driver.run(&events, &mut records, &NO_PROGRESS).unwrap();
        records
    };
    let first = run();
    assert_eq!(first.len(), 10);
    assert_eq!(first, run());

    // reprocessing the same event with the same driver
    let mut driver = EventDriver::new(Pipeline::new(all_inputs()).unwrap());
    let mut records: Vec<EventRecord> = Vec::new();
    driver.process(0, &events[3], &mut records).unwrap();
    driver.process(0, &events[3], &mut records).unwrap();
    assert_eq!(records[0], records[2]);
    assert_eq!(records[1], records[3]);
    assert_eq!(driver.stage(), Stage::Committed);
}

#[test]
fn provenance_covers_accepted_inputs() {
    log_init();

    let pipeline = Pipeline::new(all_inputs()).unwrap();
    for n in 0..4 {
        let ev = event(n);
        for view in [View::Truth, View::Detector] {
            let mut pool = ParticlePool::new();
            let mut qa = QaAggregator::new();
            let scalars = pipeline.collect(view, &ev, &mut pool, &mut qa).unwrap();
            let kinds: &[ObjectKind] = match view {
                View::Truth => &[ObjectKind::Particle],
                View::Detector => &[
                    ObjectKind::Track,
                    ObjectKind::Flow,
                    ObjectKind::EmCluster,
                    ObjectKind::HcalCluster,
                ],
            };
            let accepted: u64 = kinds
                .iter()
                .map(|k| qa.object(*k).unwrap().accepted)
                .sum();
            assert_eq!(accepted as usize, pool.len());
            let provenance: HashSet<Provenance> =
                pool.iter().map(|(_, p)| p).collect();
            assert_eq!(provenance.len(), pool.len());

            let record = pipeline.build_record(n, scalars, &pool, &mut qa);
            let mut constituents: Vec<_> = record
                .jets
                .iter()
                .flat_map(|j| j.constituents.iter().map(|c| c.provenance))
                .collect();
            assert_eq!(constituents.len(), pool.len());
            constituents.sort();
            constituents.dedup();
            assert_eq!(constituents.len(), pool.len());
        }
    }
}

#[test]
fn detector_collection_order() {
    log_init();

    let pipeline = Pipeline::new(all_inputs()).unwrap();
    let mut pool = ParticlePool::new();
    let mut qa = QaAggregator::new();
    let scalars = pipeline
        .collect(View::Detector, &event(0), &mut pool, &mut qa)
        .unwrap();
    let kinds: Vec<_> = pool.iter().map(|(_, p)| p.kind()).collect();
    let mut sorted = kinds.clone();
    // flow, tracks, EM, inner and outer hadronic clusters
    sorted.sort_by_key(|k| {
        [
            corrjet::provenance::SourceKind::Flow,
            corrjet::provenance::SourceKind::Track,
            corrjet::provenance::SourceKind::EmCluster,
            corrjet::provenance::SourceKind::InnerHcalCluster,
            corrjet::provenance::SourceKind::OuterHcalCluster,
        ]
        .iter()
        .position(|o| o == k)
    });
    assert_eq!(kinds, sorted);
    assert_eq!(pool.count(corrjet::provenance::SourceKind::Track), 6);

    let EventScalars::Detector(scalars) = scalars else {
        panic!("expected detector scalars")
    };
    assert_eq!(scalars.num_tracks, 7);
    assert_eq!(scalars.sum_ecal, 6.);
    assert_eq!(scalars.sum_hcal, 6.);
    assert_eq!(scalars.vertex, [0.01, -0.02, 2.]);
}

#[test]
fn low_quality_track_is_seen_not_accepted() {
    log_init();

    let ev = RawEvent {
        tracks: Some(vec![track(7, 3., 0., -5.)]),
        ..Default::default()
    };
    let config = Config {
        is_mc: false,
        ..Default::default()
    };
    let mut driver = EventDriver::new(Pipeline::new(config).unwrap());
    let mut records: Vec<EventRecord> = Vec::new();
    driver.process(0, &ev, &mut records).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].num_jets(), 0);
    let qa = driver.finish();
    let tracks = qa.object(ObjectKind::Track).unwrap();
    assert_eq!(tracks.seen, 1);
    assert_eq!(tracks.accepted, 0);
}

#[test]
fn three_particle_scenario() {
    log_init();

    let ev = RawEvent {
        generator: Some(GenEvent {
            vertex: None,
            particles: vec![
                particle(1, 211, 10., 0., 0.),
                particle(2, 211, 9., 0., 0.1),
                particle(3, 211, 1., 2., 2.),
            ],
        }),
        ..Default::default()
    };
    let mut config = Config::default();
    config.jet = JetConfig {
        definition: JetDefinition {
            algorithm: JetAlgorithm::AntiKt,
            radius: 0.4,
            scheme: RecombinationScheme::E,
        },
        ..Default::default()
    };
    // the third particle is forward
    config.cuts.particle.kinematics.eta = (-3., 3.).into();
    let pipeline = Pipeline::new(config).unwrap();
    let mut pool = ParticlePool::new();
    let mut qa = QaAggregator::new();
    let record = pipeline
        .view_record(0, View::Truth, &ev, &mut pool, &mut qa)
        .unwrap();
    assert_eq!(record.num_jets(), 2);
    let mut jets = record.jets.clone();
    jets.sort_by_key(|j| j.num_constituents());
    assert_eq!(jets[0].num_constituents(), 1);
    assert!((jets[0].pt - 1.).abs() < 1e-9);
    assert_eq!(jets[1].num_constituents(), 2);
    let ptsum: f64 = jets[1].constituents.iter().map(|c| c.jt).sum();
    assert!((ptsum - 19.).abs() < 1e-9);
    assert!(jets[1].pt > 18.9 && jets[1].pt < 19.);
    let EventScalars::Truth(scalars) = &record.scalars else {
        panic!("expected truth scalars")
    };
    assert_eq!(scalars.vertex, [corrjet::record::UNSET; 3]);
    assert_eq!(scalars.num_charged, 3);
}
