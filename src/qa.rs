use std::collections::BTreeMap;
use std::f64::consts::PI;

use log::info;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::four_vector::FourVector;
use crate::provenance::SourceKind;
use crate::record::View;

/// Object categories monitored by the QA
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
pub enum ObjectKind {
    #[strum(to_string = "tracks")]
    Track,
    #[strum(to_string = "EM clusters")]
    EmCluster,
    #[strum(to_string = "hadronic clusters")]
    HcalCluster,
    #[strum(to_string = "particle-flow elements")]
    Flow,
    #[strum(to_string = "generator particles")]
    Particle,
    #[strum(to_string = "truth jets")]
    TruthJet,
    #[strum(to_string = "reco jets")]
    RecoJet,
    #[strum(to_string = "truth constituents")]
    TruthConstituent,
    #[strum(to_string = "reco constituents")]
    RecoConstituent,
}

impl From<SourceKind> for ObjectKind {
    fn from(kind: SourceKind) -> Self {
        match kind {
            SourceKind::Track => ObjectKind::Track,
            SourceKind::Flow => ObjectKind::Flow,
            SourceKind::EmCluster => ObjectKind::EmCluster,
            SourceKind::InnerHcalCluster | SourceKind::OuterHcalCluster => {
                ObjectKind::HcalCluster
            }
            SourceKind::Particle => ObjectKind::Particle,
        }
    }
}

impl ObjectKind {
    pub fn jet(view: View) -> Self {
        match view {
            View::Truth => ObjectKind::TruthJet,
            View::Detector => ObjectKind::RecoJet,
        }
    }

    pub fn constituent(view: View) -> Self {
        match view {
            View::Truth => ObjectKind::TruthConstituent,
            View::Detector => ObjectKind::RecoConstituent,
        }
    }
}

/// Transverse momentum, pseudorapidity, azimuth, and energy
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Kinematics {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub e: f64,
}

impl From<&FourVector> for Kinematics {
    fn from(p: &FourVector) -> Self {
        Self {
            pt: p.pt().raw(),
            eta: p.eta().raw(),
            phi: p.phi_std().raw(),
            e: p.e().raw(),
        }
    }
}

/// Histogram with equidistant bins
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Histogram {
    min: f64,
    max: f64,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
    entries: u64,
    sum: f64,
    sum_sq: f64,
}

impl Histogram {
    pub fn new(nbins: usize, min: f64, max: f64) -> Self {
        assert!(nbins > 0 && min < max);
        Self {
            min,
            max,
            bins: vec![0; nbins],
            underflow: 0,
            overflow: 0,
            entries: 0,
            sum: 0.,
            sum_sq: 0.,
        }
    }

    pub fn fill(&mut self, x: f64) {
        self.entries += 1;
        self.sum += x;
        self.sum_sq += x * x;
        if x < self.min {
            self.underflow += 1;
        } else if x >= self.max {
            self.overflow += 1;
        } else {
            let width = (self.max - self.min) / self.bins.len() as f64;
            let idx = ((x - self.min) / width) as usize;
            let idx = idx.min(self.bins.len() - 1);
            self.bins[idx] += 1;
        }
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    pub fn bins(&self) -> &[u64] {
        &self.bins
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn mean(&self) -> Option<f64> {
        if self.entries == 0 {
            None
        } else {
            Some(self.sum / self.entries as f64)
        }
    }

    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let var = self.sum_sq / self.entries as f64 - mean * mean;
        Some(var.max(0.).sqrt())
    }

    /// Add the entries of another histogram with identical binning
    pub fn merge(&mut self, other: &Histogram) {
        assert_eq!(self.bins.len(), other.bins.len());
        for (b, o) in self.bins.iter_mut().zip(other.bins.iter()) {
            *b += o;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.entries += other.entries;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }
}

/// Counters and distributions for one object category
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct ObjectQa {
    pub seen: u64,
    pub accepted: u64,
    pub energy_sum: f64,
    pub pt: Histogram,
    pub eta: Histogram,
    pub phi: Histogram,
    pub energy: Histogram,
    /// Number of accepted objects per event
    pub per_event: Histogram,
}

impl Default for ObjectQa {
    fn default() -> Self {
        Self {
            seen: 0,
            accepted: 0,
            energy_sum: 0.,
            pt: Histogram::new(200, 0., 100.),
            eta: Histogram::new(100, -5., 5.),
            phi: Histogram::new(126, -PI, PI),
            energy: Histogram::new(200, 0., 100.),
            per_event: Histogram::new(500, 0., 500.),
        }
    }
}

impl ObjectQa {
    fn merge(&mut self, other: &ObjectQa) {
        self.seen += other.seen;
        self.accepted += other.accepted;
        self.energy_sum += other.energy_sum;
        self.pt.merge(&other.pt);
        self.eta.merge(&other.eta);
        self.phi.merge(&other.phi);
        self.energy.merge(&other.energy);
        self.per_event.merge(&other.per_event);
    }
}

/// Jet-level distributions for one view
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct JetQa {
    pub num_constituents: Histogram,
    pub area: Histogram,
}

impl Default for JetQa {
    fn default() -> Self {
        Self {
            num_constituents: Histogram::new(100, 0., 100.),
            area: Histogram::new(100, 0., 5.),
        }
    }
}

/// How many records of a view were committed or skipped
#[derive(Deserialize, Serialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub committed: u64,
    pub skipped: u64,
}

/// Quality assurance aggregates accumulated over a run
///
/// Updated by the collectors and the feature builder while events are
/// processed, and read out once at the end of the run.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct QaAggregator {
    objects: BTreeMap<ObjectKind, ObjectQa>,
    jets: BTreeMap<View, JetQa>,
    records: BTreeMap<View, RecordCounts>,
}

impl Default for QaAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl QaAggregator {
    pub fn new() -> Self {
        Self {
            objects: ObjectKind::iter().map(|k| (k, ObjectQa::default())).collect(),
            jets: View::iter().map(|v| (v, JetQa::default())).collect(),
            records: View::iter().map(|v| (v, RecordCounts::default())).collect(),
        }
    }

    fn object_mut(&mut self, kind: ObjectKind) -> &mut ObjectQa {
        self.objects.entry(kind).or_default()
    }

    /// An object was encountered, whether it is accepted or not
    pub fn seen(&mut self, kind: ObjectKind) {
        self.object_mut(kind).seen += 1;
    }

    /// An object passed all cuts
    pub fn accepted(&mut self, kind: ObjectKind, k: Kinematics) {
        let qa = self.object_mut(kind);
        qa.accepted += 1;
        qa.energy_sum += k.e;
        qa.pt.fill(k.pt);
        qa.eta.fill(k.eta);
        qa.phi.fill(k.phi);
        qa.energy.fill(k.e);
    }

    /// Number of accepted objects in one event
    pub fn event_count(&mut self, kind: ObjectKind, n: usize) {
        self.object_mut(kind).per_event.fill(n as f64);
    }

    pub fn jet(&mut self, view: View, num_constituents: usize, area: f64) {
        let qa = self.jets.entry(view).or_default();
        qa.num_constituents.fill(num_constituents as f64);
        qa.area.fill(area);
    }

    pub fn committed(&mut self, view: View) {
        self.records.entry(view).or_default().committed += 1;
    }

    pub fn skipped(&mut self, view: View) {
        self.records.entry(view).or_default().skipped += 1;
    }

    pub fn object(&self, kind: ObjectKind) -> Option<&ObjectQa> {
        self.objects.get(&kind)
    }

    pub fn jets(&self, view: View) -> Option<&JetQa> {
        self.jets.get(&view)
    }

    pub fn records(&self, view: View) -> RecordCounts {
        self.records.get(&view).copied().unwrap_or_default()
    }

    /// Combine with the aggregates from another run segment
    pub fn merge(&mut self, other: &QaAggregator) {
        for (kind, qa) in &other.objects {
            self.object_mut(*kind).merge(qa);
        }
        for (view, qa) in &other.jets {
            let mine = self.jets.entry(*view).or_default();
            mine.num_constituents.merge(&qa.num_constituents);
            mine.area.merge(&qa.area);
        }
        for (view, counts) in &other.records {
            let mine = self.records.entry(*view).or_default();
            mine.committed += counts.committed;
            mine.skipped += counts.skipped;
        }
    }

    pub fn dump_info(&self) {
        for (view, counts) in &self.records {
            info!(
                "{view} records: {} committed, {} skipped",
                counts.committed, counts.skipped
            );
        }
        for (kind, qa) in &self.objects {
            if qa.seen == 0 && qa.accepted == 0 {
                continue;
            }
            info!(
                "{kind}: {} seen, {} accepted, summed energy {:.3} GeV",
                qa.seen, qa.accepted, qa.energy_sum
            );
        }
        for (view, qa) in &self.jets {
            let h = &qa.num_constituents;
            if let (Some(mean), Some(sd)) = (h.mean(), h.std_dev()) {
                info!("{view} jets: {mean:.2} ± {sd:.2} constituents");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram() {
        let mut h = Histogram::new(10, 0., 10.);
        h.fill(-1.);
        h.fill(0.);
        h.fill(9.99);
        h.fill(10.);
        assert_eq!(h.underflow(), 1);
        assert_eq!(h.overflow(), 1);
        assert_eq!(h.bins()[0], 1);
        assert_eq!(h.bins()[9], 1);
        assert_eq!(h.entries(), 4);

        let mut spread = Histogram::new(10, 0., 10.);
        assert_eq!(spread.std_dev(), None);
        spread.fill(2.);
        spread.fill(4.);
        spread.fill(4.);
        spread.fill(6.);
        assert_eq!(spread.mean(), Some(4.));
        assert!((spread.std_dev().unwrap() - 2f64.sqrt()).abs() < 1e-12);

        let mut other = Histogram::new(10, 0., 10.);
        other.fill(5.5);
        h.merge(&other);
        assert_eq!(h.bins()[5], 1);
        assert_eq!(h.entries(), 5);
    }

    #[test]
    fn counters() {
        let mut qa = QaAggregator::new();
        qa.seen(ObjectKind::Track);
        qa.seen(ObjectKind::Track);
        qa.accepted(
            ObjectKind::Track,
            Kinematics { pt: 1., eta: 0., phi: 0., e: 2. },
        );
        let track_qa = qa.object(ObjectKind::Track).unwrap();
        assert_eq!(track_qa.seen, 2);
        assert_eq!(track_qa.accepted, 1);
        assert_eq!(track_qa.energy_sum, 2.);
        assert_eq!(track_qa.pt.entries(), 1);

        let mut total = QaAggregator::new();
        total.merge(&qa);
        total.merge(&qa);
        assert_eq!(total.object(ObjectKind::Track).unwrap().seen, 4);
        assert_eq!(total.object(ObjectKind::Track).unwrap().energy_sum, 4.);

        qa.committed(View::Truth);
        qa.skipped(View::Detector);
        assert_eq!(qa.records(View::Truth).committed, 1);
        assert_eq!(qa.records(View::Detector).skipped, 1);
    }
}
