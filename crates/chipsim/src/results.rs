use crate::{EdgeId, FluidId, Mixture, Network, NodeId, TransportState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of the chip at one point in time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Simulated time [s]
    pub time: f64,

    /// Node pressures [Pa]
    pub pressures: BTreeMap<NodeId, f64>,

    /// Edge flow rates [m^3/s]
    pub flow_rates: BTreeMap<EdgeId, f64>,

    /// Species concentrations of channels and organs
    pub concentrations: BTreeMap<EdgeId, Mixture>,
}

impl Snapshot {
    pub fn capture(time: f64, net: &Network, state: &TransportState) -> Self {
        Self {
            time,
            pressures: net.nodes().map(|(id, n)| (id, n.pressure())).collect(),
            flow_rates: net.edges().map(|(id, e)| (id, e.flow_rate())).collect(),
            concentrations: state.iter().map(|(id, m)| (id, m.clone())).collect(),
        }
    }

    pub fn pressure(&self, node: NodeId) -> Option<f64> {
        self.pressures.get(&node).copied()
    }

    pub fn flow_rate(&self, edge: EdgeId) -> Option<f64> {
        self.flow_rates.get(&edge).copied()
    }

    /// Concentration of a species in a channel or organ
    pub fn concentration(&self, edge: EdgeId, species: FluidId) -> Option<f64> {
        self.concentrations
            .get(&edge)
            .map(|m| m.concentration(species))
    }
}

/// Snapshots recorded during a simulation run in order of time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    snapshots: Vec<Snapshot>,
}

impl SimulationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub(crate) fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn last_state(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Latest snapshot recorded at or before the given time [s]
    pub fn snapshot_at(&self, time: f64) -> Option<&Snapshot> {
        let tolerance = 1e-9 * time.abs().max(1.);
        let n = self
            .snapshots
            .partition_point(|s| s.time <= time + tolerance);
        n.checked_sub(1).map(|i| &self.snapshots[i])
    }

    /// Concentration of a species in a channel or organ at the given time
    pub fn concentration_at(&self, edge: EdgeId, species: FluidId, time: f64) -> Option<f64> {
        self.snapshot_at(time)?.concentration(edge, species)
    }

    /// Concentration of a species in a channel or organ over all recorded snapshots
    pub fn concentration_series(&self, edge: EdgeId, species: FluidId) -> Vec<(f64, f64)> {
        self.snapshots
            .iter()
            .filter_map(|s| s.concentration(edge, species).map(|c| (s.time, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(time: f64, c: f64) -> Snapshot {
        Snapshot {
            time,
            pressures: BTreeMap::from([(NodeId(0), 0.), (NodeId(1), 10. * time)]),
            flow_rates: BTreeMap::from([(EdgeId(0), 1e-9)]),
            concentrations: BTreeMap::from([(
                EdgeId(2),
                Mixture::from_iter([(FluidId(1), c)]),
            )]),
        }
    }

    fn results() -> SimulationResults {
        let mut r = SimulationResults::new();
        for (i, c) in [0., 0.1, 0.3, 0.6].into_iter().enumerate() {
            r.push(snapshot(10. * i as f64, c));
        }
        r
    }

    #[test]
    fn test_snapshot_at() {
        let r = results();
        assert_eq!(r.len(), 4);
        assert!(r.snapshot_at(-1.).is_none());
        assert_eq!(r.snapshot_at(0.).unwrap().time, 0.);
        assert_eq!(r.snapshot_at(15.).unwrap().time, 10.);
        assert_eq!(r.snapshot_at(20.).unwrap().time, 20.);
        assert_eq!(r.snapshot_at(1e6).unwrap().time, 30.);
        assert_eq!(r.last_state().unwrap().time, 30.);
    }

    #[test]
    fn test_lookups() {
        let r = results();
        assert_eq!(r.concentration_at(EdgeId(2), FluidId(1), 25.), Some(0.3));
        assert_eq!(r.concentration_at(EdgeId(2), FluidId(7), 25.), Some(0.));
        assert_eq!(r.concentration_at(EdgeId(5), FluidId(1), 25.), None);

        let s = r.snapshot_at(20.).unwrap();
        assert_eq!(s.pressure(NodeId(1)), Some(200.));
        assert_eq!(s.flow_rate(EdgeId(0)), Some(1e-9));
        assert_eq!(s.flow_rate(EdgeId(3)), None);

        let series = r.concentration_series(EdgeId(2), FluidId(1));
        assert_eq!(series, vec![(0., 0.), (10., 0.1), (20., 0.3), (30., 0.6)]);
    }
}
