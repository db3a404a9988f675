use crate::{EdgeId, EdgeKind, Mixture, Network, NodeId, TransportState};
use gems::Lerp;
use std::collections::BTreeMap;

/// Mixture arriving at every node which receives flow.
///
/// Inflows from channels and pumps are averaged weighted by their flow rate. Pumps deliver the
/// mixture given in `pump_mixtures`.
pub fn node_inflow_mixtures(
    net: &Network,
    state: &TransportState,
    pump_mixtures: &BTreeMap<EdgeId, Mixture>,
) -> BTreeMap<NodeId, Mixture> {
    let mut inflows: BTreeMap<NodeId, Vec<(f64, &Mixture)>> = BTreeMap::new();

    for (id, edge) in net.edges() {
        let q = edge.flow_rate();
        if q == 0. {
            continue;
        }

        let source = match edge.kind() {
            EdgeKind::Channel(_) => state.channel(id),
            EdgeKind::Pump(_) => pump_mixtures.get(&id),
            EdgeKind::Membrane(_) | EdgeKind::Organ(_) => None,
        };
        let Some(source) = source else {
            continue;
        };

        let target = if q > 0. { edge.node1() } else { edge.node0() };
        inflows.entry(target).or_default().push((q.abs(), source));
    }

    inflows
        .into_iter()
        .filter_map(|(node, items)| Mixture::weighted_average(items).map(|m| (node, m)))
        .collect()
}

/// First-order upwind transport of species along channels.
///
/// Each channel is refreshed with the mixture arriving at its upstream node. The refreshed
/// fraction is the volume flowing in during `dt` relative to the channel volume, capped at 1.
/// All node mixtures are computed from the state before the update.
pub fn advect(
    net: &Network,
    state: &mut TransportState,
    pump_mixtures: &BTreeMap<EdgeId, Mixture>,
    dt: f64,
) {
    let inflows = node_inflow_mixtures(net, state, pump_mixtures);

    let mut updates = Vec::new();
    for (id, edge, channel) in net.channels() {
        let q = edge.flow_rate();
        if q == 0. {
            continue;
        }
        let upstream = if q > 0. { edge.node0() } else { edge.node1() };
        let Some(incoming) = inflows.get(&upstream) else {
            continue;
        };

        let fraction = (q.abs() * dt / channel.volume()).min(1.);
        let current = state.channel(id).cloned().unwrap_or_default();
        updates.push((id, current.lerp(fraction, incoming)));
    }

    for (id, mixture) in updates {
        state.channels.insert(id, mixture);
    }
}
