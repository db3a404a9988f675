use crate::{ChipError, EdgeId, EdgeKind, Network, NodeId, Pump};
use gems::solve_linear_system;
use nalgebra::{DMatrix, DVector};
use std::collections::HashMap;

/// Computes node pressures and edge flow rates with modified nodal analysis.
///
/// Unknowns are the pressures of all nodes except ground plus the flow through every pressure
/// pump. Channels contribute their conductance, flow rate pumps a fixed injection and pressure
/// pumps a constraint row. Membranes and organs do not take part.
#[derive(Debug, Clone)]
pub struct HydraulicSolver {
    singularity_threshold: f64,
}

impl Default for HydraulicSolver {
    fn default() -> Self {
        Self::new(1e-12)
    }
}

impl HydraulicSolver {
    pub fn new(singularity_threshold: f64) -> Self {
        Self {
            singularity_threshold,
        }
    }

    /// Solves the network and stores pressures and flow rates on its nodes and edges
    pub fn solve(&self, net: &mut Network) -> Result<(), ChipError> {
        let ground = net.ground()?;

        // Index of the unknown for every non-ground node
        let node_index: HashMap<NodeId, usize> = net
            .nodes()
            .map(|(id, _)| id)
            .filter(|id| *id != ground)
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();
        let n = node_index.len();

        // Index of the unknown flow for every pressure pump
        let pump_index: HashMap<EdgeId, usize> = net
            .pumps()
            .filter(|(_, _, p)| p.is_pressure())
            .map(|(id, _, _)| id)
            .enumerate()
            .map(|(i, id)| (id, n + i))
            .collect();
        let dim = n + pump_index.len();

        let mut a = DMatrix::<f64>::zeros(dim, dim);
        let mut b = DVector::<f64>::zeros(dim);

        for (id, edge) in net.edges() {
            let i0 = node_index.get(&edge.node0()).copied();
            let i1 = node_index.get(&edge.node1()).copied();

            match edge.kind() {
                EdgeKind::Channel(c) => {
                    let g = 1. / c.resistance();
                    if let Some(i0) = i0 {
                        a[(i0, i0)] += g;
                    }
                    if let Some(i1) = i1 {
                        a[(i1, i1)] += g;
                    }
                    if let (Some(i0), Some(i1)) = (i0, i1) {
                        a[(i0, i1)] -= g;
                        a[(i1, i0)] -= g;
                    }
                }
                EdgeKind::Pump(Pump::FlowRate(q)) => {
                    if let Some(i0) = i0 {
                        b[i0] -= q;
                    }
                    if let Some(i1) = i1 {
                        b[i1] += q;
                    }
                }
                EdgeKind::Pump(Pump::Pressure(p)) => {
                    let k = pump_index[&id];
                    // pump flow leaves node0 and enters node1
                    if let Some(i0) = i0 {
                        a[(i0, k)] += 1.;
                        a[(k, i0)] -= 1.;
                    }
                    if let Some(i1) = i1 {
                        a[(i1, k)] -= 1.;
                        a[(k, i1)] += 1.;
                    }
                    b[k] = *p;
                }
                EdgeKind::Membrane(_) | EdgeKind::Organ(_) => {}
            }
        }

        let x = solve_linear_system(a, &b, self.singularity_threshold)?;

        net.set_pressure(ground, 0.);
        for (&node, &i) in node_index.iter() {
            net.set_pressure(node, x[i]);
        }

        let mut flows = Vec::with_capacity(net.edge_count());
        for (id, edge) in net.edges() {
            let q = match edge.kind() {
                EdgeKind::Channel(c) => net.pressure_drop(id)? / c.resistance(),
                EdgeKind::Pump(Pump::FlowRate(q)) => *q,
                EdgeKind::Pump(Pump::Pressure(_)) => x[pump_index[&id]],
                EdgeKind::Membrane(_) | EdgeKind::Organ(_) => 0.,
            };
            flows.push((id, q));
        }
        for (id, q) in flows {
            net.set_flow_rate(id, q);
        }

        log::debug!("solved hydraulic system with {dim} unknowns");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelKind, TopologyError};
    use gems::LinearSolverError;

    fn channel(net: &mut Network, a: NodeId, b: NodeId, r: f64) -> EdgeId {
        let c = net
            .add_channel(a, b, 1e-4, 1e-3, 1e-2, ChannelKind::Normal)
            .unwrap();
        net.set_channel_resistance(c, r).unwrap();
        c
    }

    /// Signed sum of flows entering a node
    fn net_inflow(net: &Network, node: NodeId) -> f64 {
        net.edges()
            .map(|(_, e)| {
                if e.node1() == node {
                    e.flow_rate()
                } else if e.node0() == node {
                    -e.flow_rate()
                } else {
                    0.
                }
            })
            .sum()
    }

    #[test]
    fn test_series_flow_pump() {
        let mut net = Network::new();
        let g = net.add_node();
        let n0 = net.add_node();
        let n1 = net.add_node();
        let pump = net.add_flow_rate_pump(g, n0, 2e-9).unwrap();
        let c0 = channel(&mut net, n0, n1, 1e9);
        let c1 = channel(&mut net, n1, g, 3e9);
        net.set_ground(g).unwrap();

        HydraulicSolver::default().solve(&mut net).unwrap();

        approx::assert_relative_eq!(net.node(n0).unwrap().pressure(), 8., max_relative = 1e-9);
        approx::assert_relative_eq!(net.node(n1).unwrap().pressure(), 6., max_relative = 1e-9);
        assert_eq!(net.node(g).unwrap().pressure(), 0.);
        approx::assert_relative_eq!(net.flow_rate(c0).unwrap(), 2e-9, max_relative = 1e-9);
        approx::assert_relative_eq!(net.flow_rate(c1).unwrap(), 2e-9, max_relative = 1e-9);
        assert_eq!(net.flow_rate(pump).unwrap(), 2e-9);
        approx::assert_relative_eq!(net.pressure_drop(c0).unwrap(), 2., max_relative = 1e-9);
    }

    #[test]
    fn test_parallel_pressure_pump() {
        let mut net = Network::new();
        let g = net.add_node();
        let n = net.add_node();
        let pump = net.add_pressure_pump(g, n, 100.).unwrap();
        let c0 = channel(&mut net, n, g, 1e9);
        let c1 = channel(&mut net, n, g, 4e9);
        net.set_ground(g).unwrap();

        HydraulicSolver::default().solve(&mut net).unwrap();

        approx::assert_relative_eq!(net.node(n).unwrap().pressure(), 100., max_relative = 1e-9);
        approx::assert_relative_eq!(net.flow_rate(c0).unwrap(), 1e-7, max_relative = 1e-9);
        approx::assert_relative_eq!(net.flow_rate(c1).unwrap(), 2.5e-8, max_relative = 1e-9);
        approx::assert_relative_eq!(net.flow_rate(pump).unwrap(), 1.25e-7, max_relative = 1e-9);
    }

    #[test]
    fn test_pressure_pump_between_internal_nodes() {
        // g -c0- a =pump=> b -c1- g
        let mut net = Network::new();
        let g = net.add_node();
        let a = net.add_node();
        let b = net.add_node();
        channel(&mut net, g, a, 1e9);
        let pump = net.add_pressure_pump(a, b, 50.).unwrap();
        channel(&mut net, b, g, 1e9);
        net.set_ground(g).unwrap();

        HydraulicSolver::default().solve(&mut net).unwrap();

        let pa = net.node(a).unwrap().pressure();
        let pb = net.node(b).unwrap().pressure();
        approx::assert_relative_eq!(pb - pa, 50., max_relative = 1e-9);
        approx::assert_relative_eq!(pa, -25., max_relative = 1e-9);
        approx::assert_relative_eq!(net.flow_rate(pump).unwrap(), 2.5e-8, max_relative = 1e-9);
        for node in [a, b] {
            approx::assert_abs_diff_eq!(net_inflow(&net, node), 0., epsilon = 1e-18);
        }
    }

    #[test]
    fn test_flow_conservation_in_loop() {
        // Wheatstone bridge driven by a flow pump
        let mut net = Network::new();
        let g = net.add_node();
        let top = net.add_node();
        let left = net.add_node();
        let right = net.add_node();
        net.add_flow_rate_pump(g, top, 1e-8).unwrap();
        channel(&mut net, top, left, 1e9);
        channel(&mut net, top, right, 2e9);
        channel(&mut net, left, right, 5e9);
        channel(&mut net, left, g, 3e9);
        channel(&mut net, right, g, 1e9);
        net.set_ground(g).unwrap();

        HydraulicSolver::default().solve(&mut net).unwrap();

        for node in [top, left, right] {
            approx::assert_abs_diff_eq!(net_inflow(&net, node), 0., epsilon = 1e-20);
        }
        approx::assert_abs_diff_eq!(net_inflow(&net, g), 0., epsilon = 1e-20);
    }

    #[test]
    fn test_membranes_and_organs_carry_no_flow() {
        let mut net = Network::new();
        let g = net.add_node();
        let n = net.add_node();
        net.add_pressure_pump(g, n, 1000.).unwrap();
        let c = channel(&mut net, n, g, 1e9);
        let m = net.add_membrane_to_channel(c, 55e-6, 1e-3, 1e-6, 0.1).unwrap();
        let o = net.add_organ_to_membrane(m, 1e-3, 1e-3).unwrap();
        net.set_ground(g).unwrap();

        HydraulicSolver::default().solve(&mut net).unwrap();

        assert!(net.pressure_drop(o).unwrap() != 0.);
        assert_eq!(net.flow_rate(o).unwrap(), 0.);
        assert_eq!(net.flow_rate(m).unwrap(), 0.);
    }

    #[test]
    fn test_floating_node_is_singular() {
        let mut net = Network::new();
        let g = net.add_node();
        let n = net.add_node();
        let _floating = net.add_node();
        net.add_flow_rate_pump(g, n, 1e-9).unwrap();
        channel(&mut net, n, g, 1e9);
        net.set_ground(g).unwrap();

        let err = HydraulicSolver::default().solve(&mut net).unwrap_err();
        assert!(matches!(
            err,
            ChipError::SolverSingularity(LinearSolverError::Singular { .. })
        ));
    }

    #[test]
    fn test_requires_single_ground() {
        let mut net = Network::new();
        net.add_node();
        assert_eq!(
            HydraulicSolver::default().solve(&mut net),
            Err(ChipError::Topology(TopologyError::MissingGround))
        );
    }
}
