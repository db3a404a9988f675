use crate::{
    Channel, ChannelKind, ChipError, Edge, EdgeKind, InvalidReference, Membrane, Organ, Pump,
    TopologyError, check_non_negative, check_positive,
};
use gems::Cuboid;
use serde::{Deserialize, Serialize};
use slab::Slab;
use std::{collections::VecDeque, ops::Deref};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl Deref for NodeId {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl Deref for EdgeId {
    type Target = usize;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Junction of the network
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub(crate) pressure: f64,
    pub(crate) ground: bool,
    pub(crate) sink: bool,
}

impl Node {
    /// Pressure [Pa] relative to ground as computed by the last hydraulic solve
    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn is_ground(&self) -> bool {
        self.ground
    }

    pub fn is_sink(&self) -> bool {
        self.sink
    }
}

/// Lumped hydraulic network of a chip.
///
/// Owns all nodes and edges. Membranes and organs refer to their channel, membrane and organ by
/// edge id.
#[derive(Clone, Debug, Default)]
pub struct Network {
    pub(crate) nodes: Slab<Node>,
    pub(crate) edges: Slab<Edge>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> NodeId {
        NodeId(self.nodes.insert(Node::default()))
    }

    pub fn add_channel(
        &mut self,
        node0: NodeId,
        node1: NodeId,
        height: f64,
        width: f64,
        length: f64,
        kind: ChannelKind,
    ) -> Result<EdgeId, ChipError> {
        self.check_node(node0)?;
        self.check_node(node1)?;
        let channel = Channel::new(height, width, length, kind)?;
        Ok(self.insert_edge(node0, node1, EdgeKind::Channel(channel)))
    }

    /// Overrides the geometric resistance of a channel with a fixed value [Pa s / m^3]
    pub fn set_channel_resistance(
        &mut self,
        channel: EdgeId,
        resistance: f64,
    ) -> Result<(), ChipError> {
        match self.edges.get_mut(*channel).map(|e| &mut e.kind) {
            Some(EdgeKind::Channel(c)) => c.set_resistance(resistance),
            Some(_) => Err(InvalidReference::Channel(channel).into()),
            None => Err(InvalidReference::Edge(channel).into()),
        }
    }

    /// Attaches a membrane along the full length of a channel
    pub fn add_membrane_to_channel(
        &mut self,
        channel: EdgeId,
        height: f64,
        width: f64,
        pore_radius: f64,
        porosity: f64,
    ) -> Result<EdgeId, ChipError> {
        let (node0, node1, length) = {
            let edge = self.edge(channel)?;
            let ch = edge
                .as_channel()
                .ok_or(InvalidReference::Channel(channel))?;
            (edge.node0, edge.node1, ch.length())
        };

        if !(porosity > 0. && porosity <= 1.) {
            return Err(ChipError::InvalidParameter {
                name: "porosity",
                value: porosity,
            });
        }

        let membrane = Membrane {
            geometry: Cuboid::new(
                check_positive("height", height)?,
                check_positive("width", width)?,
                length,
            ),
            pore_radius: check_positive("pore_radius", pore_radius)?,
            porosity,
            channel,
            organ: None,
        };
        Ok(self.insert_edge(node0, node1, EdgeKind::Membrane(membrane)))
    }

    /// Attaches an organ tank on the far side of a membrane. A membrane carries at most one
    /// organ.
    pub fn add_organ_to_membrane(
        &mut self,
        membrane: EdgeId,
        height: f64,
        width: f64,
    ) -> Result<EdgeId, ChipError> {
        let (node0, node1, length) = {
            let edge = self.edge(membrane)?;
            let m = edge
                .as_membrane()
                .ok_or(InvalidReference::Membrane(membrane))?;
            if let Some(organ) = m.organ {
                return Err(TopologyError::OrganAlreadyAttached { membrane, organ }.into());
            }
            (edge.node0, edge.node1, m.length())
        };

        let organ = Organ {
            geometry: Cuboid::new(
                check_positive("height", height)?,
                check_positive("width", width)?,
                length,
            ),
            membrane,
            resistance: 0.,
        };
        let id = self.insert_edge(node0, node1, EdgeKind::Organ(organ));

        if let Some(EdgeKind::Membrane(m)) = self.edges.get_mut(*membrane).map(|e| &mut e.kind) {
            m.organ = Some(id);
        }

        Ok(id)
    }

    /// Sets the diffusive resistance of an organ tank in series with its membrane
    pub fn set_organ_resistance(&mut self, organ: EdgeId, resistance: f64) -> Result<(), ChipError> {
        check_non_negative("resistance", resistance)?;
        match self.edges.get_mut(*organ).map(|e| &mut e.kind) {
            Some(EdgeKind::Organ(o)) => {
                o.resistance = resistance;
                Ok(())
            }
            Some(_) => Err(InvalidReference::Organ(organ).into()),
            None => Err(InvalidReference::Edge(organ).into()),
        }
    }

    /// Adds a pump moving `flow_rate` [m^3/s] from node0 into node1
    pub fn add_flow_rate_pump(
        &mut self,
        node0: NodeId,
        node1: NodeId,
        flow_rate: f64,
    ) -> Result<EdgeId, ChipError> {
        self.check_node(node0)?;
        self.check_node(node1)?;
        if !flow_rate.is_finite() {
            return Err(ChipError::InvalidParameter {
                name: "flow_rate",
                value: flow_rate,
            });
        }
        Ok(self.insert_edge(node0, node1, EdgeKind::Pump(Pump::FlowRate(flow_rate))))
    }

    /// Adds a pump which keeps node1 `pressure` [Pa] above node0
    pub fn add_pressure_pump(
        &mut self,
        node0: NodeId,
        node1: NodeId,
        pressure: f64,
    ) -> Result<EdgeId, ChipError> {
        self.check_node(node0)?;
        self.check_node(node1)?;
        if !pressure.is_finite() {
            return Err(ChipError::InvalidParameter {
                name: "pressure",
                value: pressure,
            });
        }
        Ok(self.insert_edge(node0, node1, EdgeKind::Pump(Pump::Pressure(pressure))))
    }

    pub fn set_ground(&mut self, node: NodeId) -> Result<(), ChipError> {
        self.node_mut(node)?.ground = true;
        Ok(())
    }

    pub fn set_sink(&mut self, node: NodeId) -> Result<(), ChipError> {
        self.node_mut(node)?.sink = true;
        Ok(())
    }

    fn insert_edge(&mut self, node0: NodeId, node1: NodeId, kind: EdgeKind) -> EdgeId {
        EdgeId(self.edges.insert(Edge::new(node0, node1, kind)))
    }

    fn check_node(&self, id: NodeId) -> Result<(), InvalidReference> {
        self.node(id).map(|_| ())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, InvalidReference> {
        self.nodes.get(*id).ok_or(InvalidReference::Node(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, InvalidReference> {
        self.nodes.get_mut(*id).ok_or(InvalidReference::Node(id))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge, InvalidReference> {
        self.edges.get(*id).ok_or(InvalidReference::Edge(id))
    }

    pub fn channel(&self, id: EdgeId) -> Result<&Channel, InvalidReference> {
        self.edge(id)?
            .as_channel()
            .ok_or(InvalidReference::Channel(id))
    }

    pub fn membrane(&self, id: EdgeId) -> Result<&Membrane, InvalidReference> {
        self.edge(id)?
            .as_membrane()
            .ok_or(InvalidReference::Membrane(id))
    }

    pub fn organ(&self, id: EdgeId) -> Result<&Organ, InvalidReference> {
        self.edge(id)?.as_organ().ok_or(InvalidReference::Organ(id))
    }

    pub fn pump(&self, id: EdgeId) -> Result<&Pump, InvalidReference> {
        self.edge(id)?.as_pump().ok_or(InvalidReference::Pump(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(i, n)| (NodeId(i), n))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter().map(|(i, e)| (EdgeId(i), e))
    }

    pub fn channels(&self) -> impl Iterator<Item = (EdgeId, &Edge, &Channel)> {
        self.edges()
            .filter_map(|(id, e)| e.as_channel().map(|c| (id, e, c)))
    }

    pub fn membranes(&self) -> impl Iterator<Item = (EdgeId, &Membrane)> {
        self.edges()
            .filter_map(|(id, e)| e.as_membrane().map(|m| (id, m)))
    }

    pub fn organs(&self) -> impl Iterator<Item = (EdgeId, &Organ)> {
        self.edges().filter_map(|(id, e)| e.as_organ().map(|o| (id, o)))
    }

    pub fn pumps(&self) -> impl Iterator<Item = (EdgeId, &Edge, &Pump)> {
        self.edges()
            .filter_map(|(id, e)| e.as_pump().map(|p| (id, e, p)))
    }

    /// All edges with the given node as one of their end points
    pub fn edges_at_node(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges()
            .filter(|(_, e)| e.is_incident(node))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn membranes_at_node(&self, node: NodeId) -> Vec<EdgeId> {
        self.edges()
            .filter(|(_, e)| e.is_incident(node) && e.as_membrane().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn membrane_of_channel(&self, channel: EdgeId) -> Result<Option<EdgeId>, InvalidReference> {
        self.channel(channel)?;
        Ok(self
            .membranes()
            .find(|(_, m)| m.channel == channel)
            .map(|(id, _)| id))
    }

    pub fn organ_of_membrane(&self, membrane: EdgeId) -> Result<Option<EdgeId>, InvalidReference> {
        Ok(self.membrane(membrane)?.organ)
    }

    pub fn grounds(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.ground)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn sinks(&self) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, n)| n.sink)
            .map(|(id, _)| id)
            .collect()
    }

    /// The unique ground node
    pub fn ground(&self) -> Result<NodeId, TopologyError> {
        match self.grounds().as_slice() {
            [] => Err(TopologyError::MissingGround),
            [g] => Ok(*g),
            more => Err(TopologyError::MultipleGrounds(more.len())),
        }
    }

    /// Checks that the network is well-posed for the hydraulic solver and returns the first
    /// problem found.
    pub fn validate(&self) -> Result<(), TopologyError> {
        let ground = self.ground()?;

        // Every node must be connected to ground by channels or pressure pumps.
        let mut visited = vec![false; self.nodes.capacity()];
        let mut queue = VecDeque::from([ground]);
        visited[*ground] = true;
        while let Some(node) = queue.pop_front() {
            for (_, edge) in self.edges() {
                let connects = matches!(
                    edge.kind,
                    EdgeKind::Channel(_) | EdgeKind::Pump(Pump::Pressure(_))
                );
                if !connects || !edge.is_incident(node) {
                    continue;
                }
                let other = if edge.node0 == node {
                    edge.node1
                } else {
                    edge.node0
                };
                if !visited[*other] {
                    visited[*other] = true;
                    queue.push_back(other);
                }
            }
        }
        if let Some((id, _)) = self.nodes().find(|(id, _)| !visited[**id]) {
            return Err(TopologyError::Unreachable(id));
        }

        for (id, edge) in self.edges() {
            match &edge.kind {
                EdgeKind::Channel(c) => {
                    if !(c.resistance() > 0. && c.resistance().is_finite()) {
                        return Err(TopologyError::NonPositiveResistance(id));
                    }
                }
                EdgeKind::Membrane(m) => {
                    let channel_length = self
                        .channel(m.channel)
                        .map(|c| c.length())
                        .unwrap_or(f64::NAN);
                    check_length(id, m.length(), m.channel, channel_length)?;

                    let organ = m.organ.ok_or(TopologyError::MissingOrgan(id))?;
                    let organ_length = self.organ(organ).map(|o| o.length()).unwrap_or(f64::NAN);
                    check_length(id, m.length(), organ, organ_length)?;
                }
                EdgeKind::Organ(o) => {
                    let attached = self.membrane(o.membrane).is_ok_and(|m| m.organ == Some(id));
                    if !attached {
                        return Err(TopologyError::DetachedOrgan(id));
                    }
                }
                EdgeKind::Pump(_) => {}
            }
        }

        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Recomputes the geometric channel resistances for a liquid with the given viscosity
    pub fn update_channel_resistances(&mut self, viscosity: f64) {
        for (_, edge) in self.edges.iter_mut() {
            if let EdgeKind::Channel(c) = &mut edge.kind {
                c.update_resistance(viscosity);
            }
        }
    }

    pub fn flow_rate(&self, edge: EdgeId) -> Result<f64, InvalidReference> {
        Ok(self.edge(edge)?.flow_rate())
    }

    /// Pressure at node0 minus pressure at node1
    pub fn pressure_drop(&self, edge: EdgeId) -> Result<f64, InvalidReference> {
        let e = self.edge(edge)?;
        Ok(self.node(e.node0)?.pressure - self.node(e.node1)?.pressure)
    }

    /// Smallest time [s] any channel needs to be flushed completely by its current flow.
    ///
    /// Returns None if no channel carries flow.
    pub fn minimal_time_step(&self) -> Option<f64> {
        self.channels()
            .filter(|(_, e, _)| e.flow_rate != 0.)
            .map(|(_, e, c)| c.volume() / e.flow_rate.abs())
            .fold(None, |acc: Option<f64>, t| {
                Some(acc.map_or(t, |a| a.min(t)))
            })
    }

    pub(crate) fn set_pressure(&mut self, node: NodeId, pressure: f64) {
        if let Some(n) = self.nodes.get_mut(*node) {
            n.pressure = pressure;
        }
    }

    pub(crate) fn set_flow_rate(&mut self, edge: EdgeId, flow_rate: f64) {
        if let Some(e) = self.edges.get_mut(*edge) {
            e.flow_rate = flow_rate;
        }
    }
}

fn check_length(
    membrane: EdgeId,
    membrane_length: f64,
    other: EdgeId,
    other_length: f64,
) -> Result<(), TopologyError> {
    if (membrane_length - other_length).abs() <= 1e-12 * membrane_length.abs() {
        Ok(())
    } else {
        Err(TopologyError::LengthMismatch {
            membrane,
            other,
            membrane_length,
            other_length,
        })
    }
}
