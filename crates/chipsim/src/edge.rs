use crate::{Channel, Membrane, NodeId, Organ, Pump};

/// Element of the network between two nodes.
///
/// Flow rates are positive when liquid moves from `node0` to `node1`.
#[derive(Clone, Debug)]
pub struct Edge {
    pub(crate) node0: NodeId,
    pub(crate) node1: NodeId,
    pub(crate) kind: EdgeKind,
    pub(crate) flow_rate: f64,
}

#[derive(Clone, Debug)]
pub enum EdgeKind {
    Channel(Channel),
    Membrane(Membrane),
    Organ(Organ),
    Pump(Pump),
}

impl Edge {
    pub(crate) fn new(node0: NodeId, node1: NodeId, kind: EdgeKind) -> Self {
        Self {
            node0,
            node1,
            kind,
            flow_rate: 0.,
        }
    }

    pub fn node0(&self) -> NodeId {
        self.node0
    }

    pub fn node1(&self) -> NodeId {
        self.node1
    }

    pub fn nodes(&self) -> [NodeId; 2] {
        [self.node0, self.node1]
    }

    pub fn is_incident(&self, node: NodeId) -> bool {
        self.node0 == node || self.node1 == node
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    /// Flow rate [m^3/s] as computed by the last hydraulic solve. Always 0 for membranes and
    /// organs.
    pub fn flow_rate(&self) -> f64 {
        match self.kind {
            EdgeKind::Membrane(_) | EdgeKind::Organ(_) => 0.,
            EdgeKind::Channel(_) | EdgeKind::Pump(_) => self.flow_rate,
        }
    }

    /// Hydraulic resistance if the element has one independent of the species
    pub fn resistance(&self) -> Option<f64> {
        match &self.kind {
            EdgeKind::Channel(c) => Some(c.resistance()),
            EdgeKind::Organ(o) => Some(o.resistance()),
            EdgeKind::Membrane(_) | EdgeKind::Pump(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            EdgeKind::Channel(_) => "channel",
            EdgeKind::Membrane(_) => "membrane",
            EdgeKind::Organ(_) => "organ",
            EdgeKind::Pump(Pump::FlowRate(_)) => "flow pump",
            EdgeKind::Pump(Pump::Pressure(_)) => "pressure pump",
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match &self.kind {
            EdgeKind::Channel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_membrane(&self) -> Option<&Membrane> {
        match &self.kind {
            EdgeKind::Membrane(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_organ(&self) -> Option<&Organ> {
        match &self.kind {
            EdgeKind::Organ(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_pump(&self) -> Option<&Pump> {
        match &self.kind {
            EdgeKind::Pump(p) => Some(p),
            _ => None,
        }
    }
}
