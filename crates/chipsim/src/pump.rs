use serde::{Deserialize, Serialize};

/// Source element driving the network.
///
/// Pumps act from `node0` towards `node1` of their edge.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Pump {
    /// Moves a fixed volume flow [m^3/s] from node0 into node1
    FlowRate(f64),

    /// Keeps the pressure at node1 a fixed amount [Pa] above node0
    Pressure(f64),
}

impl Pump {
    pub fn is_pressure(&self) -> bool {
        matches!(self, Pump::Pressure(_))
    }
}
