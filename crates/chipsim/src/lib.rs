mod advection;
mod channel;
mod config;
mod edge;
mod error;
mod fluid;
mod hydraulic_solver;
mod mass_transport;
mod membrane;
mod mixture;
mod network;
mod organ;
mod print;
mod pump;
mod results;
mod simulation;
mod transport_state;

pub mod models;

pub use advection::*;
pub use channel::*;
pub use config::*;
pub use edge::*;
pub use error::*;
pub use fluid::*;
pub use hydraulic_solver::*;
pub use mass_transport::*;
pub use membrane::*;
pub use mixture::*;
pub use network::*;
pub use organ::*;
pub use print::*;
pub use pump::*;
pub use results::*;
pub use simulation::*;
pub use transport_state::*;
