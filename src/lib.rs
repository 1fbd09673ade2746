pub mod algorithms;
pub mod config;
pub mod driver;
pub mod error;
pub mod geometry;
pub mod network;
pub mod simulator;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use config::SimulatorConfig;
pub use error::SimulatorError;
pub use geometry::Position;
pub use network::{Link, Packet, Router, Topology};
pub use simulator::{SharedSimulator, Simulator, SimulatorState};

/// Stable handle of a router inside its topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterId(pub usize);

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
