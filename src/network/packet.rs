use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::RouterId;
use crate::network::DistanceVector;

/// A distance-vector advertisement travelling along a link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Packet {
    pub id: Uuid,
    pub source: RouterId,
    pub destination: RouterId,
    /// Snapshot of the source's table at enqueue time.
    pub distance_vector_info: DistanceVector,
    /// Fraction of the link traversed, delivered once it reaches 1.0.
    pub transmission_progress: f64,
}

impl Packet {
    pub fn new(source: RouterId, destination: RouterId, distance_vector_info: DistanceVector) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            destination,
            distance_vector_info,
            transmission_progress: 0.0,
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.transmission_progress >= 1.0
    }
}
