use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use crate::RouterId;
use crate::geometry::Position;
use crate::network::Packet;

/// Destination router -> best known cost.
pub type DistanceVector = BTreeMap<RouterId, f64>;

/// Directly attached neighbor -> link weight.
pub type LinkState = BTreeMap<RouterId, f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeStatus {
    NoChange,
    Changed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Router {
    pub id: RouterId,
    pub name: String,
    pub position: Position,
    local_link_state: LinkState,
    distance_vector: DistanceVector,
    neighboring_distance_vectors: BTreeMap<RouterId, DistanceVector>,
}

impl Router {
    pub fn new(id: RouterId, name: String, position: Position) -> Self {
        Self {
            id,
            name,
            position,
            local_link_state: LinkState::new(),
            distance_vector: DistanceVector::new(),
            neighboring_distance_vectors: BTreeMap::new(),
        }
    }

    pub fn local_link_state(&self) -> &LinkState {
        &self.local_link_state
    }

    pub fn distance_vector(&self) -> &DistanceVector {
        &self.distance_vector
    }

    pub fn neighboring_distance_vectors(&self) -> &BTreeMap<RouterId, DistanceVector> {
        &self.neighboring_distance_vectors
    }

    pub fn link_weight(&self, neighbor: RouterId) -> Option<f64> {
        self.local_link_state.get(&neighbor).copied()
    }

    pub fn distance_to(&self, destination: RouterId) -> Option<f64> {
        self.distance_vector.get(&destination).copied()
    }

    /// Records a direct link to `neighbor`, overwriting any previous weight.
    ///
    /// This is the only way a destination enters the distance vector.
    pub fn add_adjacent_link(&mut self, neighbor: RouterId, weight: f64) {
        self.local_link_state.insert(neighbor, weight);
        let known = self.distance_to(neighbor).unwrap_or(f64::INFINITY);
        if weight < known {
            self.distance_vector.insert(neighbor, weight);
        }
    }

    /// Stores the advertised vector from the packet's source and relaxes every
    /// destination this router already tracks.
    ///
    /// Destinations that only appear in the neighbor's advertisement are not
    /// added.
    pub fn update_distance_vector(&mut self, packet: &Packet) -> ChangeStatus {
        self.neighboring_distance_vectors
            .insert(packet.source, packet.distance_vector_info.clone());

        let mut status = ChangeStatus::NoChange;
        let destinations: Vec<RouterId> = self.distance_vector.keys().copied().collect();

        for destination in destinations {
            let mut min_dist = self
                .local_link_state
                .get(&destination)
                .copied()
                .unwrap_or(f64::INFINITY);

            for (neighbor, advertised) in &self.neighboring_distance_vectors {
                let via = self
                    .local_link_state
                    .get(neighbor)
                    .copied()
                    .unwrap_or(f64::INFINITY);
                let remaining = advertised
                    .get(&destination)
                    .copied()
                    .unwrap_or(f64::INFINITY);
                min_dist = min_dist.min(via + remaining);
            }

            if self.distance_vector.get(&destination) != Some(&min_dist) {
                trace!(
                    router = %self.name,
                    %destination,
                    cost = min_dist,
                    "distance vector entry changed"
                );
                self.distance_vector.insert(destination, min_dist);
                status = ChangeStatus::Changed;
            }
        }

        status
    }
}
