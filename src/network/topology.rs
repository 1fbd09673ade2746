use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::RouterId;
use crate::error::{Result, SimulatorError};
use crate::geometry::{Position, squared_dist};
use crate::network::{Link, Packet, Router};

pub const DEFAULT_TRANSMISSION_SPEED: f64 = 0.05;
pub const DEFAULT_ROUTER_WIDTH: f64 = 70.0;

#[derive(Debug, Clone)]
pub struct Topology {
    routers: Vec<Router>,
    packets: Vec<Packet>,
    pub transmission_speed: f64,
    pub router_width: f64,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSMISSION_SPEED, DEFAULT_ROUTER_WIDTH)
    }
}

impl Topology {
    pub fn new(transmission_speed: f64, router_width: f64) -> Self {
        Self {
            routers: Vec::new(),
            packets: Vec::new(),
            transmission_speed,
            router_width,
        }
    }

    pub fn add_router(&mut self, position: Position, name: impl Into<String>) -> RouterId {
        let id = RouterId(self.routers.len());
        let router = Router::new(id, name.into(), position);
        info!(router = %router.name, %id, x = position.x, y = position.y, "router added");
        self.routers.push(router);
        id
    }

    /// Links `a` and `b` in both directions with the same weight. Re-adding an
    /// existing link overwrites its weight on both sides.
    pub fn add_link(&mut self, a: RouterId, b: RouterId, weight: f64) -> Result<()> {
        if a == b {
            return Err(SimulatorError::SelfLink(a));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(SimulatorError::InvalidWeight(weight));
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(SimulatorError::UnknownRouter(id));
            }
        }

        self.routers[a.0].add_adjacent_link(b, weight);
        self.routers[b.0].add_adjacent_link(a, weight);
        info!(
            a = %self.routers[a.0].name,
            b = %self.routers[b.0].name,
            weight,
            "link added"
        );
        Ok(())
    }

    pub fn contains(&self, id: RouterId) -> bool {
        id.0 < self.routers.len()
    }

    pub fn router(&self, id: RouterId) -> Option<&Router> {
        self.routers.get(id.0)
    }

    pub fn router_by_name(&self, name: &str) -> Option<&Router> {
        self.routers.iter().find(|r| r.name == name)
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    /// Router minimizing the squared distance to `position`; first one wins ties.
    pub fn find_closest_router_to_position(&self, position: &Position) -> Option<RouterId> {
        let mut closest: Option<(RouterId, f64)> = None;
        for router in &self.routers {
            let dist = squared_dist(position, &router.position);
            match closest {
                Some((_, best)) if dist >= best => {}
                _ => closest = Some((router.id, dist)),
            }
        }
        closest.map(|(id, _)| id)
    }

    /// Closest router, provided `position` falls inside its drawn footprint.
    pub fn find_router_under(&self, position: &Position) -> Option<RouterId> {
        let id = self.find_closest_router_to_position(position)?;
        let radius = self.router_width / 2.0;
        let router = &self.routers[id.0];
        (squared_dist(&router.position, position) < radius * radius).then_some(id)
    }

    /// Every undirected edge exactly once, oriented from the earlier router.
    pub fn links(&self) -> Vec<Link> {
        let mut visited = BTreeSet::new();
        let mut links = Vec::new();

        for router in &self.routers {
            visited.insert(router.id);
            for (&neighbor, &weight) in router.local_link_state() {
                if !visited.contains(&neighbor) {
                    links.push(Link {
                        router_a: router.id,
                        router_b: neighbor,
                        weight,
                    });
                }
            }
        }

        links
    }

    /// Neighbors of `id` with their link weights.
    pub fn neighbors(&self, id: RouterId) -> Vec<(RouterId, f64)> {
        self.router(id)
            .map(|r| r.local_link_state().iter().map(|(&n, &w)| (n, w)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn enqueue_packet(&mut self, packet: Packet) {
        debug_assert!(self.contains(packet.source) && self.contains(packet.destination));
        self.packets.push(packet);
    }

    /// Moves every in-flight packet forward by the common speed and removes the
    /// ones that arrived, in flight order.
    pub(crate) fn advance_packets(&mut self) -> Vec<Packet> {
        let speed = self.transmission_speed;
        for packet in &mut self.packets {
            packet.transmission_progress += speed;
        }

        let (delivered, in_flight): (Vec<_>, Vec<_>) =
            self.packets.drain(..).partition(Packet::is_delivered);
        self.packets = in_flight;

        if !delivered.is_empty() {
            debug!(
                delivered = delivered.len(),
                in_flight = self.packets.len(),
                "packets arrived"
            );
        }
        delivered
    }

    pub(crate) fn router_mut(&mut self, id: RouterId) -> Option<&mut Router> {
        self.routers.get_mut(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Topology, RouterId, RouterId, RouterId) {
        let mut topology = Topology::default();
        let a = topology.add_router(Position::new(0.0, 0.0), "A");
        let b = topology.add_router(Position::new(100.0, 0.0), "B");
        let c = topology.add_router(Position::new(50.0, 80.0), "C");
        topology.add_link(a, b, 4.0).unwrap();
        topology.add_link(b, c, 1.0).unwrap();
        topology.add_link(a, c, 10.0).unwrap();
        (topology, a, b, c)
    }

    #[test]
    fn add_router_assigns_sequential_handles() {
        let mut topology = Topology::default();
        let a = topology.add_router(Position::new(1.0, 1.0), "A");
        let b = topology.add_router(Position::new(2.0, 2.0), "B");
        assert_eq!(a, RouterId(0));
        assert_eq!(b, RouterId(1));

        let router = topology.router(b).unwrap();
        assert_eq!(router.name, "B");
        assert!(router.local_link_state().is_empty());
        assert!(router.distance_vector().is_empty());
    }

    #[test]
    fn links_are_symmetric() {
        let (topology, a, b, _) = triangle();
        let ra = topology.router(a).unwrap();
        let rb = topology.router(b).unwrap();
        assert_eq!(ra.link_weight(b), Some(4.0));
        assert_eq!(rb.link_weight(a), Some(4.0));
        assert!(ra.distance_to(b).unwrap() <= 4.0);
        assert!(rb.distance_to(a).unwrap() <= 4.0);
    }

    #[test]
    fn each_edge_listed_once() {
        let (topology, a, b, c) = triangle();
        let links = topology.links();
        assert_eq!(links.len(), 3);
        for (x, y, w) in [(a, b, 4.0), (b, c, 1.0), (a, c, 10.0)] {
            let matching: Vec<_> = links.iter().filter(|l| l.connects(x, y)).collect();
            assert_eq!(matching.len(), 1);
            assert_eq!(matching[0].weight, w);
        }
    }

    #[test]
    fn relinking_overwrites_weight_without_duplicates() {
        let (mut topology, a, b, _) = triangle();
        topology.add_link(b, a, 2.0).unwrap();

        let links = topology.links();
        assert_eq!(links.len(), 3);
        let ab = links.iter().find(|l| l.connects(a, b)).unwrap();
        assert_eq!(ab.weight, 2.0);
        assert_eq!(topology.router(a).unwrap().link_weight(b), Some(2.0));
        assert_eq!(topology.router(b).unwrap().link_weight(a), Some(2.0));
    }

    #[test]
    fn rejects_invalid_links() {
        let (mut topology, a, b, _) = triangle();
        assert_eq!(topology.add_link(a, a, 1.0), Err(SimulatorError::SelfLink(a)));
        assert_eq!(
            topology.add_link(a, RouterId(42), 1.0),
            Err(SimulatorError::UnknownRouter(RouterId(42)))
        );
        assert!(matches!(
            topology.add_link(a, b, -1.0),
            Err(SimulatorError::InvalidWeight(_))
        ));
        assert!(matches!(
            topology.add_link(a, b, f64::NAN),
            Err(SimulatorError::InvalidWeight(_))
        ));
        assert_eq!(topology.router(a).unwrap().link_weight(b), Some(4.0));
    }

    #[test]
    fn closest_router_lookup() {
        let mut topology = Topology::default();
        assert_eq!(topology.find_closest_router_to_position(&Position::new(1.0, 1.0)), None);

        let a = topology.add_router(Position::new(0.0, 0.0), "A");
        assert_eq!(
            topology.find_closest_router_to_position(&Position::new(1.0, 1.0)),
            Some(a)
        );

        let b = topology.add_router(Position::new(10.0, 0.0), "B");
        assert_eq!(
            topology.find_closest_router_to_position(&Position::new(8.0, 0.0)),
            Some(b)
        );
        // Equidistant: first inserted wins.
        assert_eq!(
            topology.find_closest_router_to_position(&Position::new(5.0, 0.0)),
            Some(a)
        );
    }

    #[test]
    fn router_under_respects_footprint() {
        let mut topology = Topology::new(DEFAULT_TRANSMISSION_SPEED, 20.0);
        let a = topology.add_router(Position::new(0.0, 0.0), "A");
        assert_eq!(topology.find_router_under(&Position::new(5.0, 5.0)), Some(a));
        assert_eq!(topology.find_router_under(&Position::new(10.0, 0.0)), None);
        assert_eq!(topology.find_router_under(&Position::new(30.0, 30.0)), None);
    }

    #[test]
    fn packets_arrive_after_enough_progress() {
        let (mut topology, a, b, _) = triangle();
        topology.transmission_speed = 0.5;
        topology.enqueue_packet(Packet::new(a, b, Default::default()));

        assert!(topology.advance_packets().is_empty());
        assert_eq!(topology.packets().len(), 1);
        assert_eq!(topology.packets()[0].transmission_progress, 0.5);

        let delivered = topology.advance_packets();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].destination, b);
        assert!(topology.packets().is_empty());
    }
}
