use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::RouterId;
use crate::network::{ChangeStatus, Packet, Topology};

pub type RunId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub rounds: u64,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    Converged(RunSummary),
}

/// Lockstep distance-vector exchange over a topology.
#[derive(Debug, Clone)]
pub struct AlgorithmRun {
    pub run_id: RunId,
    pub round_num: u64,
    pub ticks: u64,
}

impl AlgorithmRun {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            round_num: 0,
            ticks: 0,
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            rounds: self.round_num,
            ticks: self.ticks,
        }
    }

    pub fn tick(&mut self, topology: &mut Topology) -> TickOutcome {
        if self.round_num == 0 && topology.packets().is_empty() {
            self.bootstrap(topology);
        }

        let delivered = topology.advance_packets();
        let mut changed: Vec<RouterId> = Vec::new();
        for packet in &delivered {
            trace!(
                run = self.run_id,
                source = %packet.source,
                destination = %packet.destination,
                packet = %packet.id,
                "packet delivered"
            );
            let Some(router) = topology.router_mut(packet.destination) else {
                continue;
            };
            if router.update_distance_vector(packet) == ChangeStatus::Changed
                && !changed.contains(&packet.destination)
            {
                changed.push(packet.destination);
            }
        }
        if !delivered.is_empty() {
            self.round_num += 1;
        }

        for id in &changed {
            self.advertise_distance_vector(topology, *id);
        }

        self.ticks += 1;
        debug!(
            run = self.run_id,
            tick = self.ticks,
            round = self.round_num,
            delivered = delivered.len(),
            changed = changed.len(),
            in_flight = topology.packets().len(),
            "tick"
        );

        if topology.packets().is_empty() {
            let summary = self.summary();
            info!(
                run = summary.run_id,
                rounds = summary.rounds,
                ticks = summary.ticks,
                "distance vectors converged"
            );
            TickOutcome::Converged(summary)
        } else {
            TickOutcome::Running
        }
    }

    /// First round advertises every router's link-state table to its neighbors.
    fn bootstrap(&self, topology: &mut Topology) {
        let packets: Vec<Packet> = topology
            .routers()
            .iter()
            .flat_map(|router| {
                router
                    .local_link_state()
                    .keys()
                    .map(move |&neighbor| Packet::new(router.id, neighbor, router.local_link_state().clone()))
            })
            .collect();

        info!(run = self.run_id, packets = packets.len(), "bootstrapping link-state advertisements");
        for packet in packets {
            topology.enqueue_packet(packet);
        }
    }

    fn advertise_distance_vector(&self, topology: &mut Topology, id: RouterId) {
        let Some(router) = topology.router(id) else {
            return;
        };
        let packets: Vec<Packet> = router
            .local_link_state()
            .keys()
            .filter(|&&neighbor| neighbor != id)
            .map(|&neighbor| Packet::new(id, neighbor, router.distance_vector().clone()))
            .collect();
        for packet in packets {
            topology.enqueue_packet(packet);
        }
    }

    pub(crate) fn cleanup(&mut self) {
        debug!(
            run = self.run_id,
            ticks = self.ticks,
            round = self.round_num,
            "run stopped"
        );
    }
}
