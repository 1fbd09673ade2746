use tokio::sync::mpsc::UnboundedSender;

use crate::RouterId;
use crate::simulator::RunSummary;

/// Hooks the simulator fires towards the UI layer.
pub trait SimulatorObserver {
    /// Both ends of a link edit are chosen; the caller should collect a weight
    /// and call `add_link_to_current_topology`.
    fn weight_needed(&mut self, _first: RouterId, _second: RouterId) {}

    fn converged(&mut self, _summary: &RunSummary) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl SimulatorObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorNotification {
    WeightNeeded { first: RouterId, second: RouterId },
    Converged(RunSummary),
}

impl SimulatorObserver for UnboundedSender<SimulatorNotification> {
    fn weight_needed(&mut self, first: RouterId, second: RouterId) {
        // A dropped receiver just means nobody is listening.
        let _ = self.send(SimulatorNotification::WeightNeeded { first, second });
    }

    fn converged(&mut self, summary: &RunSummary) {
        let _ = self.send(SimulatorNotification::Converged(*summary));
    }
}
