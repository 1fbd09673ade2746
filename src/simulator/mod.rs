pub mod naming;
pub mod observer;
pub mod run;
pub mod state;
pub mod view;

pub use naming::{RouterNamer, router_name};
pub use observer::{NoopObserver, SimulatorNotification, SimulatorObserver};
pub use run::{AlgorithmRun, RunId, RunSummary, TickOutcome};
pub use state::{AddRouterState, EditLinkState, IdleState, SimulatorState, StateKind, Transition};
pub use view::{LinkView, PacketView, RouterView, Snapshot, StateView, distance_vector_overlay};

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::RouterId;
use crate::config::SimulatorConfig;
use crate::error::{Result, SimulatorError};
use crate::geometry::Position;
use crate::network::Topology;

pub type SharedSimulator = Arc<Mutex<Simulator>>;

/// Owns a topology and the interaction state driving it.
///
/// Input events and ticks mutate the topology only through this type, and
/// every state change goes through [`Simulator::apply`].
pub struct Simulator {
    topology: Topology,
    state: SimulatorState,
    namer: RouterNamer,
    config: SimulatorConfig,
    observer: Box<dyn SimulatorObserver + Send>,
    next_run_id: RunId,
    last_run: Option<RunSummary>,
    driver_generation: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}

impl Simulator {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            topology: Topology::new(config.transmission_speed, config.router_width),
            state: SimulatorState::idle(),
            namer: RouterNamer::default(),
            config,
            observer: Box::new(NoopObserver),
            next_run_id: 1,
            last_run: None,
            driver_generation: 0,
        }
    }

    pub fn with_observer(mut self, observer: impl SimulatorObserver + Send + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn into_shared(self) -> SharedSimulator {
        Arc::new(Mutex::new(self))
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn state(&self) -> &SimulatorState {
        &self.state
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
    }

    pub fn active_run(&self) -> Option<RunId> {
        match &self.state {
            SimulatorState::RunAlgorithm(run) => Some(run.run_id),
            _ => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.active_run().is_some()
    }

    pub fn click(&mut self, point: Option<Position>) {
        let transition = self
            .state
            .on_click(&mut self.topology, point, self.observer.as_mut());
        self.apply(transition);
    }

    pub fn mouse_move(&mut self, point: Option<Position>) {
        let transition = self.state.on_move(&self.topology, point);
        self.apply(transition);
    }

    pub fn request_add_router(&mut self, name: impl Into<String>) {
        self.apply(Transition::Enter(SimulatorState::add_router(name)));
    }

    /// Enters AddRouter with the next name from the built-in counter.
    pub fn request_add_next_router(&mut self) -> String {
        let name = self.namer.next_name();
        self.request_add_router(name.clone());
        name
    }

    pub fn request_edit_link(&mut self) {
        self.apply(Transition::Enter(SimulatorState::edit_link()));
    }

    /// Starts a new run, or keeps the one already in progress.
    pub fn request_run(&mut self) -> RunId {
        if let Some(run_id) = self.active_run() {
            self.apply(Transition::Stay);
            return run_id;
        }

        let run_id = self.next_run_id;
        self.next_run_id += 1;
        info!(
            run = run_id,
            routers = self.topology.router_count(),
            "starting distance-vector run"
        );
        self.apply(Transition::Enter(SimulatorState::RunAlgorithm(AlgorithmRun::new(run_id))));
        run_id
    }

    pub fn return_to_idle(&mut self) {
        self.apply(Transition::Enter(SimulatorState::idle()));
    }

    /// Stores the weight for the link being edited. Returns `false` outside
    /// EditLink.
    pub fn set_link_weight(&mut self, weight: f64) -> bool {
        match &mut self.state {
            SimulatorState::EditLink(edit) => {
                edit.current_weight = weight;
                true
            }
            _ => false,
        }
    }

    /// Adds the edited link with its current weight. `Ok(false)` when there is
    /// no complete edit to apply.
    pub fn add_link_to_current_topology(&mut self) -> Result<bool> {
        let SimulatorState::EditLink(edit) = &self.state else {
            return Ok(false);
        };
        let Some((first, second)) = edit.endpoints() else {
            return Ok(false);
        };
        let weight = edit.current_weight;
        self.topology.add_link(first, second, weight)?;
        Ok(true)
    }

    /// Weight prompt submit: set the weight, add the link, go back to Idle.
    /// On error the edit stays active.
    pub fn submit_link_weight(&mut self, weight: f64) -> Result<bool> {
        if !self.set_link_weight(weight) {
            return Ok(false);
        }
        let added = self.add_link_to_current_topology()?;
        self.return_to_idle();
        Ok(added)
    }

    /// One simulation tick. Does nothing unless a run is active; converging
    /// moves the simulator back to Idle.
    pub fn advance(&mut self) -> Option<TickOutcome> {
        let SimulatorState::RunAlgorithm(run) = &mut self.state else {
            return None;
        };
        let outcome = run.tick(&mut self.topology);

        if let TickOutcome::Converged(summary) = outcome {
            self.last_run = Some(summary);
            self.observer.converged(&summary);
            self.apply(Transition::Enter(SimulatorState::idle()));
        }
        Some(outcome)
    }

    /// Starts (or continues) a run and ticks it until it converges. The run is
    /// left active if it has not converged after `max_ticks` ticks.
    pub fn run_to_convergence(&mut self) -> Result<RunSummary> {
        let run_id = self.request_run();
        let max_ticks = self.config.max_ticks;

        for _ in 0..max_ticks {
            match self.advance() {
                Some(TickOutcome::Running) => {}
                Some(TickOutcome::Converged(summary)) => return Ok(summary),
                None => break,
            }
        }

        warn!(run = run_id, max_ticks, "run did not converge");
        Err(SimulatorError::DidNotConverge { ticks: max_ticks })
    }

    /// Hands tick ownership to a new driver. Any earlier driver loses it.
    pub(crate) fn claim_driver(&mut self) -> u64 {
        self.driver_generation += 1;
        self.driver_generation
    }

    /// Whether the driver holding `generation` may still tick `run_id`.
    pub(crate) fn drives(&self, run_id: RunId, generation: u64) -> bool {
        self.active_run() == Some(run_id) && self.driver_generation == generation
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.topology, &self.state)
    }

    pub fn distance_vector_overlay(&self, id: RouterId) -> Option<Vec<String>> {
        distance_vector_overlay(&self.topology, id)
    }

    /// Router whose overlay should be shown, if any.
    pub fn hovered_router(&self) -> Option<RouterId> {
        match &self.state {
            SimulatorState::Idle(idle) => idle.hovered,
            _ => None,
        }
    }

    /// Single entry point for state changes. Cleanup runs only when the
    /// current state is actually replaced.
    pub(crate) fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Enter(next) => {
                debug!(from = ?self.state.kind(), to = ?next.kind(), "state transition");
                self.state.cleanup();
                self.state = next;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn place(sim: &mut Simulator, x: f64, y: f64) -> String {
        let name = sim.request_add_next_router();
        sim.click(Some(Position::new(x, y)));
        name
    }

    #[test]
    fn placing_routers_uses_counter_names() {
        let mut sim = Simulator::default();
        assert_eq!(place(&mut sim, 0.0, 0.0), "A");
        assert_eq!(place(&mut sim, 100.0, 0.0), "B");
        assert_eq!(sim.state().kind(), StateKind::Idle);

        let names: Vec<_> = sim.topology().routers().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn link_edit_flow_prompts_then_adds() {
        let (tx, mut rx) = unbounded_channel();
        let mut sim = Simulator::default().with_observer(tx);
        place(&mut sim, 0.0, 0.0);
        place(&mut sim, 300.0, 0.0);

        sim.request_edit_link();
        sim.click(Some(Position::new(0.0, 0.0)));
        sim.click(Some(Position::new(300.0, 0.0)));
        assert_eq!(
            rx.try_recv().unwrap(),
            SimulatorNotification::WeightNeeded { first: RouterId(0), second: RouterId(1) }
        );

        assert_eq!(sim.submit_link_weight(6.0), Ok(true));
        assert_eq!(sim.state().kind(), StateKind::Idle);
        assert_eq!(sim.topology().router(RouterId(0)).unwrap().link_weight(RouterId(1)), Some(6.0));
    }

    #[test]
    fn incomplete_edit_is_a_no_op() {
        let mut sim = Simulator::default();
        place(&mut sim, 0.0, 0.0);
        sim.request_edit_link();
        sim.click(Some(Position::new(0.0, 0.0)));

        assert!(sim.set_link_weight(3.0));
        assert_eq!(sim.add_link_to_current_topology(), Ok(false));
        assert!(sim.topology().links().is_empty());

        sim.return_to_idle();
        assert!(!sim.set_link_weight(3.0));
        assert_eq!(sim.add_link_to_current_topology(), Ok(false));
    }

    #[test]
    fn invalid_weight_keeps_edit_open() {
        let mut sim = Simulator::default();
        place(&mut sim, 0.0, 0.0);
        place(&mut sim, 300.0, 0.0);
        sim.request_edit_link();
        sim.click(Some(Position::new(0.0, 0.0)));
        sim.click(Some(Position::new(300.0, 0.0)));

        assert_eq!(
            sim.submit_link_weight(-2.0),
            Err(SimulatorError::InvalidWeight(-2.0))
        );
        assert_eq!(sim.state().kind(), StateKind::EditLink);
        assert_eq!(sim.submit_link_weight(2.0), Ok(true));
    }

    #[test]
    fn request_run_while_running_keeps_the_run() {
        let mut sim = Simulator::default();
        place(&mut sim, 0.0, 0.0);
        place(&mut sim, 300.0, 0.0);
        sim.request_edit_link();
        sim.click(Some(Position::new(0.0, 0.0)));
        sim.click(Some(Position::new(300.0, 0.0)));
        sim.submit_link_weight(1.0).unwrap();

        let first = sim.request_run();
        sim.advance();
        assert_eq!(sim.request_run(), first);
        let SimulatorState::RunAlgorithm(run) = sim.state() else { panic!("expected run") };
        assert_eq!(run.ticks, 1);
    }

    #[test]
    fn advance_outside_a_run_does_nothing() {
        let mut sim = Simulator::default();
        assert_eq!(sim.advance(), None);
        assert_eq!(sim.last_run(), None);
    }
}
