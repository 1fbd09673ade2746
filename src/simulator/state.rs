use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RouterId;
use crate::geometry::Position;
use crate::network::Topology;
use crate::simulator::AlgorithmRun;
use crate::simulator::observer::SimulatorObserver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    Idle,
    AddRouter,
    EditLink,
    RunAlgorithm,
}

#[derive(Debug, Clone, Default)]
pub struct IdleState {
    pub hovered: Option<RouterId>,
}

#[derive(Debug, Clone)]
pub struct AddRouterState {
    pub pending_name: String,
    pub cursor: Position,
}

#[derive(Debug, Clone, Default)]
pub struct EditLinkState {
    pub first_end: Option<RouterId>,
    pub second_end: Option<RouterId>,
    pub highlighted: Option<RouterId>,
    /// Written by the caller once the weight prompt is answered.
    pub current_weight: f64,
}

impl EditLinkState {
    pub fn endpoints(&self) -> Option<(RouterId, RouterId)> {
        Some((self.first_end?, self.second_end?))
    }
}

/// The interaction mode of the simulator. Exactly one is active.
#[derive(Debug, Clone)]
pub enum SimulatorState {
    Idle(IdleState),
    AddRouter(AddRouterState),
    EditLink(EditLinkState),
    RunAlgorithm(AlgorithmRun),
}

/// Result of feeding an input event to a state.
#[derive(Debug)]
pub enum Transition {
    /// Keep the current state instance; no cleanup.
    Stay,
    /// Replace the current state; the outgoing one is cleaned up first.
    Enter(SimulatorState),
}

impl Default for SimulatorState {
    fn default() -> Self {
        Self::idle()
    }
}

impl SimulatorState {
    pub fn idle() -> Self {
        SimulatorState::Idle(IdleState::default())
    }

    pub fn add_router(pending_name: impl Into<String>) -> Self {
        SimulatorState::AddRouter(AddRouterState {
            pending_name: pending_name.into(),
            cursor: Position::default(),
        })
    }

    pub fn edit_link() -> Self {
        SimulatorState::EditLink(EditLinkState::default())
    }

    pub fn kind(&self) -> StateKind {
        match self {
            SimulatorState::Idle(_) => StateKind::Idle,
            SimulatorState::AddRouter(_) => StateKind::AddRouter,
            SimulatorState::EditLink(_) => StateKind::EditLink,
            SimulatorState::RunAlgorithm(_) => StateKind::RunAlgorithm,
        }
    }

    pub fn on_click(
        &mut self,
        topology: &mut Topology,
        point: Option<Position>,
        observer: &mut dyn SimulatorObserver,
    ) -> Transition {
        match self {
            SimulatorState::Idle(_) | SimulatorState::RunAlgorithm(_) => Transition::Stay,
            SimulatorState::AddRouter(pending) => {
                if let Some(point) = point {
                    topology.add_router(point, pending.pending_name.clone());
                }
                Transition::Enter(SimulatorState::idle())
            }
            SimulatorState::EditLink(edit) => {
                let Some(point) = point else {
                    return Transition::Stay;
                };
                let Some(router) = topology.find_closest_router_to_position(&point) else {
                    return Transition::Stay;
                };

                match (edit.first_end, edit.second_end) {
                    (None, _) => {
                        debug!(%router, "link edit: first end selected");
                        edit.first_end = Some(router);
                    }
                    (Some(first), None) if first != router => {
                        debug!(%router, "link edit: second end selected");
                        edit.second_end = Some(router);
                        observer.weight_needed(first, router);
                    }
                    _ => {}
                }
                Transition::Stay
            }
        }
    }

    pub fn on_move(&mut self, topology: &Topology, point: Option<Position>) -> Transition {
        match self {
            SimulatorState::Idle(idle) => {
                if let Some(point) = point {
                    if topology.router_count() > 0 {
                        idle.hovered = topology.find_router_under(&point);
                    }
                }
                Transition::Stay
            }
            SimulatorState::AddRouter(pending) => match point {
                Some(point) => {
                    pending.cursor = point;
                    Transition::Stay
                }
                None => Transition::Enter(SimulatorState::idle()),
            },
            SimulatorState::EditLink(edit) => {
                if let Some(point) = point {
                    if topology.router_count() > 0 {
                        edit.highlighted = topology.find_router_under(&point);
                    }
                }
                Transition::Stay
            }
            SimulatorState::RunAlgorithm(_) => Transition::Stay,
        }
    }

    /// Releases whatever the state holds before it is replaced.
    pub fn cleanup(&mut self) {
        if let SimulatorState::RunAlgorithm(run) = self {
            run.cleanup();
        }
    }
}
