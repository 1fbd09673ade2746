use serde::{Deserialize, Serialize};

use crate::RouterId;
use crate::geometry::Position;
use crate::network::Topology;
use crate::simulator::SimulatorState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterView {
    pub id: RouterId,
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkView {
    pub a: RouterId,
    pub b: RouterId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketView {
    pub source: RouterId,
    pub destination: RouterId,
    pub progress: f64,
    /// Where the packet is drawn along its link.
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum StateView {
    Idle {
        hovered: Option<RouterId>,
    },
    AddRouter {
        pending_name: String,
        cursor: Position,
    },
    EditLink {
        first_end: Option<RouterId>,
        second_end: Option<RouterId>,
        highlighted: Option<RouterId>,
        current_weight: f64,
    },
    RunAlgorithm {
        run_id: u64,
        round: u64,
        ticks: u64,
    },
}

impl From<&SimulatorState> for StateView {
    fn from(state: &SimulatorState) -> Self {
        match state {
            SimulatorState::Idle(idle) => StateView::Idle {
                hovered: idle.hovered,
            },
            SimulatorState::AddRouter(pending) => StateView::AddRouter {
                pending_name: pending.pending_name.clone(),
                cursor: pending.cursor,
            },
            SimulatorState::EditLink(edit) => StateView::EditLink {
                first_end: edit.first_end,
                second_end: edit.second_end,
                highlighted: edit.highlighted,
                current_weight: edit.current_weight,
            },
            SimulatorState::RunAlgorithm(run) => StateView::RunAlgorithm {
                run_id: run.run_id,
                round: run.round_num,
                ticks: run.ticks,
            },
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub routers: Vec<RouterView>,
    pub links: Vec<LinkView>,
    pub packets: Vec<PacketView>,
    pub state: StateView,
}

impl Snapshot {
    pub fn capture(topology: &Topology, state: &SimulatorState) -> Self {
        let routers = topology
            .routers()
            .iter()
            .map(|r| RouterView {
                id: r.id,
                name: r.name.clone(),
                position: r.position,
            })
            .collect();

        let links = topology
            .links()
            .into_iter()
            .map(|l| LinkView {
                a: l.router_a,
                b: l.router_b,
                weight: l.weight,
            })
            .collect();

        let packets = topology
            .packets()
            .iter()
            .filter_map(|p| {
                let from = topology.router(p.source)?.position;
                let to = topology.router(p.destination)?.position;
                Some(PacketView {
                    source: p.source,
                    destination: p.destination,
                    progress: p.transmission_progress,
                    position: from.lerp(&to, p.transmission_progress.min(1.0)),
                })
            })
            .collect();

        Self {
            routers,
            links,
            packets,
            state: StateView::from(state),
        }
    }
}

/// Lines of the hover overlay for `id`: a header, then one `name: cost` line
/// per destination sorted by name, or `Empty`.
pub fn distance_vector_overlay(topology: &Topology, id: RouterId) -> Option<Vec<String>> {
    let router = topology.router(id)?;

    let mut entries: Vec<(&str, f64)> = router
        .distance_vector()
        .iter()
        .filter_map(|(dest, &cost)| Some((topology.router(*dest)?.name.as_str(), cost)))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut lines = vec![format!("{}'s Distance Vector", router.name)];
    if entries.is_empty() {
        lines.push("Empty".to_string());
    } else {
        lines.extend(entries.into_iter().map(|(name, cost)| format!("{}: {}", name, cost)));
    }
    Some(lines)
}
